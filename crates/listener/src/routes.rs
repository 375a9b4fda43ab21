//! HTTP routes of the webhook receiver.
//!
//! Provides:
//! - `POST /api/github/webhooks` - GitHub webhook deliveries
//! - `GET /health` - liveness probe

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use provisioning::event::REPOSITORY_EVENT;
use provisioning::{DeliveryId, InvocationId, RepositoryCreatedEvent, RepositoryCreatedHandler};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn, Instrument};

use crate::{WebhookError, WebhookSecret};

/// Path GitHub is configured to deliver webhooks to.
pub const WEBHOOK_PATH: &str = "/api/github/webhooks";

const HEADER_SIGNATURE: &str = "x-hub-signature-256";
const HEADER_DELIVERY: &str = "x-github-delivery";
const HEADER_EVENT: &str = "x-github-event";

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    /// Secret used to verify `X-Hub-Signature-256`.
    pub secret: WebhookSecret,
    /// Handler that provisions created repositories.
    pub handler: RepositoryCreatedHandler,
}

/// What happened to an accepted delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The repository was provisioned (possibly with no remote changes).
    Provisioned,
    /// Provisioning failed; the error was logged and the event dropped.
    Failed,
    /// The event or action is not one the provisioner reacts to.
    Ignored,
}

/// JSON body returned for accepted deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResponse {
    /// The `X-GitHub-Delivery` value.
    pub delivery: DeliveryId,
    /// What was done with the delivery.
    pub outcome: Outcome,
}

/// Create the HTTP router for webhook deliveries.
pub fn create_router(state: WebhookState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(Arc::new(state))
}

/// Serves the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: WebhookState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, path = WEBHOOK_PATH, "Webhook receiver listening");
    }
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Handler for `/health`.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Handler for webhook deliveries.
///
/// Rejected deliveries are logged here with whatever delivery id the request
/// carried, then answered with the error's status.
async fn webhook_handler(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    receive(&state, &headers, &body).await.inspect_err(|err| {
        warn!(
            delivery = header(&headers, HEADER_DELIVERY).unwrap_or("-"),
            event = header(&headers, HEADER_EVENT).unwrap_or("-"),
            status = err.status_code().as_u16(),
            error = %err,
            "Rejected webhook delivery"
        );
    })
}

/// The signature is verified over the raw body before anything in it is
/// parsed. Handler failures are logged and acknowledged with 200 so GitHub
/// does not redeliver.
async fn receive(
    state: &WebhookState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, WebhookError> {
    let signature = header(headers, HEADER_SIGNATURE).ok_or(WebhookError::MissingSignature)?;
    state.secret.verify(signature, body)?;

    let delivery = header(headers, HEADER_DELIVERY)
        .and_then(DeliveryId::new)
        .ok_or(WebhookError::MissingDeliveryId)?;
    let event_name = header(headers, HEADER_EVENT)
        .filter(|e| !e.is_empty())
        .ok_or(WebhookError::MissingEventType)?;

    if event_name != REPOSITORY_EVENT {
        info!(delivery = %delivery, event = event_name, "Ignoring event");
        return Ok(accepted(delivery, Outcome::Ignored));
    }

    let Some(event) = RepositoryCreatedEvent::from_repository_payload(body)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?
    else {
        info!(delivery = %delivery, "Ignoring repository event with another action");
        return Ok(accepted(delivery, Outcome::Ignored));
    };

    let invocation = InvocationId::new_random();
    let span = tracing::info_span!(
        "webhook_delivery",
        delivery = %delivery,
        invocation = %invocation,
    );
    let outcome = dispatch(&state.handler, invocation, &event)
        .instrument(span)
        .await;

    Ok(accepted(delivery, outcome))
}

/// Runs the handler for one event. This is the outermost scope for handler
/// errors: they are logged here and dropped.
async fn dispatch(
    handler: &RepositoryCreatedHandler,
    invocation: InvocationId,
    event: &RepositoryCreatedEvent,
) -> Outcome {
    match handler.handle_invocation(invocation, event).await {
        Ok(report) => {
            info!(
                repository = %report.repository,
                team = report.decision.team_identifier(),
                codeowners_written = report.codeowners.is_some(),
                "Processed repository.created event"
            );
            Outcome::Provisioned
        }
        Err(err) => {
            let cause = err
                .host_error()
                .map(ToString::to_string)
                .unwrap_or_default();
            error!(
                error = %err,
                cause = %cause,
                "Error processing repository.created event"
            );
            Outcome::Failed
        }
    }
}

fn accepted(delivery: DeliveryId, outcome: Outcome) -> Response {
    let status = match outcome {
        Outcome::Ignored => StatusCode::ACCEPTED,
        Outcome::Provisioned | Outcome::Failed => StatusCode::OK,
    };
    (status, Json(DeliveryResponse { delivery, outcome })).into_response()
}
