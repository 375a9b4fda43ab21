//! GitHub webhook receiver.
//!
//! Binds an HTTP server, verifies the HMAC-SHA256 signature of every delivery
//! and hands `repository.created` events to
//! [`provisioning::RepositoryCreatedHandler`]. All other events and actions are
//! acknowledged and ignored.
//!
//! ## Response codes
//!
//! | Situation | Status |
//! |-----------|--------|
//! | Missing or invalid `X-Hub-Signature-256` | 401 |
//! | Missing `X-GitHub-Delivery` / `X-GitHub-Event`, unparseable payload | 400 |
//! | Event or action not handled | 202 |
//! | Handled (provisioned, or failed and logged) | 200 |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details and signature verification live here.
//! Each delivery is processed to completion on its own request task; there is
//! no queue and no deduplication of repeated deliveries.

mod error;
mod routes;
mod signature;

pub use error::WebhookError;
pub use routes::{
    create_router, serve, DeliveryResponse, Outcome, WebhookState, WEBHOOK_PATH,
};
pub use signature::WebhookSecret;
