//! Repository provisioner entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags with environment fallbacks (see [`config`]).
//! 2. **Wire observability**: `tracing-subscriber` with a pretty or JSON layer
//!    and an optional OpenTelemetry OTLP exporter (see [`telemetry`]).
//! 3. **Construct infrastructure**: a `GitHubClient` injected into the
//!    `RepositoryCreatedHandler`.
//! 4. **Select trigger mode**:
//!    - `serve`: run the webhook receiver until Ctrl-C.
//!    - `handle`: replay one `repository` payload from a file and print the
//!      resulting report.

mod config;
mod telemetry;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use github::GitHubClient;
use listener::WebhookState;
use provisioning::{RepositoryCreatedEvent, RepositoryCreatedHandler};
use tracing::{error, info};

use crate::config::{Cli, Command, HandleArgs, ServeArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init(&cli.telemetry)?;

    let result = run(cli).await;
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "repo-provisioner exited with an error");
    }

    telemetry.shutdown();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let github = GitHubClient::new(cli.github.to_config()?)
        .context("failed to construct GitHub client")?;
    let handler = RepositoryCreatedHandler::new(Arc::new(github));

    match cli.command {
        Command::Serve(args) => serve(args, handler).await,
        Command::Handle(args) => handle(args, &handler).await,
    }
}

async fn serve(args: ServeArgs, handler: RepositoryCreatedHandler) -> Result<()> {
    let state = WebhookState {
        secret: args.secret()?,
        handler,
    };
    let tcp = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;

    listener::serve(tcp, state, shutdown_signal())
        .await
        .context("webhook receiver failed")?;

    info!("Webhook receiver stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn handle(args: HandleArgs, handler: &RepositoryCreatedHandler) -> Result<()> {
    let event = read_payload(&args.payload)?;
    let report = handler.handle(&event).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_payload(path: &Path) -> Result<RepositoryCreatedEvent> {
    let body = std::fs::read(path)
        .with_context(|| format!("failed to read payload {}", path.display()))?;
    match RepositoryCreatedEvent::from_repository_payload(&body)
        .with_context(|| format!("failed to parse payload {}", path.display()))?
    {
        Some(event) => Ok(event),
        None => bail!(
            "payload {} is not a repository.created event",
            path.display()
        ),
    }
}
