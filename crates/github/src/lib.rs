//! GitHub infrastructure adapter.
//!
//! Implements the [`provisioning::RepositoryHost`] port over the GitHub REST
//! API with `reqwest`: reading and writing repository contents and granting
//! team permissions.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! HTTP transport, authentication headers, status mapping and response
//! decoding live here; the [`provisioning`] crate never sees them.
//!
//! ## Status mapping
//!
//! | Call | Success | Expected non-success | Everything else |
//! |------|---------|----------------------|-----------------|
//! | `GET contents` | `FileProbe::Found` | 404 → `FileProbe::NotFound` | `HostError::Api` |
//! | `PUT contents` | `WrittenFile` | n/a | `HostError::Api` |
//! | `PUT team repo` | `()` | n/a | `HostError::Api` |
//!
//! Connection failures and timeouts are `HostError::Transport`. Nothing is
//! retried.

mod client;
mod models;

pub use client::{GitHubClient, GitHubClientError, GitHubConfig, API_VERSION, DEFAULT_API_URL};
