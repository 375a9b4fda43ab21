//! Repository provisioning domain.
//!
//! This crate holds every domain concept of the provisioner: newtype
//! identifiers, the inbound `repository.created` payload, the ownership policy,
//! the [`RepositoryHost`] port and the handler that drives it. Infrastructure
//! crates implement the port; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; `github` and `listener` define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`TeamSlug`, `BlobSha`, `RepositoryRef`, etc.) |
//! | [`types`] | Value types (`EncodedContent`, `FileProbe`, `FileWrite`, etc.) |
//! | [`errors`] | `HostError` and `ProvisioningError` |
//! | [`event`] | The `repository.created` payload |
//! | [`policy`] | Ownership property to team/CODEOWNERS lookup |
//! | [`ports`] | The `RepositoryHost` trait |
//! | [`mutator`] | Permission grant and CODEOWNERS upsert |
//! | [`handler`] | End-to-end processing of one event |

pub mod errors;
pub mod event;
pub mod handler;
pub mod identifiers;
pub mod mutator;
pub mod policy;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{HostError, ProvisioningError};
pub use event::{CustomProperties, RepositoryCreatedEvent};
pub use handler::{ProvisioningReport, RepositoryCreatedHandler};
pub use identifiers::{
    BlobSha, CommitSha, DeliveryId, EmptyIdentifier, FilePath, InvocationId, OrganizationLogin,
    OwnerLogin, RepositoryName, RepositoryRef, TeamSlug, CODEOWNERS_PATH,
};
pub use mutator::{RemoteMutator, CODEOWNERS_COMMIT_MESSAGE};
pub use policy::{resolve, Ownership, PolicyDecision, TeamAssignment};
pub use ports::RepositoryHost;
pub use types::{
    EncodedContent, FileProbe, FileWrite, RepositoryPermission, Timestamp, WrittenFile,
};
