//! Error types for the provisioning domain.
//!
//! [`HostError`] is the port-level error every [`crate::RepositoryHost`]
//! implementation reports. [`ProvisioningError`] wraps it with the step that
//! failed and is what [`crate::RepositoryCreatedHandler::handle`] returns.
//!
//! A missing file during the CODEOWNERS probe is not represented here: it is
//! [`crate::FileProbe::NotFound`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{RepositoryRef, TeamSlug};

// ---------------------------------------------------------------------------
// Port-level errors
// ---------------------------------------------------------------------------

/// Failure reported by a repository host while performing one remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum HostError {
    /// The remote API answered with a non-success status.
    #[error("{operation} failed with status {status}: {message}")]
    Api {
        /// Short name of the remote operation (e.g. `"get file contents"`).
        operation: String,
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message returned by the API, or the status reason.
        message: String,
    },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("{operation} could not reach the remote API: {message}")]
    Transport {
        /// Short name of the remote operation.
        operation: String,
        /// Description of the transport failure.
        message: String,
    },

    /// The API answered with a success status but a body that could not be read.
    #[error("{operation} returned an unreadable response: {message}")]
    InvalidResponse {
        /// Short name of the remote operation.
        operation: String,
        /// Description of the decoding problem.
        message: String,
    },
}

impl HostError {
    /// Returns the HTTP status code when the API answered, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport { .. } | Self::InvalidResponse { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Handler-level errors
// ---------------------------------------------------------------------------

/// Errors that abort processing of a `repository.created` event.
///
/// Each variant names the step that failed. No step is retried; the caller
/// decides whether to log and drop (webhook) or exit non-zero (CLI replay).
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ProvisioningError {
    /// The policy selected a team but the event did not come from an organization,
    /// so there is no organization to grant the team permission in.
    #[error("Repository {repository} resolves to team '{team}' but the event carries no organization")]
    MissingOrganization {
        /// The created repository.
        repository: RepositoryRef,
        /// The team the policy selected.
        team: TeamSlug,
    },

    /// Granting the team permission on the repository failed.
    #[error("Granting permissions to team '{team}' on {repository} failed")]
    PermissionGrant {
        /// The team being granted access.
        team: TeamSlug,
        /// The created repository.
        repository: RepositoryRef,
        /// Underlying host failure.
        #[source]
        source: HostError,
    },

    /// Reading the existing CODEOWNERS file failed with something other than
    /// "not found". The write was not attempted.
    #[error("Fetching existing CODEOWNERS file in {repository} failed")]
    CodeownersProbe {
        /// The created repository.
        repository: RepositoryRef,
        /// Underlying host failure.
        #[source]
        source: HostError,
    },

    /// Creating or updating the CODEOWNERS file failed.
    #[error("Writing CODEOWNERS file in {repository} failed")]
    CodeownersWrite {
        /// The created repository.
        repository: RepositoryRef,
        /// Underlying host failure.
        #[source]
        source: HostError,
    },
}

impl ProvisioningError {
    /// Returns the host failure behind this error, if there is one.
    pub fn host_error(&self) -> Option<&HostError> {
        match self {
            Self::MissingOrganization { .. } => None,
            Self::PermissionGrant { source, .. }
            | Self::CodeownersProbe { source, .. }
            | Self::CodeownersWrite { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OwnerLogin, RepositoryName};

    fn repo() -> RepositoryRef {
        RepositoryRef::new(
            OwnerLogin::new("Kokodoki").unwrap(),
            RepositoryName::new("dev").unwrap(),
        )
    }

    #[test]
    fn host_error_status_only_for_api_failures() {
        let api = HostError::Api {
            operation: "get file contents".into(),
            status: 500,
            message: "Server Error".into(),
        };
        let transport = HostError::Transport {
            operation: "get file contents".into(),
            message: "connection reset".into(),
        };
        assert_eq!(api.status(), Some(500));
        assert_eq!(transport.status(), None);
    }

    #[test]
    fn provisioning_error_messages_name_the_step_and_repository() {
        let err = ProvisioningError::CodeownersProbe {
            repository: repo(),
            source: HostError::Api {
                operation: "get file contents".into(),
                status: 403,
                message: "Resource not accessible by integration".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Fetching existing CODEOWNERS file in Kokodoki/dev failed"
        );
        assert_eq!(err.host_error().and_then(HostError::status), Some(403));
    }
}
