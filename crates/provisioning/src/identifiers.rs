//! Newtype domain identifiers.
//!
//! Every GitHub name the provisioner passes around is a distinct newtype wrapping
//! a `String`. This prevents accidentally interchanging, for example, an
//! [`OrganizationLogin`] with an [`OwnerLogin`] when building API paths, even
//! though both are plain logins on the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A GitHub name that arrived empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} must not be empty")]
pub struct EmptyIdentifier(&'static str);

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, and
// String conversions. Deserialisation goes through TryFrom<String>, so an
// empty value in a payload is a parse error.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmptyIdentifier;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(EmptyIdentifier(stringify!($name)))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: internally generated
// ---------------------------------------------------------------------------

/// Identifies one processing of one delivered event.
///
/// Generated fresh for every delivery (webhook or CLI replay); attached to the
/// tracing span and the [`crate::ProvisioningReport`] so all activity from a
/// single invocation can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub names
// ---------------------------------------------------------------------------

string_id! {
    /// Login of the organization the repository was created in (e.g. `"Kokodoki"`).
    OrganizationLogin
}

string_id! {
    /// Login of the repository owner. For organization repositories this equals
    /// the organization login.
    OwnerLogin
}

string_id! {
    /// Short repository name without the owner prefix (e.g. `"dev"`).
    RepositoryName
}

string_id! {
    /// URL-safe team slug within an organization (e.g. `"dev"`, `"ops"`).
    TeamSlug
}

impl TeamSlug {
    /// Wraps one of the crate's built-in slugs.
    pub(crate) fn from_static(slug: &'static str) -> Self {
        debug_assert!(!slug.is_empty());
        Self(slug.to_string())
    }
}

string_id! {
    /// Git blob SHA of a file at a specific revision.
    ///
    /// GitHub requires the current blob SHA when updating an existing file; it is
    /// the optimistic-concurrency token for the contents API.
    BlobSha
}

string_id! {
    /// Git commit SHA produced by a contents-API write.
    CommitSha
}

string_id! {
    /// A file-system path relative to the repository root (e.g. `".github/CODEOWNERS"`).
    FilePath
}

/// Location of the CODEOWNERS file the provisioner manages.
pub const CODEOWNERS_PATH: &str = ".github/CODEOWNERS";

impl FilePath {
    /// The path of the managed CODEOWNERS file.
    pub fn codeowners() -> Self {
        Self(CODEOWNERS_PATH.to_string())
    }
}

string_id! {
    /// Value of the `X-GitHub-Delivery` header identifying one webhook delivery.
    DeliveryId
}

// ---------------------------------------------------------------------------
// Composite identifiers
// ---------------------------------------------------------------------------

/// A repository addressed by owner and name, as the GitHub REST API expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Owner login.
    pub owner: OwnerLogin,
    /// Repository name.
    pub name: RepositoryName,
}

impl RepositoryRef {
    /// Creates a new [`RepositoryRef`].
    pub fn new(owner: OwnerLogin, name: RepositoryName) -> Self {
        Self { owner, name }
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
