//! Shared value types for the provisioning domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. file content is always valid base64)
//! and describe what is read from and written to the repository host.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BlobSha, CommitSha, FilePath};

// ---------------------------------------------------------------------------
// File content
// ---------------------------------------------------------------------------

/// File content in the base64 encoding the GitHub contents API expects.
///
/// Built from raw text, or deserialised from a string that must itself be
/// valid base64, so the encoding is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedContent(String);

impl EncodedContent {
    /// Encodes `text` as standard (padded) base64.
    pub fn from_text(text: &str) -> Self {
        Self(STANDARD.encode(text.as_bytes()))
    }

    /// Returns the base64 string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes the content back to UTF-8 text.
    ///
    /// Returns `None` only if the decoded bytes are not UTF-8, which cannot
    /// happen for values built through [`EncodedContent::from_text`].
    pub fn decode(&self) -> Option<String> {
        let bytes = STANDARD.decode(&self.0).ok()?;
        String::from_utf8(bytes).ok()
    }
}

impl TryFrom<String> for EncodedContent {
    type Error = base64::DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        STANDARD.decode(&value)?;
        Ok(Self(value))
    }
}

impl From<EncodedContent> for String {
    fn from(content: EncodedContent) -> Self {
        content.0
    }
}

impl std::fmt::Display for EncodedContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// Permission level a team can be granted on a repository.
///
/// Serialised with the names the GitHub teams API uses (`"push"` is write).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryPermission {
    /// Read-only access.
    Pull,
    /// Read access plus issue and pull request triage.
    Triage,
    /// Write access.
    Push,
    /// Write access plus repository settings that are not destructive.
    Maintain,
    /// Full administrative access.
    Admin,
}

impl RepositoryPermission {
    /// Returns the wire name of this permission.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Triage => "triage",
            Self::Push => "push",
            Self::Maintain => "maintain",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for RepositoryPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Remote file state
// ---------------------------------------------------------------------------

/// Result of probing a path in a repository before writing to it.
///
/// A missing file is an expected outcome, not an error; transport and API
/// failures are reported separately through [`crate::HostError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FileProbe {
    /// A file exists at the path with the given blob SHA.
    Found {
        /// Current blob SHA; required to update the file.
        sha: BlobSha,
    },
    /// Nothing exists at the path; a write will create it.
    NotFound,
}

impl FileProbe {
    /// Returns the revision marker to send with a write, if a file exists.
    pub fn revision(&self) -> Option<&BlobSha> {
        match self {
            Self::Found { sha } => Some(sha),
            Self::NotFound => None,
        }
    }
}

/// A create-or-update request for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWrite {
    /// Path of the file relative to the repository root.
    pub path: FilePath,
    /// Commit message for the write.
    pub message: String,
    /// New file content.
    pub content: EncodedContent,
    /// Blob SHA of the file being replaced. `None` creates a new file.
    pub sha: Option<BlobSha>,
}

/// Metadata of a file after a successful write.
///
/// Every field is optional: the contents API may answer with an abbreviated
/// body, and callers only use these values for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    /// Blob SHA of the new file revision.
    pub sha: Option<BlobSha>,
    /// Browser URL of the file.
    pub html_url: Option<String>,
    /// SHA of the commit that carried the write.
    pub commit_sha: Option<CommitSha>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_content_is_standard_base64() {
        let content = EncodedContent::from_text("/* @kokodoki/ops\n");
        assert_eq!(content.as_str(), "LyogQGtva29kb2tpL29wcwo=");
        assert_eq!(content.decode().as_deref(), Some("/* @kokodoki/ops\n"));
    }

    #[test]
    fn encoded_content_only_deserialises_from_base64() {
        let content: EncodedContent = serde_json::from_str("\"LyogQGtva29kb2tpL29wcwo=\"").unwrap();
        assert_eq!(content.decode().as_deref(), Some("/* @kokodoki/ops\n"));
        assert!(serde_json::from_str::<EncodedContent>("\"not base64!\"").is_err());
    }

    #[test]
    fn push_permission_uses_wire_name() {
        assert_eq!(RepositoryPermission::Push.as_str(), "push");
        assert_eq!(
            serde_json::to_string(&RepositoryPermission::Push).unwrap(),
            "\"push\""
        );
    }

    #[test]
    fn probe_revision_is_only_present_when_found() {
        let sha = BlobSha::new("3d21ec53a331a6f037a91c368710b99387d012c1").unwrap();
        assert_eq!(FileProbe::Found { sha: sha.clone() }.revision(), Some(&sha));
        assert_eq!(FileProbe::NotFound.revision(), None);
    }
}
