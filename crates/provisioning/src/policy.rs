//! Ownership policy: which team gets write access and what CODEOWNERS says.
//!
//! [`resolve`] is a pure lookup over the `ownership` custom property. It never
//! fails; unrecognised or missing values resolve to [`TeamAssignment::Unmanaged`]
//! with no CODEOWNERS file.

use serde::{Deserialize, Serialize};

use crate::event::{CustomProperties, OWNERSHIP_PROPERTY};
use crate::{EncodedContent, TeamSlug};

/// Team identifier reported for repositories no team is responsible for.
pub const UNMANAGED: &str = "Unmanaged";

const DEV_CODEOWNERS: &str = "* @kvncont\n/.github/ @kokodoki/dev\n";
const OPS_CODEOWNERS: &str = "/* @kokodoki/ops\n";

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

/// The recognised values of the `ownership` custom property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ownership {
    /// Owned by the development team.
    Dev,
    /// Owned by the operations team.
    Ops,
}

impl Ownership {
    /// Parses a property value. Matching is exact: `"dev"` is not [`Ownership::Dev`].
    pub fn from_property(value: &str) -> Option<Self> {
        match value {
            "Dev" => Some(Self::Dev),
            "Ops" => Some(Self::Ops),
            _ => None,
        }
    }

    fn team_slug(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Ops => "ops",
        }
    }

    fn codeowners(self) -> &'static str {
        match self {
            Self::Dev => DEV_CODEOWNERS,
            Self::Ops => OPS_CODEOWNERS,
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Which team, if any, should be granted write access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "team", rename_all = "snake_case")]
pub enum TeamAssignment {
    /// Grant `push` to this team.
    Team(TeamSlug),
    /// No team; no permission grant is issued.
    Unmanaged,
}

impl TeamAssignment {
    /// Returns the team slug, or [`UNMANAGED`] for unmanaged repositories.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Team(slug) => slug.as_str(),
            Self::Unmanaged => UNMANAGED,
        }
    }

    /// Returns the team to grant, if any.
    pub fn team(&self) -> Option<&TeamSlug> {
        match self {
            Self::Team(slug) => Some(slug),
            Self::Unmanaged => None,
        }
    }
}

/// Outcome of [`resolve`].
///
/// The CODEOWNERS content and the decision to write it are the same field, so
/// a write can never be requested without content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// Team to grant write access to.
    pub team: TeamAssignment,
    /// CODEOWNERS content to write; `None` means leave the file alone.
    pub codeowners: Option<EncodedContent>,
}

impl PolicyDecision {
    /// The decision for repositories no policy applies to.
    pub fn unmanaged() -> Self {
        Self {
            team: TeamAssignment::Unmanaged,
            codeowners: None,
        }
    }

    /// Returns the team slug, or [`UNMANAGED`].
    pub fn team_identifier(&self) -> &str {
        self.team.identifier()
    }

    /// Returns `true` if a CODEOWNERS file should be written.
    pub fn should_write_file(&self) -> bool {
        self.codeowners.is_some()
    }

    /// Returns the base64 CODEOWNERS content, when one should be written.
    pub fn file_content(&self) -> Option<&EncodedContent> {
        self.codeowners.as_ref()
    }
}

impl From<Ownership> for PolicyDecision {
    fn from(ownership: Ownership) -> Self {
        Self {
            team: TeamAssignment::Team(TeamSlug::from_static(ownership.team_slug())),
            codeowners: Some(EncodedContent::from_text(ownership.codeowners())),
        }
    }
}

/// Maps a repository's custom properties to a [`PolicyDecision`].
pub fn resolve(properties: &CustomProperties) -> PolicyDecision {
    match properties
        .get_str(OWNERSHIP_PROPERTY)
        .and_then(Ownership::from_property)
    {
        Some(ownership) => ownership.into(),
        None => PolicyDecision::unmanaged(),
    }
}
