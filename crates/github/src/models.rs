//! Request and response bodies of the GitHub REST endpoints the client calls.
//!
//! Only the fields the provisioner reads are modelled.

use serde::{Deserialize, Serialize};

/// `GET /repos/{owner}/{repo}/contents/{path}` for a single file.
#[derive(Debug, Deserialize)]
pub(crate) struct FileContents {
    pub sha: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Serialize)]
pub(crate) struct PutContentsRequest<'a> {
    pub message: &'a str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

/// Response of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PutContentsResponse {
    #[serde(default)]
    pub content: Option<ContentMetadata>,
    #[serde(default)]
    pub commit: Option<CommitMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentMetadata {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitMetadata {
    #[serde(default)]
    pub sha: Option<String>,
}

/// Body of `PUT /orgs/{org}/teams/{team_slug}/repos/{owner}/{repo}`.
#[derive(Debug, Serialize)]
pub(crate) struct TeamPermissionRequest<'a> {
    pub permission: &'a str,
}

/// Error body returned by the API for non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
