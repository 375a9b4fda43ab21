//! [`GitHubClient`]: the REST implementation of [`RepositoryHost`].

use std::time::Duration;

use async_trait::async_trait;
use provisioning::{
    BlobSha, CommitSha, FilePath, FileProbe, FileWrite, HostError, OrganizationLogin,
    RepositoryHost, RepositoryPermission, RepositoryRef, TeamSlug, WrittenFile,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{RequestBuilder, Response, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::models::{
    ApiErrorBody, FileContents, PutContentsRequest, PutContentsResponse, TeamPermissionRequest,
};

/// Public GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned through the `X-GitHub-Api-Version` header.
pub const API_VERSION: &str = "2022-11-28";

const MEDIA_TYPE: &str = "application/vnd.github+json";

const OP_GET_CONTENTS: &str = "get file contents";
const OP_PUT_CONTENTS: &str = "create or update file contents";
const OP_TEAM_PERMISSION: &str = "add team repository permissions";

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API root, without a trailing slash requirement (e.g. [`DEFAULT_API_URL`]).
    pub api_url: String,
    /// Installation or personal access token sent as a bearer token.
    pub token: String,
    /// `User-Agent` header value; GitHub rejects requests without one.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GitHubConfig {
    /// Settings for the public API with the given token and a 30 second timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            user_agent: concat!("repo-provisioner/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Errors constructing a [`GitHubClient`].
#[derive(Debug, Error)]
pub enum GitHubClientError {
    /// The configuration is unusable.
    #[error("invalid GitHub client configuration: {0}")]
    InvalidConfig(String),

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Build(#[from] reqwest::Error),
}

/// GitHub REST client scoped to the calls the provisioner makes.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    /// Builds a client from `config`.
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubClientError> {
        if config.token.trim().is_empty() {
            return Err(GitHubClientError::InvalidConfig(
                "token must not be empty".to_string(),
            ));
        }
        let api_url = config.api_url.trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(GitHubClientError::InvalidConfig(format!(
                "API URL must be http(s): '{}'",
                config.api_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            api_url,
            token: config.token,
        })
    }

    fn contents_url(&self, repository: &RepositoryRef, path: &FilePath) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, repository.owner, repository.name, path
        )
    }

    fn team_repo_url(
        &self,
        org: &OrganizationLogin,
        team: &TeamSlug,
        repository: &RepositoryRef,
    ) -> String {
        format!(
            "{}/orgs/{}/teams/{}/repos/{}/{}",
            self.api_url, org, team, repository.owner, repository.name
        )
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, HostError> {
        request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| HostError::Transport {
                operation: operation.to_string(),
                message: e.to_string(),
            })
    }
}

/// Converts a non-success response into [`HostError::Api`], keeping GitHub's
/// `message` when the body carries one.
async fn api_error(operation: &str, response: Response) -> HostError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        });
    HostError::Api {
        operation: operation.to_string(),
        status: status.as_u16(),
        message,
    }
}

fn invalid_response(operation: &str, message: impl std::fmt::Display) -> HostError {
    HostError::InvalidResponse {
        operation: operation.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn grant_team_permission(
        &self,
        org: &OrganizationLogin,
        team: &TeamSlug,
        repository: &RepositoryRef,
        permission: RepositoryPermission,
    ) -> Result<(), HostError> {
        let url = self.team_repo_url(org, team, repository);
        debug!(url = %url, permission = %permission, "PUT team repository permission");

        let body = TeamPermissionRequest {
            permission: permission.as_str(),
        };
        let response = self
            .send(OP_TEAM_PERMISSION, self.http.put(&url).json(&body))
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(OP_TEAM_PERMISSION, response).await)
        }
    }

    async fn probe_file(
        &self,
        repository: &RepositoryRef,
        path: &FilePath,
    ) -> Result<FileProbe, HostError> {
        let url = self.contents_url(repository, path);
        debug!(url = %url, "GET file contents");

        let response = self.send(OP_GET_CONTENTS, self.http.get(&url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(FileProbe::NotFound),
            status if status.is_success() => {
                let contents: FileContents = response
                    .json()
                    .await
                    .map_err(|e| invalid_response(OP_GET_CONTENTS, e))?;
                let sha = BlobSha::new(contents.sha)
                    .ok_or_else(|| invalid_response(OP_GET_CONTENTS, "empty blob sha"))?;
                Ok(FileProbe::Found { sha })
            }
            _ => Err(api_error(OP_GET_CONTENTS, response).await),
        }
    }

    async fn put_file(
        &self,
        repository: &RepositoryRef,
        write: &FileWrite,
    ) -> Result<WrittenFile, HostError> {
        let url = self.contents_url(repository, &write.path);
        debug!(url = %url, update = write.sha.is_some(), "PUT file contents");

        let body = PutContentsRequest {
            message: &write.message,
            content: write.content.as_str(),
            sha: write.sha.as_ref().map(BlobSha::as_str),
        };
        let response = self
            .send(OP_PUT_CONTENTS, self.http.put(&url).json(&body))
            .await?;

        if !response.status().is_success() {
            return Err(api_error(OP_PUT_CONTENTS, response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| invalid_response(OP_PUT_CONTENTS, e))?;
        let parsed: PutContentsResponse = if bytes.is_empty() {
            PutContentsResponse::default()
        } else {
            serde_json::from_slice(&bytes).map_err(|e| invalid_response(OP_PUT_CONTENTS, e))?
        };

        let (sha, html_url) = match parsed.content {
            Some(content) => (content.sha.and_then(BlobSha::new), content.html_url),
            None => (None, None),
        };
        Ok(WrittenFile {
            sha,
            html_url,
            commit_sha: parsed.commit.and_then(|c| c.sha).and_then(CommitSha::new),
        })
    }
}
