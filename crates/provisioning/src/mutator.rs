//! Remote side effects of a policy decision.
//!
//! [`RemoteMutator`] wraps a [`RepositoryHost`] with the two operations the
//! handler needs. Each failure is logged with its team and repository context
//! and returned; nothing is retried.

use std::sync::Arc;

use tracing::{error, info};

use crate::{
    EncodedContent, FilePath, FileProbe, FileWrite, OrganizationLogin, ProvisioningError,
    RepositoryHost, RepositoryPermission, RepositoryRef, TeamSlug, WrittenFile,
};

/// Commit message used for every CODEOWNERS write.
pub const CODEOWNERS_COMMIT_MESSAGE: &str = "chore: add CODEOWNERS file";

/// Performs permission grants and CODEOWNERS upserts against a repository host.
#[derive(Clone)]
pub struct RemoteMutator {
    host: Arc<dyn RepositoryHost>,
}

impl RemoteMutator {
    /// Creates a mutator over `host`.
    pub fn new(host: Arc<dyn RepositoryHost>) -> Self {
        Self { host }
    }

    /// Grants `team` write (`push`) access to `repository`.
    pub async fn grant_permission(
        &self,
        org: &OrganizationLogin,
        team: &TeamSlug,
        repository: &RepositoryRef,
    ) -> Result<(), ProvisioningError> {
        match self
            .host
            .grant_team_permission(org, team, repository, RepositoryPermission::Push)
            .await
        {
            Ok(()) => {
                info!(
                    org = %org,
                    team = %team,
                    repository = %repository,
                    "Write permissions granted to team"
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    org = %org,
                    team = %team,
                    repository = %repository,
                    error = %source,
                    "Error granting permissions to team"
                );
                Err(ProvisioningError::PermissionGrant {
                    team: team.clone(),
                    repository: repository.clone(),
                    source,
                })
            }
        }
    }

    /// Creates `.github/CODEOWNERS`, or replaces it when it already exists.
    ///
    /// The existing file is probed first so the write can carry its blob SHA.
    /// A probe failure other than "not found" aborts before the write.
    pub async fn upsert_codeowners_file(
        &self,
        repository: &RepositoryRef,
        content: &EncodedContent,
    ) -> Result<WrittenFile, ProvisioningError> {
        let path = FilePath::codeowners();

        let probe = self
            .host
            .probe_file(repository, &path)
            .await
            .map_err(|source| {
                error!(
                    repository = %repository,
                    error = %source,
                    "Error fetching existing CODEOWNERS file"
                );
                ProvisioningError::CodeownersProbe {
                    repository: repository.clone(),
                    source,
                }
            })?;

        match &probe {
            FileProbe::Found { sha } => {
                info!(repository = %repository, sha = %sha, "Existing CODEOWNERS file found");
            }
            FileProbe::NotFound => {
                info!(
                    repository = %repository,
                    "No existing CODEOWNERS file found, creating a new one"
                );
            }
        }

        let write = FileWrite {
            path,
            message: CODEOWNERS_COMMIT_MESSAGE.to_string(),
            content: content.clone(),
            sha: probe.revision().cloned(),
        };

        let written = self
            .host
            .put_file(repository, &write)
            .await
            .map_err(|source| {
                error!(
                    repository = %repository,
                    error = %source,
                    "Error writing CODEOWNERS file"
                );
                ProvisioningError::CodeownersWrite {
                    repository: repository.clone(),
                    source,
                }
            })?;

        info!(repository = %repository, "CODEOWNERS file written");
        Ok(written)
    }
}
