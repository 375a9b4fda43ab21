//! Port traits implemented by infrastructure crates.
//!
//! The domain only describes the three remote calls it needs; the `github`
//! crate supplies them over the GitHub REST API and tests supply in-memory fakes.

use async_trait::async_trait;

use crate::{
    FilePath, FileProbe, FileWrite, HostError, OrganizationLogin, RepositoryPermission,
    RepositoryRef, TeamSlug, WrittenFile,
};

/// Remote source-hosting operations used to provision a new repository.
///
/// Implementations perform exactly one remote request per call and never
/// retry; failures are returned as [`HostError`].
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Grants `team` the given `permission` on `repository` within `org`.
    ///
    /// Re-granting an existing permission succeeds.
    async fn grant_team_permission(
        &self,
        org: &OrganizationLogin,
        team: &TeamSlug,
        repository: &RepositoryRef,
        permission: RepositoryPermission,
    ) -> Result<(), HostError>;

    /// Reads the current revision of the file at `path`.
    ///
    /// A missing file is `Ok(FileProbe::NotFound)`, not an error.
    async fn probe_file(
        &self,
        repository: &RepositoryRef,
        path: &FilePath,
    ) -> Result<FileProbe, HostError>;

    /// Creates or updates a file.
    ///
    /// `write.sha` must carry the current blob SHA when the file exists.
    async fn put_file(
        &self,
        repository: &RepositoryRef,
        write: &FileWrite,
    ) -> Result<WrittenFile, HostError>;
}
