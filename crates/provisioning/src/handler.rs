//! Processing of one `repository.created` event.
//!
//! [`RepositoryCreatedHandler::handle`] resolves the ownership policy and then
//! issues, in order, the permission grant and the CODEOWNERS upsert. The two
//! remote steps are not transactional: a failed upsert does not undo a grant.
//! The returned `Result` is the error-reporting boundary; callers decide
//! whether to log and drop or to surface the failure.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};

use crate::policy::{self, PolicyDecision};
use crate::{
    InvocationId, ProvisioningError, RemoteMutator, RepositoryCreatedEvent, RepositoryHost,
    RepositoryRef, TeamSlug, Timestamp, WrittenFile,
};

/// What was done for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningReport {
    /// Correlation identifier of this invocation.
    pub invocation: InvocationId,
    /// The created repository.
    pub repository: RepositoryRef,
    /// When processing started.
    pub received_at: Timestamp,
    /// The resolved ownership policy.
    pub decision: PolicyDecision,
    /// Team granted `push`, if a grant was issued.
    pub team_grant: Option<TeamSlug>,
    /// Metadata of the written CODEOWNERS file, if one was written.
    pub codeowners: Option<WrittenFile>,
}

/// Reacts to repository creation by applying the ownership policy.
#[derive(Clone)]
pub struct RepositoryCreatedHandler {
    mutator: RemoteMutator,
}

impl RepositoryCreatedHandler {
    /// Creates a handler that performs its side effects through `host`.
    pub fn new(host: Arc<dyn RepositoryHost>) -> Self {
        Self {
            mutator: RemoteMutator::new(host),
        }
    }

    /// Processes `event` under a freshly generated [`InvocationId`].
    pub async fn handle(
        &self,
        event: &RepositoryCreatedEvent,
    ) -> Result<ProvisioningReport, ProvisioningError> {
        self.handle_invocation(InvocationId::new_random(), event)
            .await
    }

    /// Processes `event` under the given invocation identifier.
    pub async fn handle_invocation(
        &self,
        invocation: InvocationId,
        event: &RepositoryCreatedEvent,
    ) -> Result<ProvisioningReport, ProvisioningError> {
        let repository = event.repository_ref();
        let span = tracing::info_span!(
            "repository_created",
            invocation = %invocation,
            repository = %repository,
        );
        self.process(invocation, repository, event)
            .instrument(span)
            .await
    }

    async fn process(
        &self,
        invocation: InvocationId,
        repository: RepositoryRef,
        event: &RepositoryCreatedEvent,
    ) -> Result<ProvisioningReport, ProvisioningError> {
        let received_at = Timestamp::now();
        info!(repository = %repository, "Repository created");

        let properties = event.custom_properties();
        let decision = policy::resolve(&properties);
        if decision.team.team().is_none() {
            info!(
                repository = %repository,
                ownership = ?properties.get_str(crate::event::OWNERSHIP_PROPERTY),
                "No ownership policy matches; repository left unmanaged"
            );
        }

        let mut team_grant = None;
        if let Some(team) = decision.team.team() {
            let org = event.organization_login().ok_or_else(|| {
                ProvisioningError::MissingOrganization {
                    repository: repository.clone(),
                    team: team.clone(),
                }
            })?;
            self.mutator.grant_permission(org, team, &repository).await?;
            team_grant = Some(team.clone());
        }

        let mut codeowners = None;
        if let Some(content) = decision.file_content() {
            codeowners = Some(
                self.mutator
                    .upsert_codeowners_file(&repository, content)
                    .await?,
            );
        }

        Ok(ProvisioningReport {
            invocation,
            repository,
            received_at,
            decision,
            team_grant,
            codeowners,
        })
    }
}
