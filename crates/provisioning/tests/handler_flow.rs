//! End-to-end handler flows against an in-memory repository host.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use provisioning::{
    BlobSha, FilePath, FileProbe, FileWrite, HostError, OrganizationLogin, ProvisioningError,
    RepositoryCreatedEvent, RepositoryCreatedHandler, RepositoryHost, RepositoryPermission,
    RepositoryRef, TeamSlug, WrittenFile, CODEOWNERS_COMMIT_MESSAGE, CODEOWNERS_PATH,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Grant {
        org: String,
        team: String,
        repository: String,
        permission: RepositoryPermission,
    },
    Probe {
        repository: String,
        path: String,
    },
    Put {
        repository: String,
        write: FileWrite,
    },
}

struct RecordingHost {
    calls: Mutex<Vec<Call>>,
    probe: Result<FileProbe, HostError>,
    grant: Result<(), HostError>,
    put_error: Option<HostError>,
}

impl RecordingHost {
    fn new(probe: Result<FileProbe, HostError>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            probe,
            grant: Ok(()),
            put_error: None,
        }
    }

    fn failing_put(error: HostError) -> Self {
        Self {
            put_error: Some(error),
            ..Self::new(Ok(FileProbe::NotFound))
        }
    }

    fn failing_grant(error: HostError) -> Self {
        Self {
            grant: Err(error),
            ..Self::new(Ok(FileProbe::NotFound))
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositoryHost for RecordingHost {
    async fn grant_team_permission(
        &self,
        org: &OrganizationLogin,
        team: &TeamSlug,
        repository: &RepositoryRef,
        permission: RepositoryPermission,
    ) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(Call::Grant {
            org: org.to_string(),
            team: team.to_string(),
            repository: repository.to_string(),
            permission,
        });
        self.grant.clone()
    }

    async fn probe_file(
        &self,
        repository: &RepositoryRef,
        path: &FilePath,
    ) -> Result<FileProbe, HostError> {
        self.calls.lock().unwrap().push(Call::Probe {
            repository: repository.to_string(),
            path: path.to_string(),
        });
        self.probe.clone()
    }

    async fn put_file(
        &self,
        repository: &RepositoryRef,
        write: &FileWrite,
    ) -> Result<WrittenFile, HostError> {
        self.calls.lock().unwrap().push(Call::Put {
            repository: repository.to_string(),
            write: write.clone(),
        });
        if let Some(err) = &self.put_error {
            return Err(err.clone());
        }
        Ok(WrittenFile {
            sha: BlobSha::new("95b966ae1c166bd92f8ae7d1c313e738c731dfc3"),
            html_url: Some(format!("https://github.com/{repository}/blob/main/{CODEOWNERS_PATH}")),
            commit_sha: None,
        })
    }
}

fn event(ownership: Option<&str>) -> RepositoryCreatedEvent {
    let properties = match ownership {
        Some(value) => serde_json::json!({ "ownership": value }),
        None => serde_json::json!({}),
    };
    let body = serde_json::json!({
        "action": "created",
        "organization": { "login": "Kokodoki" },
        "repository": {
            "name": "dev",
            "owner": { "login": "Kokodoki" },
            "custom_properties": properties,
        },
    });
    RepositoryCreatedEvent::from_repository_payload(body.to_string().as_bytes())
        .unwrap()
        .unwrap()
}

fn handler(host: &Arc<RecordingHost>) -> RepositoryCreatedHandler {
    RepositoryCreatedHandler::new(host.clone())
}

#[tokio::test]
async fn dev_repository_gets_grant_and_new_codeowners_file() {
    let host = Arc::new(RecordingHost::new(Ok(FileProbe::NotFound)));

    let report = handler(&host).handle(&event(Some("Dev"))).await.unwrap();

    let calls = host.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[0],
        Call::Grant {
            org: "Kokodoki".into(),
            team: "dev".into(),
            repository: "Kokodoki/dev".into(),
            permission: RepositoryPermission::Push,
        }
    );
    assert_eq!(
        calls[1],
        Call::Probe {
            repository: "Kokodoki/dev".into(),
            path: CODEOWNERS_PATH.into(),
        }
    );
    let Call::Put { repository, write } = &calls[2] else {
        panic!("expected a file write, got {:?}", calls[2]);
    };
    assert_eq!(repository, "Kokodoki/dev");
    assert_eq!(write.path.as_str(), CODEOWNERS_PATH);
    assert_eq!(write.message, CODEOWNERS_COMMIT_MESSAGE);
    assert_eq!(
        write.content.as_str(),
        "KiBAa3ZuY29udAovLmdpdGh1Yi8gQGtva29kb2tpL2Rldgo="
    );
    assert_eq!(write.sha, None);

    assert_eq!(report.team_grant.as_ref().map(TeamSlug::as_str), Some("dev"));
    assert!(report.codeowners.is_some());
}

#[tokio::test]
async fn existing_codeowners_revision_is_sent_with_the_update() {
    let existing = BlobSha::new("3d21ec53a331a6f037a91c368710b99387d012c1").unwrap();
    let host = Arc::new(RecordingHost::new(Ok(FileProbe::Found {
        sha: existing.clone(),
    })));

    handler(&host).handle(&event(Some("Ops"))).await.unwrap();

    let calls = host.calls();
    let Some(Call::Put { write, .. }) = calls.last() else {
        panic!("expected a file write, got {calls:?}");
    };
    assert_eq!(write.sha, Some(existing));
    assert_eq!(write.content.decode().as_deref(), Some("/* @kokodoki/ops\n"));
}

#[tokio::test]
async fn unmanaged_repositories_see_no_remote_calls() {
    for ownership in [Some("Other"), None] {
        let host = Arc::new(RecordingHost::new(Ok(FileProbe::NotFound)));

        let report = handler(&host).handle(&event(ownership)).await.unwrap();

        assert!(host.calls().is_empty(), "ownership {ownership:?}");
        assert_eq!(report.decision.team_identifier(), "Unmanaged");
        assert!(report.team_grant.is_none());
        assert!(report.codeowners.is_none());
    }
}

#[tokio::test]
async fn probe_failure_stops_before_the_write() {
    let host = Arc::new(RecordingHost::new(Err(HostError::Api {
        operation: "get file contents".into(),
        status: 500,
        message: "Internal Server Error".into(),
    })));

    let err = handler(&host).handle(&event(Some("Dev"))).await.unwrap_err();

    assert!(matches!(err, ProvisioningError::CodeownersProbe { .. }));
    assert_eq!(err.host_error().and_then(HostError::status), Some(500));
    assert!(!host
        .calls()
        .iter()
        .any(|call| matches!(call, Call::Put { .. })));
}

#[tokio::test]
async fn grant_failure_is_reported_and_skips_the_file() {
    let host = Arc::new(RecordingHost::failing_grant(HostError::Api {
        operation: "add team repository permissions".into(),
        status: 404,
        message: "Not Found".into(),
    }));

    let err = handler(&host).handle(&event(Some("Ops"))).await.unwrap_err();

    match err {
        ProvisioningError::PermissionGrant { team, .. } => assert_eq!(team.as_str(), "ops"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(host.calls().len(), 1);
}

#[tokio::test]
async fn write_failure_is_reported_and_keeps_the_grant() {
    let host = Arc::new(RecordingHost::failing_put(HostError::Api {
        operation: "create or update file contents".into(),
        status: 409,
        message: "is at 3d21ec53a331a6f037a91c368710b99387d012c1 but expected 95b966ae".into(),
    }));

    let err = handler(&host).handle(&event(Some("Dev"))).await.unwrap_err();

    match &err {
        ProvisioningError::CodeownersWrite { repository, .. } => {
            assert_eq!(repository.to_string(), "Kokodoki/dev")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.host_error().and_then(HostError::status), Some(409));

    let calls = host.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], Call::Grant { .. }));
    assert!(matches!(calls[2], Call::Put { .. }));
}

#[tokio::test]
async fn managed_repository_without_organization_fails_before_any_call() {
    let host = Arc::new(RecordingHost::new(Ok(FileProbe::NotFound)));
    let mut event = event(Some("Dev"));
    event.organization = None;

    let err = handler(&host).handle(&event).await.unwrap_err();

    assert!(matches!(err, ProvisioningError::MissingOrganization { .. }));
    assert!(host.calls().is_empty());
}
