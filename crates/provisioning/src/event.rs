//! The inbound `repository.created` event.
//!
//! Only the fields the provisioner reads are modelled; everything else in the
//! GitHub payload is ignored during deserialisation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{OrganizationLogin, OwnerLogin, RepositoryName, RepositoryRef};

/// Value of the `X-GitHub-Event` header for repository events.
pub const REPOSITORY_EVENT: &str = "repository";

/// The `action` of a repository event the provisioner reacts to.
pub const CREATED_ACTION: &str = "created";

/// Name of the custom property that selects the ownership policy.
pub const OWNERSHIP_PROPERTY: &str = "ownership";

// ---------------------------------------------------------------------------
// Custom properties
// ---------------------------------------------------------------------------

/// Custom property values attached to a repository by the organization.
///
/// GitHub sends single-select and text properties as strings, multi-select
/// properties as arrays, and unset properties as `null`; values are kept as
/// raw JSON and interpreted by the reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomProperties(BTreeMap<String, serde_json::Value>);

impl CustomProperties {
    /// Creates an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `name` when it is set to a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(serde_json::Value::as_str)
    }

    /// Returns `true` if no properties are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for CustomProperties
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The organization a repository event was delivered for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization login.
    pub login: OrganizationLogin,
}

/// The owner account of the created repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    /// Owner login.
    pub login: OwnerLogin,
}

/// The created repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name without the owner prefix.
    pub name: RepositoryName,
    /// Owner account.
    pub owner: RepositoryOwner,
    /// Custom properties; absent or `null` in the payload means none are set.
    #[serde(default)]
    pub custom_properties: Option<CustomProperties>,
}

/// A `repository` webhook payload with `action == "created"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryCreatedEvent {
    /// Organization the repository was created in; `None` for user-owned repositories.
    #[serde(default)]
    pub organization: Option<Organization>,
    /// The created repository.
    pub repository: Repository,
}

#[derive(Deserialize)]
struct ActionField {
    #[serde(default)]
    action: Option<String>,
}

impl RepositoryCreatedEvent {
    /// Parses the body of a `repository` webhook delivery.
    ///
    /// Returns `Ok(None)` when the payload is well-formed JSON for an action
    /// other than `created`.
    pub fn from_repository_payload(body: &[u8]) -> Result<Option<Self>, serde_json::Error> {
        let envelope: ActionField = serde_json::from_slice(body)?;
        if envelope.action.as_deref() != Some(CREATED_ACTION) {
            return Ok(None);
        }
        serde_json::from_slice(body).map(Some)
    }

    /// Returns the repository as an owner/name pair.
    pub fn repository_ref(&self) -> RepositoryRef {
        RepositoryRef::new(
            self.repository.owner.login.clone(),
            self.repository.name.clone(),
        )
    }

    /// Returns the organization login, if the event carries one.
    pub fn organization_login(&self) -> Option<&OrganizationLogin> {
        self.organization.as_ref().map(|o| &o.login)
    }

    /// Returns the repository's custom properties, empty when none were sent.
    pub fn custom_properties(&self) -> CustomProperties {
        self.repository.custom_properties.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATED_PAYLOAD: &str = r#"{
        "action": "created",
        "repository": {
            "id": 1296269,
            "name": "dev",
            "full_name": "Kokodoki/dev",
            "owner": { "login": "Kokodoki", "type": "Organization" },
            "custom_properties": { "ownership": "Dev", "tier": null }
        },
        "organization": { "login": "Kokodoki", "id": 42 },
        "sender": { "login": "kvncont" }
    }"#;

    #[test]
    fn parses_created_payload() {
        let event = RepositoryCreatedEvent::from_repository_payload(CREATED_PAYLOAD.as_bytes())
            .unwrap()
            .unwrap();
        assert_eq!(event.repository_ref().to_string(), "Kokodoki/dev");
        assert_eq!(event.organization_login().map(|o| o.as_str()), Some("Kokodoki"));
        assert_eq!(event.custom_properties().get_str(OWNERSHIP_PROPERTY), Some("Dev"));
        assert_eq!(event.custom_properties().get_str("tier"), None);
    }

    #[test]
    fn other_actions_are_skipped() {
        let body = CREATED_PAYLOAD.replace("\"created\"", "\"archived\"");
        assert_eq!(
            RepositoryCreatedEvent::from_repository_payload(body.as_bytes()).unwrap(),
            None
        );
    }

    #[test]
    fn missing_custom_properties_and_organization_are_tolerated() {
        let body = r#"{
            "action": "created",
            "repository": { "name": "scratch", "owner": { "login": "kvncont" } }
        }"#;
        let event = RepositoryCreatedEvent::from_repository_payload(body.as_bytes())
            .unwrap()
            .unwrap();
        assert!(event.organization_login().is_none());
        assert!(event.custom_properties().is_empty());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(RepositoryCreatedEvent::from_repository_payload(b"{\"action\":").is_err());
        assert!(RepositoryCreatedEvent::from_repository_payload(
            br#"{"action":"created","repository":{}}"#
        )
        .is_err());
    }

    #[test]
    fn empty_logins_and_names_are_rejected() {
        let cases = [
            r#"{"action":"created","organization":{"login":""},"repository":{"name":"dev","owner":{"login":"Kokodoki"}}}"#,
            r#"{"action":"created","organization":{"login":"Kokodoki"},"repository":{"name":"","owner":{"login":"Kokodoki"}}}"#,
            r#"{"action":"created","organization":{"login":"Kokodoki"},"repository":{"name":"dev","owner":{"login":""}}}"#,
        ];
        for body in cases {
            assert!(
                RepositoryCreatedEvent::from_repository_payload(body.as_bytes()).is_err(),
                "payload: {body}"
            );
        }
    }
}
