//! User record returned by the identity service and cached between navigations.

use serde::{Deserialize, Serialize};

/// Permission string granting every permission.
pub const WILDCARD_PERMISSION: &str = "*";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "uuid", alias = "id", default)]
    pub id: String,
    #[serde(rename = "rolename", alias = "name", default)]
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub hierarchy: i32,
}

/// Authenticated account as seen by the client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "uuid", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Member {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Checks whether the member's role grants `permission`.
    ///
    /// Members without a role hold no permissions.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.role.as_ref().is_some_and(|role| {
            role.permissions
                .iter()
                .any(|p| p == WILDCARD_PERMISSION || p == permission)
        })
    }
}

/// Cached member paired with a freshness check.
///
/// Freshness is not stored here: it is the presence of the verification
/// marker at the time of the check, see
/// [`SessionStore::is_fresh`](super::store::SessionStore::is_fresh).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedMember {
    pub member: Member,
}

impl CachedMember {
    #[must_use]
    pub fn new(member: Member) -> Self {
        Self { member }
    }

    #[must_use]
    pub fn into_member(self) -> Member {
        self.member
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(permissions: &[&str]) -> Role {
        Role {
            id: "r1".to_string(),
            name: "editor".to_string(),
            permissions: permissions.iter().map(ToString::to_string).collect(),
            hierarchy: 10,
        }
    }

    #[test]
    fn has_permission_without_role_is_false() {
        let member = Member::new("u1");
        assert!(!member.has_permission("posts.read"));
    }

    #[test]
    fn has_permission_matches_listed_permission() {
        let member = Member::new("u1").with_role(role(&["posts.read"]));
        assert!(member.has_permission("posts.read"));
        assert!(!member.has_permission("posts.write"));
    }

    #[test]
    fn has_permission_wildcard_grants_everything() {
        let member = Member::new("u1").with_role(role(&["*"]));
        assert!(member.has_permission("anything.at.all"));
    }

    #[test]
    fn deserializes_identity_service_payload() {
        let json = r#"{
            "uuid": "u1",
            "username": "alice",
            "email": "alice@example.com",
            "role": {"uuid": "r1", "rolename": "admin", "permissions": ["*"], "hierarchy": 100}
        }"#;
        let member: Member = serde_json::from_str(json).expect("payload should parse");
        assert_eq!(member.id, "u1");
        assert_eq!(member.username, "alice");
        let role = member.role.expect("role should be present");
        assert_eq!(role.name, "admin");
        assert_eq!(role.hierarchy, 100);
    }

    #[test]
    fn deserializes_minimal_payload_with_id_alias() {
        let member: Member = serde_json::from_str(r#"{"id": "u1"}"#).expect("payload should parse");
        assert_eq!(member, Member::new("u1"));
    }
}
