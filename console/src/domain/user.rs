//! User records and the request payloads that mutate them.
//!
//! Identity is a backend-assigned integer and immutable. The same structural
//! shape is returned by list and single-item operations, so one record type
//! serves both.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend-assigned record identifier shared by all admin resources.
pub type RecordId = i64;

/// An administrable account as returned by the users endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Immutable backend-assigned identity.
    pub id: RecordId,
    /// Address the account was registered under.
    pub email: String,
    /// Unique login handle.
    pub username: String,
    /// Optional public display name.
    pub display_name: Option<String>,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Whether the account holds master privileges.
    pub is_master: bool,
    /// Whether an administrator has approved the account.
    pub is_approved: bool,
    /// Creation audit timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modification audit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Aggregate account counts shown in the users screen header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// All accounts.
    pub total: i64,
    /// Accounts an administrator approved.
    pub approved: i64,
    /// Accounts awaiting approval.
    pub pending: i64,
    /// Accounts allowed to sign in.
    pub active: i64,
    /// Accounts barred from signing in.
    pub inactive: i64,
    /// Accounts with master privileges.
    pub master: i64,
}

impl From<BTreeMap<String, i64>> for UserStats {
    /// Lift the envelope's loose `meta.stats` map into the typed header
    /// counts; absent keys count as zero.
    fn from(stats: BTreeMap<String, i64>) -> Self {
        let count = |key: &str| stats.get(key).copied().unwrap_or(0);
        Self {
            total: count("total"),
            approved: count("approved"),
            pending: count("pending"),
            active: count("active"),
            inactive: count("inactive"),
            master: count("master"),
        }
    }
}

/// One page of the users list plus its aggregate metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListPage {
    /// Records matching the active filters.
    pub users: Vec<User>,
    /// Server-side count of matching records.
    pub count: i64,
    /// Aggregate header counts, when the server supplied them.
    pub stats: Option<UserStats>,
}

/// Payload for creating an account from the admin screen.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Address to register the account under.
    pub email: String,
    /// Unique login handle.
    pub username: String,
    /// Initial password.
    pub password: String,
    /// Optional public display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Pre-approve the account on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
    /// Grant master privileges on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_master: Option<bool>,
    /// Activate the account on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Partial update for an account; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// Replace the display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Toggle sign-in permission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Toggle master privileges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_master: Option<bool>,
    /// Toggle administrator approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
}

#[cfg(test)]
mod tests {
    //! Wire-shape coverage for user records and patches.

    use super::*;

    #[test]
    fn user_decodes_from_wire_shape() {
        let body = r#"{
            "id": 7,
            "email": "gil@minihome.page",
            "username": "master_gil",
            "displayName": null,
            "isActive": true,
            "isMaster": false,
            "isApproved": false,
            "createdAt": "2024-03-01T09:30:00Z",
            "updatedAt": "2024-03-02T10:00:00Z"
        }"#;

        let user: User = serde_json::from_str(body).expect("wire shape decodes");
        assert_eq!(user.id, 7);
        assert!(user.display_name.is_none());
        assert!(!user.is_approved);
    }

    #[test]
    fn patch_omits_unset_fields() {
        let patch = UserPatch {
            is_approved: Some(true),
            ..UserPatch::default()
        };
        let json = serde_json::to_value(&patch).expect("patch serialises");
        assert_eq!(json, serde_json::json!({ "isApproved": true }));
    }

    #[test]
    fn stats_lift_defaults_missing_keys_to_zero() {
        let mut raw = BTreeMap::new();
        raw.insert("total".to_owned(), 12);
        raw.insert("approved".to_owned(), 9);
        let stats = UserStats::from(raw);
        assert_eq!(stats.total, 12);
        assert_eq!(stats.approved, 9);
        assert_eq!(stats.pending, 0);
    }
}
