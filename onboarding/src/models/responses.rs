// API response models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// =========================
// Lists
// =========================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListStats {
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub unsubscribe_count: u64,
    #[serde(default)]
    pub cleaned_count: u64,
    #[serde(default)]
    pub open_rate: f64,
}

impl ListStats {
    pub fn estimated_analysis_seconds(&self, seconds_per_member: f64) -> f64 {
        self.member_count as f64 * seconds_per_member
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stats: ListStats,
}

/// `GET /getLists` answers `{"lists": [...]}`; older deployments send the bare array or `null`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ListsPayload {
    Wrapped { lists: Option<Vec<ListSummary>> },
    Bare(Vec<ListSummary>),
}

pub fn parse_lists(body: &str) -> Result<Vec<ListSummary>, serde_json::Error> {
    let payload: Option<ListsPayload> = serde_json::from_str(body)?;
    Ok(match payload {
        Some(ListsPayload::Wrapped { lists }) => lists.unwrap_or_default(),
        Some(ListsPayload::Bare(lists)) => lists,
        None => Vec::new(),
    })
}

// =========================
// Validation endpoints
// =========================

/// Field-keyed error body of a 400/422 answer. Only the keys are consumed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ServerValidationErrors(pub BTreeMap<String, Value>);

impl ServerValidationErrors {
    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgStatus {
    New,
    Existing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Approved,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInfoResponse {
    pub org: OrgStatus,
    #[serde(default)]
    pub user: Option<UserStatus>,
}

/// `POST /validate-org-info` answers `{"user": ...}` or a bare `true`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OrgInfoResponse {
    Detailed {
        #[serde(default)]
        user: Option<UserStatus>,
    },
    Ack(bool),
}

impl OrgInfoResponse {
    pub fn user(&self) -> Option<UserStatus> {
        match self {
            OrgInfoResponse::Detailed { user } => *user,
            OrgInfoResponse::Ack(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lists_accepts_wrapped_bare_and_null() {
        let wrapped = r#"{"lists":[{"id":"a","name":"A","stats":{"member_count":3,"unsubscribe_count":1,"cleaned_count":0,"open_rate":12.5}}]}"#;
        let lists = parse_lists(wrapped).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].stats.member_count, 3);

        let bare = r#"[{"id":"b","name":"B"}]"#;
        let lists = parse_lists(bare).unwrap();
        assert_eq!(lists[0].id, "b");
        assert_eq!(lists[0].stats, ListStats::default());

        assert!(parse_lists("null").unwrap().is_empty());
        assert!(parse_lists(r#"{"lists":null}"#).unwrap().is_empty());
    }

    #[test]
    fn parse_lists_rejects_garbage() {
        assert!(parse_lists("<html>").is_err());
    }

    #[test]
    fn server_errors_expose_keys_only() {
        let errs: ServerValidationErrors =
            serde_json::from_str(r#"{"email":["Invalid email address."],"name":"bad"}"#).unwrap();
        let ids: Vec<&str> = errs.field_ids().collect();
        assert_eq!(ids, vec!["email", "name"]);
    }

    #[test]
    fn basic_info_user_is_optional() {
        let r: BasicInfoResponse = serde_json::from_str(r#"{"org":"new"}"#).unwrap();
        assert_eq!(r.org, OrgStatus::New);
        assert_eq!(r.user, None);
        let r: BasicInfoResponse =
            serde_json::from_str(r#"{"org":"existing","user":"approved"}"#).unwrap();
        assert_eq!(r.user, Some(UserStatus::Approved));
    }

    #[test]
    fn org_info_accepts_bare_true() {
        let r: OrgInfoResponse = serde_json::from_str("true").unwrap();
        assert_eq!(r.user(), None);
        let r: OrgInfoResponse = serde_json::from_str(r#"{"user":"pending"}"#).unwrap();
        assert_eq!(r.user(), Some(UserStatus::Pending));
    }

    #[test]
    fn analysis_estimate_scales_with_members() {
        let stats = ListStats {
            member_count: 1000,
            ..Default::default()
        };
        assert!((stats.estimated_analysis_seconds(0.24) - 240.0).abs() < 1e-9);
    }
}
