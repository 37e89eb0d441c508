use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Approval state of an event created on behalf of a third-party contact.
/// `Approved` and `Rejected` are terminal.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum ApprovalStatus {
    PendingApproval,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::PendingApproval => "pending_approval",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::PendingApproval)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What the contact asked for by clicking one of the two emailed links.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalAction::Approve => "approve",
            ApprovalAction::Reject => "reject",
        }
    }

    /// The terminal status this action resolves to.
    pub fn resulting_status(&self) -> ApprovalStatus {
        match self {
            ApprovalAction::Approve => ApprovalStatus::Approved,
            ApprovalAction::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Only the two exact literals are accepted; no case folding.
impl FromStr for ApprovalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ApprovalAction::Approve),
            "reject" => Ok(ApprovalAction::Reject),
            other => Err(other.to_string()),
        }
    }
}

/// The account that created an event (joined from `users`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Creator {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

/// The subset of an `events` row the approval workflow reads and writes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApprovalEvent {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub venue_name: Option<String>,
    pub venue_type: Option<String>,
    pub contact_email: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
    pub approval_token: Option<String>,
    pub approval_token_expires_at: Option<DateTime<Utc>>,
    pub approval_responded_at: Option<DateTime<Utc>>,
    pub created_by: Option<Creator>,
    pub created_at: DateTime<Utc>,
}

impl ApprovalEvent {
    /// A token is expired from its expiry instant onward.
    pub fn token_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.approval_token_expires_at
            .map(|expires| expires <= now)
            .unwrap_or(false)
    }
}

/// Who clicked the link, as far as the HTTP layer can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterMeta {
    pub ip_address: String,
    pub user_agent: String,
}

impl Default for RequesterMeta {
    fn default() -> Self {
        Self {
            ip_address: "unknown".into(),
            user_agent: "unknown".into(),
        }
    }
}

/// Row to append to `event_approval_history`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApprovalHistory {
    pub event_id: i64,
    pub contact_email: Option<String>,
    pub action: ApprovalStatus,
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ApprovalHistoryEntry {
    pub id: Uuid,
    pub event_id: i64,
    pub contact_email: Option<String>,
    pub action: ApprovalStatus,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_action_parsing_is_exact() {
        assert_eq!("approve".parse::<ApprovalAction>(), Ok(ApprovalAction::Approve));
        assert_eq!("reject".parse::<ApprovalAction>(), Ok(ApprovalAction::Reject));
        assert!("Approve".parse::<ApprovalAction>().is_err());
        assert!("maybe".parse::<ApprovalAction>().is_err());
        assert!("".parse::<ApprovalAction>().is_err());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(ApprovalStatus::PendingApproval).unwrap(),
            "pending_approval"
        );
        assert_eq!(ApprovalStatus::Approved.to_string(), "approved");
        assert!(ApprovalStatus::Rejected.is_terminal());
        assert!(!ApprovalStatus::PendingApproval.is_terminal());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let mut event = ApprovalEvent {
            id: 1,
            title: "t".into(),
            description: None,
            category: "c".into(),
            venue_name: None,
            venue_type: None,
            contact_email: None,
            approval_status: Some(ApprovalStatus::PendingApproval),
            approval_token: Some("tok".into()),
            approval_token_expires_at: Some(now),
            approval_responded_at: None,
            created_by: None,
            created_at: now,
        };
        assert!(event.token_expired_at(now));

        event.approval_token_expires_at = Some(now + Duration::seconds(1));
        assert!(!event.token_expired_at(now));

        event.approval_token_expires_at = None;
        assert!(!event.token_expired_at(now));
    }
}
