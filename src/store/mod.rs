//! Row-store contract for the approval workflow.
//!
//! The verifier only needs three primitives from its backing store:
//! fetch-one-by-token (joined with the creator), a conditional update that
//! acts as a compare-and-set on `(id, token, pending)`, and an append-only
//! history insert. Everything else here serves issuance and operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::approval::{ApprovalEvent, ApprovalStatus, NewApprovalHistory};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Cheap round-trip used by readiness checks.
    async fn ping(&self) -> anyhow::Result<()>;

    async fn find_event(&self, event_id: i64) -> anyhow::Result<Option<ApprovalEvent>>;

    /// Exact-match lookup on `approval_token`. Cleared tokens never match.
    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<ApprovalEvent>>;

    async fn approval_status(&self, event_id: i64) -> anyhow::Result<Option<ApprovalStatus>>;

    /// Move a pending event to `status`, stamp `responded_at` and clear the token
    /// in one statement. Only applies while the row still holds `token` and is
    /// `pending_approval`; returns `false` when another writer got there first.
    async fn commit_transition(
        &self,
        event_id: i64,
        token: &str,
        status: ApprovalStatus,
        responded_at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;

    async fn append_history(&self, entry: &NewApprovalHistory) -> anyhow::Result<()>;

    /// Install a fresh token on an event that is not yet terminal.
    /// Returns `false` if the event is missing or already approved/rejected.
    async fn store_token(
        &self,
        event_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;

    /// Events still awaiting the contact's decision, oldest first.
    async fn list_pending(&self) -> anyhow::Result<Vec<ApprovalEvent>>;
}
