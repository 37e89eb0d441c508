//! In-process `ApprovalStore` used as the test fake.
//!
//! All mutations happen under one lock, so `commit_transition` has the same
//! compare-and-set behaviour as the single-statement SQL update.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::ApprovalStore;
use crate::models::approval::{ApprovalEvent, ApprovalStatus, NewApprovalHistory};

#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<HashMap<i64, ApprovalEvent>>,
    history: Mutex<Vec<(NewApprovalHistory, DateTime<Utc>)>>,
    calls: AtomicUsize,
    fail_commit: AtomicBool,
    fail_history: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(self, event: ApprovalEvent) -> Self {
        self.insert(event);
        self
    }

    pub fn insert(&self, event: ApprovalEvent) {
        self.events.lock().unwrap().insert(event.id, event);
    }

    pub fn event(&self, event_id: i64) -> Option<ApprovalEvent> {
        self.events.lock().unwrap().get(&event_id).cloned()
    }

    /// History rows in insertion order.
    pub fn history(&self) -> Vec<NewApprovalHistory> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .map(|(entry, _)| entry.clone())
            .collect()
    }

    /// Number of trait calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next transition writes fail as if the database were down.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ApprovalStore for MemoryStore {
    async fn ping(&self) -> anyhow::Result<()> {
        self.touch();
        Ok(())
    }

    async fn find_event(&self, event_id: i64) -> anyhow::Result<Option<ApprovalEvent>> {
        self.touch();
        Ok(self.event(event_id))
    }

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<ApprovalEvent>> {
        self.touch();
        let events = self.events.lock().unwrap();
        Ok(events
            .values()
            .find(|e| e.approval_token.as_deref() == Some(token))
            .cloned())
    }

    async fn approval_status(&self, event_id: i64) -> anyhow::Result<Option<ApprovalStatus>> {
        self.touch();
        Ok(self
            .events
            .lock()
            .unwrap()
            .get(&event_id)
            .and_then(|e| e.approval_status))
    }

    async fn commit_transition(
        &self,
        event_id: i64,
        token: &str,
        status: ApprovalStatus,
        responded_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        self.touch();
        if self.fail_commit.load(Ordering::SeqCst) {
            anyhow::bail!("connection reset while updating event {}", event_id);
        }

        let mut events = self.events.lock().unwrap();
        let Some(event) = events.get_mut(&event_id) else {
            return Ok(false);
        };
        if event.approval_token.as_deref() != Some(token)
            || event.approval_status != Some(ApprovalStatus::PendingApproval)
        {
            return Ok(false);
        }

        event.approval_status = Some(status);
        event.approval_responded_at = Some(responded_at);
        event.approval_token = None;
        Ok(true)
    }

    async fn append_history(&self, entry: &NewApprovalHistory) -> anyhow::Result<()> {
        self.touch();
        if self.fail_history.load(Ordering::SeqCst) {
            anyhow::bail!("insert into event_approval_history failed");
        }
        self.history.lock().unwrap().push((entry.clone(), Utc::now()));
        Ok(())
    }

    async fn store_token(
        &self,
        event_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        self.touch();
        let mut events = self.events.lock().unwrap();
        let Some(event) = events.get_mut(&event_id) else {
            return Ok(false);
        };
        if event.approval_status.is_some_and(|s| s.is_terminal()) {
            return Ok(false);
        }

        event.approval_status = Some(ApprovalStatus::PendingApproval);
        event.approval_token = Some(token.to_string());
        event.approval_token_expires_at = Some(expires_at);
        event.approval_responded_at = None;
        Ok(true)
    }

    async fn list_pending(&self) -> anyhow::Result<Vec<ApprovalEvent>> {
        self.touch();
        let mut pending: Vec<ApprovalEvent> = self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.approval_status == Some(ApprovalStatus::PendingApproval))
            .cloned()
            .collect();
        pending.sort_by_key(|e| e.created_at);
        Ok(pending)
    }
}
