use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::mask_token;
use crate::errors::ApprovalError;
use crate::models::approval::{
    ApprovalAction, ApprovalEvent, ApprovalStatus, NewApprovalHistory, RequesterMeta,
};
use crate::notification::{Delivery, EmailNotifier};
use crate::store::ApprovalStore;

/// A committed transition plus how its best-effort side effects went.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The event as it looks after the transition.
    pub event: ApprovalEvent,
    pub action: ApprovalAction,
    pub status: ApprovalStatus,
    pub responded_at: DateTime<Utc>,
    pub history_recorded: bool,
    pub notification: Delivery,
}

/// Only the exact literals `approve` and `reject` are accepted.
pub fn parse_action(action: Option<&str>) -> Result<ApprovalAction, ApprovalError> {
    action
        .ok_or(ApprovalError::InvalidAction(None))?
        .parse::<ApprovalAction>()
        .map_err(|raw| ApprovalError::InvalidAction(Some(raw)))
}

pub struct ApprovalVerifier {
    store: Arc<dyn ApprovalStore>,
    notifier: EmailNotifier,
}

impl ApprovalVerifier {
    pub fn new(store: Arc<dyn ApprovalStore>, notifier: EmailNotifier) -> Self {
        Self { store, notifier }
    }

    /// Apply the contact's decision for `token`.
    ///
    /// Checks run in order and the first failure wins: action literal, token
    /// lookup, expiry, current status. The status update is a compare-and-set on
    /// `(id, token, pending_approval)`, so of two concurrent clicks only one
    /// commits. History and the creator email happen afterwards and cannot undo
    /// or fail the transition.
    pub async fn verify(
        &self,
        token: &str,
        action: Option<&str>,
        requester: &RequesterMeta,
    ) -> Result<ApprovalOutcome, ApprovalError> {
        let action = parse_action(action)?;

        let event = self
            .store
            .find_by_token(token)
            .await
            .map_err(ApprovalError::Store)?
            .ok_or_else(|| {
                tracing::warn!(token = %mask_token(token), "no event found for approval token");
                ApprovalError::TokenNotFound
            })?;

        let now = Utc::now();
        if event.token_expired_at(now) {
            let expired_at = event.approval_token_expires_at.unwrap_or(now);
            tracing::info!(event_id = event.id, %expired_at, "approval link used after expiry");
            return Err(ApprovalError::TokenExpired {
                event_id: event.id,
                expired_at,
            });
        }

        match event.approval_status {
            Some(ApprovalStatus::PendingApproval) => {}
            Some(previous) => return Err(ApprovalError::AlreadyResponded(previous)),
            // A token on a row that never entered the workflow is not one we issued.
            None => return Err(ApprovalError::TokenNotFound),
        }

        // Phase 1: commit. Must succeed or the request fails.
        let status = action.resulting_status();
        let won = self
            .store
            .commit_transition(event.id, token, status, now)
            .await
            .map_err(ApprovalError::Persistence)?;

        if !won {
            let current = self
                .store
                .approval_status(event.id)
                .await
                .map_err(ApprovalError::Store)?;
            tracing::info!(event_id = event.id, ?current, "approval lost a concurrent race");
            return Err(match current {
                Some(previous) if previous.is_terminal() => {
                    ApprovalError::AlreadyResponded(previous)
                }
                _ => ApprovalError::TokenNotFound,
            });
        }

        tracing::info!(
            event_id = event.id,
            action = action.as_str(),
            status = %status,
            "event approval decision recorded"
        );

        // Phase 2: best-effort side effects. Logged, never propagated.
        let history_recorded = self.record_history(&event, status, requester).await;
        let notification = match event.created_by.as_ref() {
            Some(creator) => {
                self.notifier
                    .send_outcome_notification(&creator.email, &event, status)
                    .await
            }
            None => Delivery::Skipped {
                reason: "event has no creator".to_string(),
            },
        };

        let mut event = event;
        event.approval_status = Some(status);
        event.approval_responded_at = Some(now);
        event.approval_token = None;

        Ok(ApprovalOutcome {
            event,
            action,
            status,
            responded_at: now,
            history_recorded,
            notification,
        })
    }

    async fn record_history(
        &self,
        event: &ApprovalEvent,
        status: ApprovalStatus,
        requester: &RequesterMeta,
    ) -> bool {
        let entry = NewApprovalHistory {
            event_id: event.id,
            contact_email: event.contact_email.clone(),
            action: status,
            ip_address: requester.ip_address.clone(),
            user_agent: requester.user_agent.clone(),
        };

        match self.store.append_history(&entry).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(event_id = event.id, "failed to record approval history: {:#}", e);
                false
            }
        }
    }
}
