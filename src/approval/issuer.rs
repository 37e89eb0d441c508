use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;

use super::mask_token;
use crate::errors::IssueError;
use crate::notification::EmailNotifier;
use crate::store::ApprovalStore;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize)]
pub struct IssuedApproval {
    pub event_id: i64,
    pub contact_email: String,
    pub expires_at: DateTime<Utc>,
    pub message_id: String,
}

/// Starts the approval workflow for an event: token, expiry, request email.
pub struct ApprovalIssuer {
    store: Arc<dyn ApprovalStore>,
    notifier: EmailNotifier,
    public_base_url: String,
    ttl: Duration,
}

impl ApprovalIssuer {
    pub fn new(
        store: Arc<dyn ApprovalStore>,
        notifier: EmailNotifier,
        public_base_url: &str,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            ttl,
        }
    }

    /// Mint a token for `event_id` and email the contact.
    ///
    /// Each call replaces any previous token, so a failed send can simply be
    /// retried; links from earlier emails stop working.
    pub async fn issue(&self, event_id: i64) -> Result<IssuedApproval, IssueError> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(IssueError::EventNotFound(event_id))?;

        let contact_email = event
            .contact_email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or(IssueError::MissingContact(event_id))?;

        if let Some(status) = event.approval_status.filter(|s| s.is_terminal()) {
            return Err(IssueError::AlreadyResponded(status));
        }

        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or(IssueError::ExpiryOutOfRange(self.ttl))?;
        let token = mint_token();

        if !self.store.store_token(event_id, &token, expires_at).await? {
            // Someone answered between our read and write.
            let status = self
                .store
                .approval_status(event_id)
                .await?
                .ok_or(IssueError::EventNotFound(event_id))?;
            return Err(IssueError::AlreadyResponded(status));
        }

        tracing::info!(
            event_id,
            token = %mask_token(&token),
            %expires_at,
            "approval token issued"
        );

        let (approval_url, rejection_url) = verification_urls(&self.public_base_url, &token);
        let message_id = self
            .notifier
            .send_approval_request(&contact_email, &event, &approval_url, &rejection_url)
            .await?;

        Ok(IssuedApproval {
            event_id,
            contact_email,
            expires_at,
            message_id,
        })
    }
}

/// 32 random bytes from the OS-seeded CSPRNG, hex encoded.
pub fn mint_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Approve and reject links for `token`.
pub fn verification_urls(base_url: &str, token: &str) -> (String, String) {
    let base = format!(
        "{}/api/approval/verify/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(token)
    );
    (
        format!("{}?action=approve", base),
        format!("{}?action=reject", base),
    )
}
