use std::sync::Arc;

use super::templates;
use super::{EmailTransport, NotificationError, OutgoingEmail};
use crate::models::approval::{ApprovalEvent, ApprovalStatus};

/// Result of a best-effort send. Callers log it; it never becomes an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Sent { message_id: String },
    /// Nothing to send to (e.g. the creator has no email on file).
    Skipped { reason: String },
    Failed { error: NotificationError },
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent { .. })
    }
}

/// Renders and dispatches the two workflow emails.
#[derive(Clone)]
pub struct EmailNotifier {
    transport: Arc<dyn EmailTransport>,
    from: String,
    link_ttl_days: i64,
}

impl EmailNotifier {
    pub fn new(transport: Arc<dyn EmailTransport>, from_name: &str, from_address: &str) -> Self {
        Self {
            transport,
            from: format!("\"{}\" <{}>", from_name, from_address),
            link_ttl_days: 7,
        }
    }

    /// Lifetime quoted in the approval-request copy. Should match the issuer's TTL.
    pub fn with_link_ttl_days(mut self, days: i64) -> Self {
        self.link_ttl_days = days;
        self
    }

    /// Ask the contact to approve or reject. Errors are returned; the caller decides
    /// whether to retry (re-issuing the request is safe).
    pub async fn send_approval_request(
        &self,
        contact_email: &str,
        event: &ApprovalEvent,
        approval_url: &str,
        rejection_url: &str,
    ) -> Result<String, NotificationError> {
        let email = OutgoingEmail {
            from: self.from.clone(),
            to: contact_email.to_string(),
            subject: templates::approval_request_subject(event),
            html: templates::approval_request_html(
                event,
                approval_url,
                rejection_url,
                self.link_ttl_days,
            ),
            text: Some(templates::approval_request_text(
                event,
                approval_url,
                rejection_url,
                self.link_ttl_days,
            )),
        };

        match self.transport.send(&email).await {
            Ok(message_id) => {
                tracing::info!(
                    event_id = event.id,
                    to = %contact_email,
                    message_id = %message_id,
                    "approval request email sent"
                );
                Ok(message_id)
            }
            Err(e) => {
                tracing::error!(event_id = event.id, to = %contact_email, "failed to send approval request: {}", e);
                Err(e)
            }
        }
    }

    /// Tell the creator what the contact decided. Never fails.
    pub async fn send_outcome_notification(
        &self,
        creator_email: &str,
        event: &ApprovalEvent,
        status: ApprovalStatus,
    ) -> Delivery {
        if creator_email.trim().is_empty() {
            return Delivery::Skipped {
                reason: "creator has no email address".to_string(),
            };
        }

        let email = OutgoingEmail {
            from: self.from.clone(),
            to: creator_email.to_string(),
            subject: templates::outcome_subject(event, status),
            html: templates::outcome_html(event, status),
            text: None,
        };

        match self.transport.send(&email).await {
            Ok(message_id) => {
                tracing::info!(
                    event_id = event.id,
                    status = %status,
                    "creator notification sent"
                );
                Delivery::Sent { message_id }
            }
            Err(error) => {
                tracing::warn!(
                    event_id = event.id,
                    status = %status,
                    "failed to send creator notification: {}",
                    error
                );
                Delivery::Failed { error }
            }
        }
    }

    /// Probe the relay. Logs the outcome and reports whether mail can be sent.
    pub async fn verify_connection(&self) -> bool {
        match self.transport.verify_connection().await {
            Ok(()) => {
                tracing::info!("email service is ready to send emails");
                true
            }
            Err(e) => {
                tracing::warn!(
                    "email service connection failed: {} (check GMAIL_USER and GMAIL_APP_PASSWORD)",
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::recording::RecordingTransport;
    use chrono::Utc;

    fn event() -> ApprovalEvent {
        ApprovalEvent {
            id: 3,
            title: "Data Science Meetup".into(),
            description: None,
            category: "social".into(),
            venue_name: Some("Room 402".into()),
            venue_type: Some("offline".into()),
            contact_email: Some("dean@uni.edu".into()),
            approval_status: None,
            approval_token: None,
            approval_token_expires_at: None,
            approval_responded_at: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_approval_request_is_dual_format() {
        let transport = Arc::new(RecordingTransport::new());
        let notifier = EmailNotifier::new(transport.clone(), "Event Corner", "noreply@ec.test");

        let id = notifier
            .send_approval_request("dean@uni.edu", &event(), "https://a", "https://r")
            .await
            .unwrap();
        assert!(!id.is_empty());

        let sent = transport.sent_to("dean@uni.edu");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "\"Event Corner\" <noreply@ec.test>");
        assert_eq!(sent[0].subject, "Event Approval Request - Data Science Meetup");
        assert!(sent[0].text.is_some());
        assert!(sent[0].html.contains("https://a"));
    }

    #[tokio::test]
    async fn test_approval_request_failure_is_returned() {
        let notifier = EmailNotifier::new(
            Arc::new(RecordingTransport::failing()),
            "Event Corner",
            "noreply@ec.test",
        );
        let result = notifier
            .send_approval_request("dean@uni.edu", &event(), "https://a", "https://r")
            .await;
        assert!(matches!(result, Err(NotificationError::Transport(_))));
    }

    #[tokio::test]
    async fn test_outcome_failure_is_contained() {
        let notifier = EmailNotifier::new(
            Arc::new(RecordingTransport::failing()),
            "Event Corner",
            "noreply@ec.test",
        );
        let delivery = notifier
            .send_outcome_notification("creator@uni.edu", &event(), ApprovalStatus::Approved)
            .await;
        assert!(matches!(delivery, Delivery::Failed { .. }));
    }

    #[tokio::test]
    async fn test_outcome_without_address_is_skipped() {
        let transport = Arc::new(RecordingTransport::new());
        let notifier = EmailNotifier::new(transport.clone(), "Event Corner", "noreply@ec.test");
        let delivery = notifier
            .send_outcome_notification("  ", &event(), ApprovalStatus::Rejected)
            .await;
        assert!(matches!(delivery, Delivery::Skipped { .. }));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_outcome_is_html_only() {
        let transport = Arc::new(RecordingTransport::new());
        let notifier = EmailNotifier::new(transport.clone(), "Event Corner", "noreply@ec.test");
        let delivery = notifier
            .send_outcome_notification("creator@uni.edu", &event(), ApprovalStatus::Rejected)
            .await;
        assert!(delivery.is_sent());

        let sent = transport.sent();
        assert_eq!(sent[0].subject, "Event Rejected: Data Science Meetup");
        assert!(sent[0].text.is_none());
    }
}
