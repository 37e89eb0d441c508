use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

use crate::models::approval::ApprovalStatus;
use crate::notification::NotificationError;
use crate::pages;

/// Why a click on an emailed approve/reject link did not produce a transition.
#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("invalid action: {0:?}")]
    InvalidAction(Option<String>),

    /// Never issued, or already consumed (the token is cleared on use).
    #[error("approval token not found")]
    TokenNotFound,

    #[error("approval token for event {event_id} expired at {expired_at}")]
    TokenExpired {
        event_id: i64,
        expired_at: DateTime<Utc>,
    },

    #[error("event already {0}")]
    AlreadyResponded(ApprovalStatus),

    #[error("failed to record decision: {0}")]
    Persistence(anyhow::Error),

    #[error("approval lookup failed: {0}")]
    Store(anyhow::Error),
}

impl ApprovalError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApprovalError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            ApprovalError::TokenNotFound => StatusCode::NOT_FOUND,
            ApprovalError::TokenExpired { .. } | ApprovalError::AlreadyResponded(_) => {
                StatusCode::OK
            }
            ApprovalError::Persistence(_) | ApprovalError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApprovalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let page = match &self {
            ApprovalError::InvalidAction(_) => pages::error_page("Invalid action specified"),
            ApprovalError::TokenNotFound => {
                pages::error_page("Invalid or expired verification link")
            }
            ApprovalError::TokenExpired { .. } => {
                pages::error_page("This verification link has expired")
            }
            ApprovalError::AlreadyResponded(previous) => pages::already_responded_page(*previous),
            ApprovalError::Persistence(e) => {
                tracing::error!("approval update failed: {:#}", e);
                pages::error_page("Failed to process your response")
            }
            ApprovalError::Store(e) => {
                tracing::error!("unexpected error in approval route: {:#}", e);
                pages::error_page("An unexpected error occurred")
            }
        };

        (status, Html(page)).into_response()
    }
}

/// Failures of the admin-facing issuance call.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("event {0} not found")]
    EventNotFound(i64),

    #[error("event {0} has no contact email")]
    MissingContact(i64),

    #[error("event already {0}")]
    AlreadyResponded(ApprovalStatus),

    #[error("approval email could not be sent: {0}")]
    Notification(#[from] NotificationError),

    #[error("approval link lifetime {0} puts the expiry out of range")]
    ExpiryOutOfRange(chrono::Duration),

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl IntoResponse for IssueError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            IssueError::EventNotFound(_) => (
                StatusCode::NOT_FOUND,
                "invalid_request_error",
                "event_not_found",
                self.to_string(),
            ),
            IssueError::MissingContact(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_request_error",
                "missing_contact_email",
                self.to_string(),
            ),
            IssueError::AlreadyResponded(_) => (
                StatusCode::CONFLICT,
                "conflict_error",
                "already_responded",
                self.to_string(),
            ),
            IssueError::Notification(e) => {
                tracing::error!("approval email failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "email_send_failed",
                    "approval email could not be sent".to_string(),
                )
            }
            IssueError::ExpiryOutOfRange(ttl) => {
                tracing::error!(%ttl, "approval link lifetime overflows the expiry timestamp");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "invalid_link_lifetime",
                    "internal server error".to_string(),
                )
            }
            IssueError::Store(e) => {
                tracing::error!("Database error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}
