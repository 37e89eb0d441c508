use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        ConnectInfo, Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::approval::{parse_action, IssuedApproval};
use crate::errors::{ApprovalError, IssueError};
use crate::models::approval::{ApprovalEvent, RequesterMeta};
use crate::pages;
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyParams {
    pub action: Option<String>,
}

#[derive(Deserialize)]
pub struct RequestApprovalBody {
    pub event_id: i64,
}

/// Pending event as shown to admins. The token itself is never returned.
#[derive(Serialize)]
pub struct PendingApproval {
    pub event_id: i64,
    pub title: String,
    pub category: String,
    pub contact_email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ApprovalEvent> for PendingApproval {
    fn from(e: ApprovalEvent) -> Self {
        Self {
            event_id: e.id,
            title: e.title,
            category: e.category,
            contact_email: e.contact_email,
            expires_at: e.approval_token_expires_at,
            created_at: e.created_at,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /api/approval/verify/:token?action=approve|reject — the emailed link.
pub async fn verify_approval(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<VerifyParams>, QueryRejection>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Html<String>, ApprovalError> {
    // An unreadable query (a repeated `action`, say) names no valid action.
    let Query(params) = query.map_err(|rejection| {
        tracing::debug!(%rejection, "unreadable approval query");
        ApprovalError::InvalidAction(None)
    })?;

    // An undecodable token can never match. The action is still checked first.
    let Path(token) = match path {
        Ok(path) => path,
        Err(rejection) => {
            parse_action(params.action.as_deref())?;
            tracing::debug!(%rejection, "undecodable approval token");
            return Err(ApprovalError::TokenNotFound);
        }
    };

    let requester = requester_meta(connect_info.map(|ConnectInfo(addr)| addr), &headers);

    let outcome = state
        .verifier
        .verify(&token, params.action.as_deref(), &requester)
        .await?;

    tracing::debug!(
        event_id = outcome.event.id,
        history_recorded = outcome.history_recorded,
        notification = ?outcome.notification,
        "approval verification complete"
    );

    Ok(Html(pages::success_page(outcome.action, &outcome.event)))
}

/// POST /api/approval/request — mint a token and email the contact.
pub async fn request_approval(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RequestApprovalBody>,
) -> Result<Json<IssuedApproval>, IssueError> {
    let issued = state.issuer.issue(body.event_id).await?;
    Ok(Json(issued))
}

/// GET /api/approval/pending — events still waiting on their contact.
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PendingApproval>>, StatusCode> {
    let events = state.store.list_pending().await.map_err(|e| {
        tracing::error!("list_pending failed: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(events.into_iter().map(PendingApproval::from).collect()))
}

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "Backend is running!" }))
}

/// GET /api/test-db — one-row probe against the store.
pub async fn test_db(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Database connection successful" })),
        ),
        Err(e) => {
            tracing::error!("database probe failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// Peer address first, then the first `X-Forwarded-For` hop, then `"unknown"`.
pub fn requester_meta(peer: Option<SocketAddr>, headers: &HeaderMap) -> RequesterMeta {
    let ip_address = peer
        .map(|addr| addr.ip().to_string())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
        })
        .unwrap_or_else(|| "unknown".to_string());

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| "unknown".to_string());

    RequesterMeta {
        ip_address,
        user_agent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_requester_meta_prefers_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mail/1.0"));

        let meta = requester_meta(Some("10.0.0.5:4431".parse().unwrap()), &headers);
        assert_eq!(meta.ip_address, "10.0.0.5");
        assert_eq!(meta.user_agent, "Mail/1.0");
    }

    #[test]
    fn test_requester_meta_falls_back_to_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        let meta = requester_meta(None, &headers);
        assert_eq!(meta.ip_address, "203.0.113.9");
        assert_eq!(meta.user_agent, "unknown");
    }

    #[test]
    fn test_requester_meta_unknown() {
        assert_eq!(requester_meta(None, &HeaderMap::new()), RequesterMeta::default());
    }
}
