//! Shared fixtures: in-memory store, recording mail transport and a router
//! wired to both.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use tower::util::ServiceExt;
use uuid::Uuid;

use event_corner::approval::ApprovalVerifier;
use event_corner::models::approval::{ApprovalEvent, ApprovalStatus, Creator};
use event_corner::notification::recording::RecordingTransport;
use event_corner::notification::EmailNotifier;
use event_corner::store::memory::MemoryStore;
use event_corner::{api, AppState};

pub const ADMIN_KEY: &str = "test-admin-key-0123456789";
pub const BASE_URL: &str = "https://eventcorner.test";

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub transport: Arc<RecordingTransport>,
    pub app: axum::Router,
}

/// Event 42 of the worked example: pending, token `tok_123`, expiring tomorrow.
pub fn pending_event(id: i64, token: &str) -> ApprovalEvent {
    ApprovalEvent {
        id,
        title: "Spring Hackathon".to_string(),
        description: Some("24 hours of building things with friends.".to_string()),
        category: "competition".to_string(),
        venue_name: Some("Main Auditorium".to_string()),
        venue_type: Some("offline".to_string()),
        contact_email: Some("dean@university.test".to_string()),
        approval_status: Some(ApprovalStatus::PendingApproval),
        approval_token: Some(token.to_string()),
        approval_token_expires_at: Some(Utc::now() + Duration::days(1)),
        approval_responded_at: None,
        created_by: Some(Creator {
            id: Uuid::new_v4(),
            email: "organizer@university.test".to_string(),
            full_name: Some("Riley Organizer".to_string()),
        }),
        created_at: Utc::now() - Duration::hours(2),
    }
}

/// An event that never entered the workflow.
pub fn draft_event(id: i64) -> ApprovalEvent {
    ApprovalEvent {
        approval_status: None,
        approval_token: None,
        approval_token_expires_at: None,
        ..pending_event(id, "unused")
    }
}

pub fn notifier(transport: Arc<RecordingTransport>) -> EmailNotifier {
    EmailNotifier::new(transport, "Event Corner", "noreply@eventcorner.test")
}

pub fn verifier(store: Arc<MemoryStore>, transport: Arc<RecordingTransport>) -> ApprovalVerifier {
    ApprovalVerifier::new(store, notifier(transport))
}

pub fn build_context(store: MemoryStore) -> TestContext {
    build_context_with(store, RecordingTransport::new(), Some(ADMIN_KEY))
}

pub fn build_context_with(
    store: MemoryStore,
    transport: RecordingTransport,
    admin_key: Option<&str>,
) -> TestContext {
    let store = Arc::new(store);
    let transport = Arc::new(transport);
    let state = Arc::new(AppState::new(
        store.clone(),
        notifier(transport.clone()),
        BASE_URL,
        Duration::days(7),
        admin_key.map(String::from),
    ));

    TestContext {
        store,
        transport,
        app: api::app(state),
    }
}

pub async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub async fn get(app: &axum::Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .uri(uri)
        .header("user-agent", "MailClient/2.0")
        .body(Body::empty())
        .expect("build request");
    send(app, request).await
}
