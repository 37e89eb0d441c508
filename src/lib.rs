//! Event Corner approval service.
//!
//! Events submitted to Event Corner carry a contact email. The service mails
//! that contact a pair of single-use approve/reject links, applies whichever
//! link is clicked first, and tells the event's creator the outcome.

use std::sync::Arc;

pub mod api;
pub mod approval;
pub mod banner;
pub mod cli;
pub mod config;
pub mod errors;
pub mod html;
pub mod middleware;
pub mod models;
pub mod notification;
pub mod pages;
pub mod store;

use approval::{ApprovalIssuer, ApprovalVerifier};
use notification::EmailNotifier;
use store::ApprovalStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub store: Arc<dyn ApprovalStore>,
    pub verifier: ApprovalVerifier,
    pub issuer: ApprovalIssuer,
    pub notifier: EmailNotifier,
    pub admin_key: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ApprovalStore>,
        notifier: EmailNotifier,
        public_base_url: &str,
        approval_ttl: chrono::Duration,
        admin_key: Option<String>,
    ) -> Self {
        let notifier = notifier.with_link_ttl_days(approval_ttl.num_days());
        Self {
            verifier: ApprovalVerifier::new(store.clone(), notifier.clone()),
            issuer: ApprovalIssuer::new(
                store.clone(),
                notifier.clone(),
                public_base_url,
                approval_ttl,
            ),
            store,
            notifier,
            admin_key,
        }
    }
}
