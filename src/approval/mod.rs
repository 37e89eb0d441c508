//! Email-link approval of events created on behalf of a third-party contact.
//!
//! 1. [`ApprovalIssuer::issue`] mints a single-use token, stores it with an
//!    expiry and emails approve/reject links to the contact.
//! 2. The contact clicks a link; [`ApprovalVerifier::verify`] checks the token
//!    and commits the transition (`pending_approval` → `approved`/`rejected`).
//! 3. History and the creator's notification follow as best-effort side effects.

pub mod issuer;
pub mod verifier;

pub use issuer::{ApprovalIssuer, IssuedApproval};
pub use verifier::{parse_action, ApprovalOutcome, ApprovalVerifier};

/// Log-safe prefix of a token.
pub(crate) fn mask_token(token: &str) -> String {
    match token.char_indices().nth(6) {
        Some((idx, _)) => format!("{}…", &token[..idx]),
        None => "****".to_string(),
    }
}
