use async_trait::async_trait;
use thiserror::Error;

pub mod email;
pub mod recording;
pub mod smtp;
pub mod templates;

pub use email::{Delivery, EmailNotifier};

/// A fully rendered message handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    /// Plain-text alternative. `None` sends HTML only.
    pub text: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotificationError {
    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("mail transport error: {0}")]
    Transport(String),
}

/// Outbound mail. Implementations return the message identifier on success.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, NotificationError>;

    /// Handshake with the relay without sending anything.
    async fn verify_connection(&self) -> Result<(), NotificationError>;
}
