use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{EmailTransport, NotificationError, OutgoingEmail};

/// Authenticated SMTP relay (Gmail with an app password in production).
#[derive(Clone)]
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    /// Domain used on the right-hand side of generated Message-IDs.
    id_domain: String,
}

impl SmtpTransport {
    pub fn new(host: &str, username: &str, password: &str) -> anyhow::Result<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        let id_domain = username
            .rsplit_once('@')
            .map(|(_, domain)| domain.to_string())
            .unwrap_or_else(|| "event-corner.local".to_string());

        Ok(Self { mailer, id_domain })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotificationError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, NotificationError> {
        let message_id = format!("<{}@{}>", uuid::Uuid::new_v4().simple(), self.id_domain);

        let builder = Message::builder()
            .from(parse_mailbox(&email.from)?)
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.clone())
            .message_id(Some(message_id.clone()));

        let message = match &email.text {
            Some(text) => builder.multipart(MultiPart::alternative_plain_html(
                text.clone(),
                email.html.clone(),
            )),
            None => builder
                .header(ContentType::TEXT_HTML)
                .body(email.html.clone()),
        }
        .map_err(|e| NotificationError::Build(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        Ok(message_id)
    }

    async fn verify_connection(&self) -> Result<(), NotificationError> {
        match self.mailer.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(NotificationError::Transport(
                "relay did not accept NOOP".to_string(),
            )),
            Err(e) => Err(NotificationError::Transport(e.to_string())),
        }
    }
}
