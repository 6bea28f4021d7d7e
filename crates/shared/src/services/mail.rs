use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use super::{MailSender, OutgoingMail, ServiceError, ServiceFuture};

const SERVICE: &str = "mail";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Sends plain-text mail over implicit TLS, authenticating as the sender
/// with an app password.
#[derive(Debug, Clone)]
pub struct SmtpMailSender {
    host: String,
    port: u16,
}

impl Default for SmtpMailSender {
    fn default() -> Self {
        Self::new(DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT)
    }
}

impl SmtpMailSender {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    async fn deliver(&self, mail: &OutgoingMail) -> Result<String, ServiceError> {
        let message = build_message(mail)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|err| ServiceError::Unavailable(format!("smtp transport: {err}")))?
            .port(self.port)
            .credentials(Credentials::new(
                mail.sender.clone(),
                mail.credential.clone(),
            ))
            .build();

        transport.send(message).await.map_err(|err| {
            warn!(service = SERVICE, host = %self.host, error = %err, "smtp send failed");
            ServiceError::Unavailable(err.to_string())
        })?;
        info!(service = SERVICE, recipient = %mail.recipient, "email sent");

        Ok(format!("Email sent to {}", mail.recipient))
    }
}

impl MailSender for SmtpMailSender {
    fn send<'a>(
        &'a self,
        mail: &'a OutgoingMail,
    ) -> ServiceFuture<'a, Result<String, ServiceError>> {
        Box::pin(self.deliver(mail))
    }
}

pub fn build_message(mail: &OutgoingMail) -> Result<Message, ServiceError> {
    let from = parse_mailbox("sender", &mail.sender)?;
    let to = parse_mailbox("recipient", &mail.recipient)?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())
        .map_err(|err| ServiceError::InvalidPayload(format!("email message: {err}")))
}

fn parse_mailbox(role: &str, address: &str) -> Result<Mailbox, ServiceError> {
    address
        .parse::<Mailbox>()
        .map_err(|err| ServiceError::InvalidPayload(format!("{role} address '{address}': {err}")))
}
