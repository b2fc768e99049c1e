//! Email delivery of the news digest.
//!
//! Messages go out over implicit-TLS SMTP (port 465 by default) using the
//! sender's own credentials. The [`Notifier`] never reports *why* a send
//! failed to its caller; the reason is logged and the caller gets `false`.

use crate::error::NotifyError;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use tracing::{error, info, instrument};

/// A plain-text message ready to hand to a [`MailTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Something that can deliver one [`OutgoingEmail`].
pub trait MailTransport {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), NotifyError>;
}

/// SMTP-over-TLS delivery through a fixed relay.
pub struct SmtpMailer {
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16, username: Option<String>, password: Option<String>) -> Self {
        Self {
            host: host.into(),
            port,
            username,
            password,
        }
    }
}

impl MailTransport for SmtpMailer {
    async fn deliver(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            return Err(NotifyError::MissingCredentials);
        };

        let from: Mailbox = email.from.parse()?;
        let to: Mailbox = email.to.parse()?;
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())?;

        let mailer: AsyncSmtpTransport<Tokio1Executor> = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(username.clone(), password.clone()))
            .build();

        mailer.send(message).await.map_err(|e| match e.status() {
            Some(code) if code.to_string() == "535" => NotifyError::Auth(e.to_string()),
            _ => NotifyError::Smtp(e),
        })?;
        Ok(())
    }
}

/// Sends the digest to a single recipient on behalf of the configured sender.
#[derive(Debug)]
pub struct Notifier<M> {
    transport: M,
    sender: Option<String>,
}

impl<M: MailTransport> Notifier<M> {
    pub fn new(transport: M, sender: Option<String>) -> Self {
        Self { transport, sender }
    }

    /// Send one plain-text message. Returns `true` only if delivery succeeded.
    ///
    /// The recipient is used verbatim; an address the SMTP layer rejects is
    /// just another failure.
    #[instrument(level = "info", skip(self, body), fields(body_bytes = body.len()))]
    pub async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        let Some(sender) = self.sender.as_deref().filter(|s| !s.is_empty()) else {
            error!("Email sender is not configured");
            return false;
        };
        let email = OutgoingEmail {
            from: sender.to_string(),
            to: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        match self.transport.deliver(&email).await {
            Ok(()) => {
                info!(to = %recipient, subject, "Email sent successfully");
                true
            }
            Err(e) => {
                error!(to = %recipient, error = %e, "Failed to send email");
                false
            }
        }
    }
}
