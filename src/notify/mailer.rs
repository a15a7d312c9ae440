//! Notification delivery

use crate::config::EmailSettings;
use crate::notify::{Notification, NotifyError, NotifyResult};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Port on which SMTP is spoken over implicit TLS rather than STARTTLS
const IMPLICIT_TLS_PORT: u16 = 465;

/// Something that can deliver a composed notification
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> NotifyResult<()>;
}

/// Delivers notifications through an authenticated SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Builds a mailer from resolved settings
    ///
    /// Addresses are parsed up front so a bad `EMAIL_FROM`/`EMAIL_TO` fails
    /// before any crawling happens.
    pub fn new(settings: &EmailSettings) -> Result<Self, NotifyError> {
        let from: Mailbox = settings.from.parse()?;
        let to: Mailbox = settings.to.parse()?;

        let builder = if settings.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
        };

        let transport = builder
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    fn message(&self, notification: &Notification) -> NotifyResult<Message> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                notification.text_body.clone(),
                notification.html_body.clone(),
            ))?;

        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, notification: &Notification) -> NotifyResult<()> {
        let message = self.message(notification)?;

        tracing::debug!(
            "Sending '{}' to {} via SMTP",
            notification.subject,
            self.to
        );
        self.transport.send(message).await?;
        tracing::info!("Sent '{}' to {}", notification.subject, self.to);

        Ok(())
    }
}
