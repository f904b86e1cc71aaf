//! Outgoing email.
//!
//! Notifications are best-effort: callers log a failed send and carry on.
//! Without an SMTP host the mailer is a no-op that only logs.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use stocky_core::Money;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl Mailer {
    /// Builds the transport. No connection is opened until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let Some(host) = config.host.as_deref().filter(|h| !h.trim().is_empty()) else {
            return Ok(Mailer::disabled());
        };

        let mut builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Mailer {
            transport: Some(builder.build()),
            from_address: config.from.clone(),
        })
    }

    pub fn disabled() -> Self {
        Mailer {
            transport: None,
            from_address: SmtpConfig::default().from,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Tells a shop owner their order went through.
    pub async fn send_order_placed(
        &self,
        to: &str,
        order_id: &str,
        total: Money,
    ) -> Result<(), MailError> {
        let body = format!(
            "Your order has been placed.\n\nOrder: {order_id}\nTotal: {total}\n\n\
             The supplier will review it shortly."
        );
        self.send(to, "Your order has been placed", &body).await
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let Some(transport) = &self.transport else {
            tracing::warn!(to = %to, subject = %subject, "SMTP not configured; skipping email");
            return Ok(());
        };

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        transport.send(email).await?;
        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}
