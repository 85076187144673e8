use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use super::{
    contract_email_html, contract_email_subject, log_simulated_email, ContractEmail, Delivery,
    NotificationError, Notifier,
};
use crate::config::SmtpConfig;

/// SMTP sender (STARTTLS). Disabled when credentials are missing.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    config: SmtpConfig,
    enabled: bool,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        let enabled = config.credentials().is_some() && config.sender_address().is_some();
        if enabled {
            info!(
                host = %config.host,
                from = config.sender_address().unwrap_or_default(),
                "SMTP notifier configured"
            );
        } else {
            warn!("SMTP credentials not configured, contract emails will only be logged");
        }
        Self { config, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, NotificationError> {
        let parsed = address.parse().map_err(|e: lettre::address::AddressError| {
            NotificationError::InvalidAddress {
                address: address.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Mailbox::new(name.map(str::to_string), parsed))
    }

    async fn build_message(&self, email: &ContractEmail) -> Result<Message, NotificationError> {
        let from_address = self.config.sender_address().unwrap_or_default();
        let from = Self::mailbox(Some(&self.config.from_name), from_address)?;
        let to = Self::mailbox(Some(&email.to_name), &email.to_email)?;

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(contract_email_html(email)));

        if tokio::fs::try_exists(&email.pdf_path).await.unwrap_or(false) {
            let bytes = tokio::fs::read(&email.pdf_path)
                .await
                .map_err(|e| NotificationError::Attachment {
                    path: email.pdf_path.display().to_string(),
                    reason: e.to_string(),
                })?;
            let pdf = ContentType::parse("application/pdf")
                .map_err(|e| NotificationError::Build(e.to_string()))?;
            body = body.singlepart(
                Attachment::new(format!("{}.pdf", email.contract_number)).body(bytes, pdf),
            );
        } else {
            warn!(path = %email.pdf_path.display(), "Contract PDF missing, sending without attachment");
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(contract_email_subject(&email.contract_number))
            .multipart(body)
            .map_err(|e| NotificationError::Build(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_contract_email(&self, email: &ContractEmail) -> Result<Delivery, NotificationError> {
        let Some((user, password)) = self.config.credentials().filter(|_| self.enabled) else {
            log_simulated_email(email);
            return Ok(Delivery::Simulated);
        };

        let message = self.build_message(email).await?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
            .map_err(|e| NotificationError::Transport(e.to_string()))?
            .port(self.config.port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        Ok(Delivery::Sent)
    }
}
