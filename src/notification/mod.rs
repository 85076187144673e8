//! Best-effort contract email notifications
//!
//! [`dispatch_detached`] spawns the send and returns immediately; the HTTP
//! request never observes whether the email went out.

mod smtp;
mod template;

pub use smtp::SmtpNotifier;
pub use template::{contract_email_html, contract_email_subject};

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};

#[cfg(test)]
use mockall::automock;

use crate::models::{Client, Contract};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("could not read attachment {path}: {reason}")]
    Attachment { path: String, reason: String },
    #[error("could not build message: {0}")]
    Build(String),
    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Sender disabled; the message was only logged
    Simulated,
}

/// Everything needed to tell a client their contract is signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractEmail {
    pub to_email: String,
    pub to_name: String,
    pub contract_number: String,
    pub plan_name: String,
    pub plan_value: String,
    pub pdf_path: PathBuf,
}

impl ContractEmail {
    pub fn new(client: &Client, contract: &Contract, pdf_path: PathBuf) -> Self {
        Self {
            to_email: client.email.clone(),
            to_name: client.full_name.clone(),
            contract_number: contract.number.clone(),
            plan_name: contract.plan_name.clone(),
            plan_value: contract.plan_value.clone(),
            pdf_path,
        }
    }

    pub fn first_name(&self) -> &str {
        self.to_name.split_whitespace().next().unwrap_or(&self.to_name)
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_contract_email(&self, email: &ContractEmail) -> Result<Delivery, NotificationError>;
}

/// Log the message a disabled or failing sender would have delivered
pub fn log_simulated_email(email: &ContractEmail) {
    info!(
        to = %email.to_email,
        subject = %contract_email_subject(&email.contract_number),
        contract_number = %email.contract_number,
        plan = %email.plan_name,
        value = %email.plan_value,
        "Simulated contract email (not delivered)"
    );
}

/// Fire-and-forget send. Errors are logged and dropped.
pub fn dispatch_detached(notifier: Arc<dyn Notifier>, email: ContractEmail) -> JoinHandle<()> {
    let span = tracing::info_span!("contract_email", contract_number = %email.contract_number);
    tokio::spawn(
        async move {
            match notifier.send_contract_email(&email).await {
                Ok(Delivery::Sent) => info!(to = %email.to_email, "Contract email sent"),
                Ok(Delivery::Simulated) => {
                    warn!(to = %email.to_email, "Email sender disabled, contract email only logged")
                }
                Err(e) => {
                    error!(to = %email.to_email, error = %e, "Contract email failed");
                    log_simulated_email(&email);
                }
            }
        }
        .instrument(span),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> ContractEmail {
        ContractEmail {
            to_email: "maria@example.com".to_string(),
            to_name: "Maria da Silva".to_string(),
            contract_number: "CTR-20250601-0007".to_string(),
            plan_name: "Plano Premium".to_string(),
            plan_value: "R$ 99,90/mês".to_string(),
            pdf_path: PathBuf::from("contracts/CTR-20250601-0007.pdf"),
        }
    }

    #[test]
    fn test_first_name() {
        assert_eq!(email().first_name(), "Maria");
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_contract_email()
            .times(1)
            .returning(|_| Err(NotificationError::Transport("connection refused".to_string())));

        let handle = dispatch_detached(Arc::new(notifier), email());
        // The task completes normally even though delivery failed.
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_delivers_the_given_email() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_contract_email()
            .withf(|e| e.contract_number == "CTR-20250601-0007" && e.to_email == "maria@example.com")
            .times(1)
            .returning(|_| Ok(Delivery::Sent));

        dispatch_detached(Arc::new(notifier), email()).await.unwrap();
    }
}
