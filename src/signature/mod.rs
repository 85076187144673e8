//! Electronic signature providers
//!
//! Contract generation only depends on the [`SignatureProvider`] trait, so a
//! real provider can replace [`SimulatedSignatureProvider`] as long as it
//! keeps the `(status, contract_url, signature_id)` result contract.

mod simulated;

pub use simulated::SimulatedSignatureProvider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::models::{Client, Contract};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature provider unavailable: {0}")]
    Unavailable(String),
    #[error("unknown signature id: {0}")]
    UnknownSignature(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureState {
    Signed,
    Pending,
    Failed,
}

/// Result of `sign_document`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureOutcome {
    pub status: SignatureState,
    pub contract_url: String,
    pub signature_id: String,
    pub message: String,
    pub signed_at: DateTime<Utc>,
}

/// Result of `check_signature_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureStatusReport {
    pub signature_id: String,
    pub status: String,
    pub signed: bool,
    pub message: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    async fn sign_document(
        &self,
        client: &Client,
        contract: &Contract,
        document_path: &Path,
    ) -> Result<SignatureOutcome, SignatureError>;

    async fn check_signature_status(&self, signature_id: &str) -> Result<SignatureStatusReport, SignatureError>;
}
