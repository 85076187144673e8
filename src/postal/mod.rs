//! CEP (postal code) lookup
//!
//! Codes are normalized and validated locally before any upstream call.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PostalConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostalError {
    #[error("malformed postal code: {0}")]
    InvalidFormat(String),
    #[error("postal code {0} not found")]
    NotFound(String),
    #[error("postal lookup unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostalAddress {
    #[serde(rename = "cep")]
    pub postal_code: String,
    #[serde(rename = "logradouro")]
    pub street: String,
    #[serde(rename = "complemento")]
    pub complement: String,
    #[serde(rename = "bairro")]
    pub district: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
}

/// Remove `-` and `.` separators; what is left must be exactly 8 digits.
pub fn normalize_postal_code(raw: &str) -> Result<String, PostalError> {
    let cleaned: String = raw.chars().filter(|c| *c != '-' && *c != '.').collect();
    if cleaned.len() == 8 && cleaned.chars().all(|c| c.is_ascii_digit()) {
        Ok(cleaned)
    } else {
        Err(PostalError::InvalidFormat(raw.to_string()))
    }
}

#[async_trait]
pub trait PostalLookup: Send + Sync {
    async fn lookup(&self, raw_code: &str) -> Result<PostalAddress, PostalError>;
}

/// ViaCEP-compatible upstream: `GET {base}/ws/{code}/json/`
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    http: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(config: &PostalConfig) -> Result<Self, PostalError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PostalError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PostalLookup for ViaCepClient {
    async fn lookup(&self, raw_code: &str) -> Result<PostalAddress, PostalError> {
        let code = normalize_postal_code(raw_code)?;
        let url = format!("{}/ws/{}/json/", self.base_url, code);
        debug!(%url, "Querying postal code upstream");

        let unavailable = |e: reqwest::Error| {
            warn!(postal_code = %code, error = %e, "Postal code upstream failed");
            PostalError::Unavailable(e.to_string())
        };

        let body: Value = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        // Upstream flags unknown codes with `"erro": true` (older versions send the string "true").
        let missing = match body.get("erro") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag == "true",
            _ => false,
        };
        if missing {
            return Err(PostalError::NotFound(code));
        }

        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(PostalAddress {
            postal_code: field("cep"),
            street: field("logradouro"),
            complement: field("complemento"),
            district: field("bairro"),
            city: field("localidade"),
            state: field("uf"),
        })
    }
}
