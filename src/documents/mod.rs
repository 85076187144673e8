//! Contract documents: one PDF per contract, keyed by contract number

mod render;

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::DocumentsConfig;
use crate::models::{Client, Contract};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid document name: {0}")]
    InvalidName(String),
    #[error("document {0} not found")]
    NotFound(String),
    #[error("PDF rendering failed: {0}")]
    Render(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rendering task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Writes and reads contract PDFs under a single directory
#[derive(Debug, Clone)]
pub struct ContractDocuments {
    dir: PathBuf,
    public_prefix: String,
}

impl ContractDocuments {
    pub fn new(config: &DocumentsConfig) -> Self {
        Self {
            dir: config.contracts_dir.clone(),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_dir(&self) -> Result<(), DocumentError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    pub fn path_for(&self, contract_number: &str) -> Result<PathBuf, DocumentError> {
        validate_name(contract_number)?;
        Ok(self.dir.join(format!("{contract_number}.pdf")))
    }

    /// Public URL the document is served under, e.g. `/contracts/CTR-20250601-0007.pdf`
    pub fn url_for(&self, contract_number: &str) -> String {
        format!("{}/{}.pdf", self.public_prefix, contract_number)
    }

    /// Render the contract PDF dated `issued_on` and return where it was written
    pub async fn render_on(
        &self,
        client: &Client,
        contract: &Contract,
        issued_on: NaiveDate,
    ) -> Result<PathBuf, DocumentError> {
        let path = self.path_for(&contract.number)?;
        let (client, contract) = (client.clone(), contract.clone());

        let bytes = tokio::task::spawn_blocking(move || {
            render::contract_pdf(&client, &contract, issued_on)
        })
        .await??;

        self.ensure_dir().await?;
        tokio::fs::write(&path, &bytes).await?;
        info!(path = %path.display(), size = bytes.len(), "Contract PDF written");
        Ok(path)
    }

    pub async fn read(&self, contract_number: &str) -> Result<Vec<u8>, DocumentError> {
        let path = self.path_for(contract_number)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound(contract_number.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Contract numbers are `[A-Za-z0-9-]+`; anything else could escape the directory.
fn validate_name(name: &str) -> Result<(), DocumentError> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        Ok(())
    } else {
        Err(DocumentError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpf::Cpf;
    use crate::models::{Address, ContractStatus, Vehicle};
    use chrono::Utc;

    fn documents(dir: &Path) -> ContractDocuments {
        ContractDocuments::new(&DocumentsConfig {
            contracts_dir: dir.to_path_buf(),
            public_prefix: "/contracts/".to_string(),
        })
    }

    fn client(with_vehicle: bool) -> Client {
        Client {
            id: 7,
            full_name: "Maria da Silva".to_string(),
            cpf: Cpf::parse("52998224725").unwrap(),
            email: "maria@example.com".to_string(),
            phone: "(11) 98765-4321".to_string(),
            address: Address {
                postal_code: "01310-100".to_string(),
                street: "Avenida Paulista".to_string(),
                number: "1000".to_string(),
                complement: Some("Apto 12".to_string()),
                district: "Bela Vista".to_string(),
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
            },
            vehicle: if with_vehicle {
                Vehicle {
                    plate: Some("ABC1D23".to_string()),
                    model: Some("Onix".to_string()),
                    make: None,
                    year: Some("2022".to_string()),
                }
            } else {
                Vehicle::default()
            },
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn contract() -> Contract {
        Contract {
            id: 1,
            client_id: 7,
            number: "CTR-20250601-0007".to_string(),
            status: ContractStatus::Pending,
            document_url: None,
            plan_name: "Plano Premium".to_string(),
            plan_value: "R$ 99,90/mês".to_string(),
            terms_accepted: true,
            accepted_at: None,
            created_at: Utc::now(),
            signed_at: None,
            signature_id: None,
        }
    }

    #[test]
    fn test_paths_and_urls_are_keyed_by_number() {
        let docs = documents(Path::new("/tmp/contracts"));
        assert_eq!(
            docs.path_for("CTR-20250601-0007").unwrap(),
            PathBuf::from("/tmp/contracts/CTR-20250601-0007.pdf")
        );
        assert_eq!(docs.url_for("CTR-20250601-0007"), "/contracts/CTR-20250601-0007.pdf");
    }

    #[test]
    fn test_rejects_names_that_escape_the_directory() {
        let docs = documents(Path::new("/tmp/contracts"));
        for bad in ["../etc/passwd", "a/b", "", "x.pdf"] {
            assert!(matches!(docs.path_for(bad), Err(DocumentError::InvalidName(_))), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_render_writes_a_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = documents(&tmp.path().join("nested"));
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        for with_vehicle in [false, true] {
            let path = docs.render_on(&client(with_vehicle), &contract(), day).await.unwrap();
            let bytes = docs.read("CTR-20250601-0007").await.unwrap();
            assert!(path.exists());
            assert!(bytes.starts_with(b"%PDF"));
        }
    }

    #[tokio::test]
    async fn test_render_accepts_oversized_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = documents(tmp.path());
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let mut long = client(true);
        long.full_name = "Maria ".repeat(34).trim_end().to_string();
        long.address.street = "R".repeat(200);
        long.address.complement = Some(String::new());
        long.vehicle.model = Some("Modelo ".repeat(30));

        docs.render_on(&long, &contract(), day).await.unwrap();
        let bytes = docs.read("CTR-20250601-0007").await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_reading_missing_document_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = documents(tmp.path());
        assert!(matches!(
            docs.read("CTR-20990101-0001").await,
            Err(DocumentError::NotFound(_))
        ));
    }
}
