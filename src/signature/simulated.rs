use async_trait::async_trait;
use chrono::{Local, Utc};
use std::path::Path;
use tracing::info;

use super::{SignatureError, SignatureOutcome, SignatureProvider, SignatureState, SignatureStatusReport};
use crate::documents::ContractDocuments;
use crate::models::{Client, Contract};

/// Marks every document signed without contacting anyone.
///
/// Signature ids are `SIM-<local timestamp>`, so two signatures within the
/// same second share an id.
#[derive(Debug, Clone)]
pub struct SimulatedSignatureProvider {
    documents: ContractDocuments,
}

impl SimulatedSignatureProvider {
    /// Contract URLs point at where `documents` serves the PDFs
    pub fn new(documents: ContractDocuments) -> Self {
        info!("Simulated signature provider initialized");
        Self { documents }
    }
}

#[async_trait]
impl SignatureProvider for SimulatedSignatureProvider {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn sign_document(
        &self,
        client: &Client,
        contract: &Contract,
        document_path: &Path,
    ) -> Result<SignatureOutcome, SignatureError> {
        let contract_url = self.documents.url_for(&contract.number);
        let signature_id = format!("SIM-{}", Local::now().format("%Y%m%d%H%M%S"));

        info!(
            client_id = client.id,
            contract_number = %contract.number,
            document = %document_path.display(),
            signature_id = %signature_id,
            "Document signed (simulated)"
        );

        Ok(SignatureOutcome {
            status: SignatureState::Signed,
            contract_url,
            signature_id,
            message: "Documento assinado com sucesso (simulação)".to_string(),
            signed_at: Utc::now(),
        })
    }

    async fn check_signature_status(&self, signature_id: &str) -> Result<SignatureStatusReport, SignatureError> {
        info!(signature_id, "Checking signature status (simulated)");
        Ok(SignatureStatusReport {
            signature_id: signature_id.to_string(),
            status: "completed".to_string(),
            signed: true,
            message: "Assinatura concluída (simulação)".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentsConfig;
    use crate::cpf::Cpf;
    use crate::models::{Address, ContractStatus, Vehicle};

    fn provider(public_prefix: &str) -> SimulatedSignatureProvider {
        SimulatedSignatureProvider::new(ContractDocuments::new(&DocumentsConfig {
            contracts_dir: "contracts".into(),
            public_prefix: public_prefix.to_string(),
        }))
    }

    fn fixtures() -> (Client, Contract) {
        let client = Client {
            id: 7,
            full_name: "Maria da Silva".to_string(),
            cpf: Cpf::parse("52998224725").unwrap(),
            email: "maria@example.com".to_string(),
            phone: "(11) 98765-4321".to_string(),
            address: Address {
                postal_code: "01310-100".to_string(),
                street: "Avenida Paulista".to_string(),
                number: "1000".to_string(),
                complement: None,
                district: "Bela Vista".to_string(),
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
            },
            vehicle: Vehicle::default(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let contract = Contract {
            id: 3,
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
        };
        (client, contract)
    }

    #[tokio::test]
    async fn test_sign_document_always_succeeds() {
        let provider = provider("/contracts/");
        let (client, contract) = fixtures();

        let outcome = provider
            .sign_document(&client, &contract, Path::new("contracts/CTR-20250601-0007.pdf"))
            .await
            .unwrap();

        assert_eq!(outcome.status, SignatureState::Signed);
        assert_eq!(outcome.contract_url, "/contracts/CTR-20250601-0007.pdf");
        assert!(outcome.signature_id.starts_with("SIM-"));
        assert_eq!(outcome.signature_id.len(), "SIM-".len() + 14);
    }

    #[tokio::test]
    async fn test_status_is_always_completed() {
        let provider = provider("/contracts");
        let report = provider.check_signature_status("anything").await.unwrap();

        assert_eq!(report.signature_id, "anything");
        assert_eq!(report.status, "completed");
        assert!(report.signed);
    }
}
