use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cpf::Cpf;

/// Postal address of a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "cep")]
    pub postal_code: String,
    #[serde(rename = "logradouro")]
    pub street: String,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "complemento")]
    pub complement: Option<String>,
    #[serde(rename = "bairro")]
    pub district: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
}

/// Optional vehicle data captured at registration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "placa")]
    pub plate: Option<String>,
    #[serde(rename = "modelo")]
    pub model: Option<String>,
    #[serde(rename = "marca")]
    pub make: Option<String>,
    #[serde(rename = "ano")]
    pub year: Option<String>,
}

/// Validated registration data, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub full_name: String,
    pub cpf: Cpf,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub vehicle: Vehicle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: i64,
    #[serde(rename = "nome_completo")]
    pub full_name: String,
    pub cpf: Cpf,
    pub email: String,
    #[serde(rename = "celular")]
    pub phone: String,
    #[serde(flatten)]
    pub address: Address,
    #[serde(flatten)]
    pub vehicle: Vehicle,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "atualizado_em", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Contract status as stored and as sent over the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractStatus {
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "assinado")]
    Signed,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Pending => "pendente",
            ContractStatus::Signed => "assinado",
            ContractStatus::Cancelled => "cancelado",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pendente" => Some(ContractStatus::Pending),
            "assinado" => Some(ContractStatus::Signed),
            "cancelado" => Some(ContractStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    pub client_id: i64,
    pub number: String,
    pub plan_name: String,
    pub plan_value: String,
    pub terms_accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contract {
    pub id: i64,
    #[serde(rename = "cliente_id")]
    pub client_id: i64,
    #[serde(rename = "numero_contrato")]
    pub number: String,
    pub status: ContractStatus,
    #[serde(rename = "arquivo_pdf")]
    pub document_url: Option<String>,
    #[serde(rename = "plano_nome")]
    pub plan_name: String,
    #[serde(rename = "plano_valor")]
    pub plan_value: String,
    #[serde(rename = "termos_aceitos")]
    pub terms_accepted: bool,
    #[serde(rename = "data_aceite")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "assinado_em")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(rename = "assinatura_id")]
    pub signature_id: Option<String>,
}
