//! Request bodies and their field-level validation

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::cpf::Cpf;
use crate::error::AppError;
use crate::models::{Address, NewClient, Vehicle};
use crate::services::ContractRequest;

static FIELD_PATTERNS: OnceLock<HashMap<&'static str, Regex>> = OnceLock::new();

fn field_patterns() -> &'static HashMap<&'static str, Regex> {
    FIELD_PATTERNS.get_or_init(|| {
        [
            ("cpf", r"^\d{3}\.\d{3}\.\d{3}-\d{2}$"),
            ("celular", r"^\(\d{2}\) \d{5}-\d{4}$"),
            ("cep", r"^\d{5}-\d{3}$"),
            ("estado", r"^[A-Z]{2}$"),
        ]
        .into_iter()
        .filter_map(|(field, pattern)| Regex::new(pattern).ok().map(|re| (field, re)))
        .collect()
    })
}

/// Collects every problem with a request instead of stopping at the first
#[derive(Debug, Default)]
struct Violations(Vec<String>);

impl Violations {
    fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            self.0.push(format!("{field}: deve ter entre {min} e {max} caracteres"));
        }
    }

    fn pattern(&mut self, field: &'static str, value: &str) -> bool {
        let ok = field_patterns()
            .get(field)
            .is_some_and(|re| re.is_match(value));
        if !ok {
            self.0.push(format!("{field}: formato inválido"));
        }
        ok
    }

    fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleRequest {
    pub placa: Option<String>,
    pub modelo: Option<String>,
    pub marca: Option<String>,
    pub ano: Option<String>,
}

/// Body of `POST /api/clientes`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClientRequest {
    pub nome_completo: String,
    pub cpf: String,
    pub email: String,
    pub celular: String,
    pub cep: String,
    pub logradouro: String,
    pub numero: String,
    pub complemento: Option<String>,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    pub veiculo: Option<VehicleRequest>,
}

impl CreateClientRequest {
    pub fn validate(self) -> Result<NewClient, AppError> {
        let mut v = Violations::default();

        v.length("nome_completo", &self.nome_completo, 3, 200);

        let cpf = if v.pattern("cpf", &self.cpf) {
            match Cpf::parse(&self.cpf) {
                Ok(cpf) => Some(cpf),
                Err(_) => {
                    v.push("cpf: CPF inválido");
                    None
                }
            }
        } else {
            None
        };

        if !deliverable_email(&self.email) {
            v.push("email: endereço de e-mail inválido");
        }
        v.pattern("celular", &self.celular);
        v.pattern("cep", &self.cep);
        v.length("logradouro", &self.logradouro, 3, 200);
        v.length("numero", &self.numero, 1, 20);
        if let Some(complement) = &self.complemento {
            v.length("complemento", complement, 0, 100);
        }
        v.length("bairro", &self.bairro, 2, 100);
        v.length("cidade", &self.cidade, 2, 100);
        v.pattern("estado", &self.estado);

        let cpf = match cpf {
            Some(cpf) if v.0.is_empty() => cpf,
            _ => return Err(AppError::Validation(v.0)),
        };

        let vehicle = self.veiculo.unwrap_or_default();
        Ok(NewClient {
            full_name: self.nome_completo,
            cpf,
            email: self.email,
            phone: self.celular,
            address: Address {
                postal_code: self.cep,
                street: self.logradouro,
                number: self.numero,
                complement: self.complemento,
                district: self.bairro,
                city: self.cidade,
                state: self.estado,
            },
            vehicle: Vehicle {
                plate: vehicle.placa,
                model: vehicle.modelo,
                make: vehicle.marca,
                year: vehicle.ano,
            },
        })
    }
}

/// Body of `POST /api/contratos/gerar`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContractRequest {
    pub cliente_id: i64,
    pub plano_nome: Option<String>,
    pub plano_valor: Option<String>,
    #[serde(default = "default_terms_accepted")]
    pub termos_aceitos: bool,
}

fn default_terms_accepted() -> bool {
    true
}

impl From<GenerateContractRequest> for ContractRequest {
    fn from(req: GenerateContractRequest) -> Self {
        ContractRequest {
            client_id: req.cliente_id,
            plan_name: req.plano_nome,
            plan_value: req.plano_valor,
            terms_accepted: req.termos_aceitos,
        }
    }
}

/// RFC 5321 syntax plus a dotted domain, so single-label hosts like `a@b` are refused
fn deliverable_email(email: &str) -> bool {
    email
        .parse::<lettre::Address>()
        .map(|address| {
            let domain = address.domain();
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateClientRequest {
        CreateClientRequest {
            nome_completo: "Maria da Silva".to_string(),
            cpf: "529.982.247-25".to_string(),
            email: "maria@example.com".to_string(),
            celular: "(11) 98765-4321".to_string(),
            cep: "01310-100".to_string(),
            logradouro: "Avenida Paulista".to_string(),
            numero: "1000".to_string(),
            complemento: Some("Apto 12".to_string()),
            bairro: "Bela Vista".to_string(),
            cidade: "São Paulo".to_string(),
            estado: "SP".to_string(),
            veiculo: Some(VehicleRequest {
                placa: Some("ABC1D23".to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_valid_request_becomes_new_client() {
        let client = valid().validate().unwrap();
        assert_eq!(client.cpf.digits(), "52998224725");
        assert_eq!(client.address.state, "SP");
        assert_eq!(client.vehicle.plate.as_deref(), Some("ABC1D23"));
        assert!(client.vehicle.model.is_none());
    }

    #[test]
    fn test_all_violations_are_reported_together() {
        let mut req = valid();
        req.nome_completo = "Al".to_string();
        req.celular = "11987654321".to_string();
        req.estado = "sp".to_string();
        req.email = "not-an-email".to_string();

        match req.validate() {
            Err(AppError::Validation(problems)) => {
                assert_eq!(problems.len(), 4, "{problems:?}");
                assert!(problems.iter().any(|p| p.starts_with("nome_completo")));
                assert!(problems.iter().any(|p| p.starts_with("celular")));
                assert!(problems.iter().any(|p| p.starts_with("estado")));
                assert!(problems.iter().any(|p| p.starts_with("email")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_email_needs_dotted_domain() {
        for accepted in ["maria@example.com", "joao.souza@mail.example.com.br"] {
            assert!(deliverable_email(accepted), "{accepted}");
        }
        for rejected in ["a@b", "maria@localhost", "maria@example.", "maria@.com", "maria"] {
            assert!(!deliverable_email(rejected), "{rejected}");
        }

        let mut req = valid();
        req.email = "a@b".to_string();
        match req.validate() {
            Err(AppError::Validation(problems)) => {
                assert_eq!(problems, vec!["email: endereço de e-mail inválido"])
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_cpf_needs_mask_and_checksum() {
        let mut unmasked = valid();
        unmasked.cpf = "52998224725".to_string();
        assert!(matches!(unmasked.validate(), Err(AppError::Validation(_))));

        let mut bad_checksum = valid();
        bad_checksum.cpf = "529.982.247-26".to_string();
        match bad_checksum.validate() {
            Err(AppError::Validation(problems)) => assert_eq!(problems, vec!["cpf: CPF inválido"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_contract_request_defaults_to_accepted_terms() {
        let req: GenerateContractRequest = serde_json::from_str(r#"{"cliente_id": 7}"#).unwrap();
        let request = ContractRequest::from(req);
        assert_eq!(request.client_id, 7);
        assert!(request.terms_accepted);
        assert!(request.plan_name.is_none());
    }
}
