use thiserror::Error;

use crate::database::StoreError;
use crate::documents::DocumentError;
use crate::postal::PostalError;
use crate::signature::SignatureError;

/// Errors surfaced to HTTP callers.
///
/// Messages are the user-facing Portuguese strings the registration form
/// displays; details of internal failures stay in the logs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Dados inválidos: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("CPF já cadastrado no sistema")]
    DuplicateCpf,

    #[error("Cliente já possui contrato assinado")]
    AlreadySigned,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("CEP inválido")]
    InvalidPostalCode,

    #[error("{0}")]
    Unavailable(String),

    #[error("Erro interno do servidor")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateCpf(_) => AppError::DuplicateCpf,
            StoreError::AlreadySigned { .. } => AppError::AlreadySigned,
            StoreError::DuplicateContractNumber(number) => {
                AppError::Conflict(format!("Contrato {number} já está em andamento"))
            }
            other => AppError::internal(other),
        }
    }
}

impl From<PostalError> for AppError {
    fn from(err: PostalError) -> Self {
        match err {
            PostalError::InvalidFormat(_) => AppError::InvalidPostalCode,
            PostalError::NotFound(_) => AppError::NotFound("CEP não encontrado".to_string()),
            PostalError::Unavailable(_) => AppError::Unavailable("Erro ao consultar CEP".to_string()),
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(_) | DocumentError::InvalidName(_) => {
                AppError::NotFound("Documento não encontrado".to_string())
            }
            other => AppError::internal(other),
        }
    }
}

impl From<SignatureError> for AppError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::UnknownSignature(_) => {
                AppError::NotFound("Assinatura não encontrada".to_string())
            }
            other => AppError::internal(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpf::Cpf;

    #[test]
    fn test_store_errors_map_to_caller_errors() {
        let cpf = Cpf::parse("52998224725").unwrap();
        assert!(matches!(AppError::from(StoreError::DuplicateCpf(cpf)), AppError::DuplicateCpf));
        assert!(matches!(
            AppError::from(StoreError::AlreadySigned { client_id: 1 }),
            AppError::AlreadySigned
        ));
        assert!(matches!(
            AppError::from(StoreError::Corrupt { table: "clients", reason: "x".into() }),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_validation_message_joins_all_problems() {
        let err = AppError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Dados inválidos: a; b");
    }
}
