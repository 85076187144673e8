use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::error::AppError;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateCpf
            | AppError::AlreadySigned
            | AppError::Conflict(_)
            | AppError::InvalidPostalCode => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Validation(problems) => {
                warn!(problems = ?problems, "Rejected invalid request");
                json!({"detail": self.to_string(), "errors": problems})
            }
            AppError::Internal(details) => {
                error!(details = %details, "Request failed");
                json!({"detail": self.to_string()})
            }
            _ => json!({"detail": self.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_details_are_not_exposed() {
        let (status, body) = body_of(AppError::Internal("disk I/O error".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Erro interno do servidor");
    }

    #[tokio::test]
    async fn test_error_taxonomy() {
        assert_eq!(body_of(AppError::DuplicateCpf).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(body_of(AppError::AlreadySigned).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(AppError::NotFound("Cliente não encontrado".into())).await,
            (StatusCode::NOT_FOUND, json!({"detail": "Cliente não encontrado"}))
        );
        assert_eq!(
            body_of(AppError::Unavailable("Erro ao consultar CEP".into())).await.0,
            StatusCode::SERVICE_UNAVAILABLE
        );

        let (status, body) = body_of(AppError::Validation(vec!["cep: formato inválido".into()])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0], "cep: formato inválido");
    }
}
