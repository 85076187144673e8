use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use super::requests::{CreateClientRequest, GenerateContractRequest};
use super::AppState;
use crate::error::AppError;
use crate::models::{Client, Contract};
use crate::postal::PostalAddress;
use crate::signature::SignatureStatusReport;

pub(crate) async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "API Sistema de Cadastro e Contratos",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "online",
    }))
}

pub(crate) async fn health_handler() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

pub(crate) async fn create_client_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateClientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let Json(request) = payload?;
    let client = state.clients.register(request.validate()?).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub(crate) async fn get_client_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Client>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.clients.get(id).await?))
}

pub(crate) async fn generate_contract_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateContractRequest>, JsonRejection>,
) -> Result<Json<Contract>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.contracts.generate(request.into()).await?))
}

pub(crate) async fn get_contract_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Contract>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.contracts.get(id).await?))
}

pub(crate) async fn signature_status_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SignatureStatusReport>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.contracts.signature_status(id).await?))
}

pub(crate) async fn postal_code_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PostalAddress>, AppError> {
    Ok(Json(state.postal.lookup(&code).await?))
}

/// Serves `<number>.pdf` from the contracts directory
pub(crate) async fn contract_document_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let number = file
        .strip_suffix(".pdf")
        .ok_or_else(|| AppError::NotFound("Documento não encontrado".to_string()))?;
    let bytes = state.documents.read(number).await?;

    let mut response = bytes.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("inline; filename=\"{file}\"")) {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}
