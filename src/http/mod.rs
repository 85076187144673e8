//! HTTP surface: router, handlers and middleware

mod error;
mod handlers;
mod middleware;
pub mod requests;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::documents::ContractDocuments;
use crate::postal::PostalLookup;
use crate::services::{ClientRegistry, ContractService};

/// Shared handler state; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub clients: ClientRegistry,
    pub contracts: Arc<ContractService>,
    pub postal: Arc<dyn PostalLookup>,
    pub documents: ContractDocuments,
    pub cors_allowed_origins: Arc<Vec<String>>,
}

pub fn build_router(state: AppState) -> Router {
    let documents_route = format!("{}/:file", state.documents.public_prefix());

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/api/clientes", post(handlers::create_client_handler))
        .route("/api/clientes/:id", get(handlers::get_client_handler))
        .route("/api/contratos/gerar", post(handlers::generate_contract_handler))
        .route("/api/contratos/:id", get(handlers::get_contract_handler))
        .route(
            "/api/contratos/:id/assinatura",
            get(handlers::signature_status_handler),
        )
        .route("/api/cep/:code", get(handlers::postal_code_handler))
        .route(&documents_route, get(handlers::contract_document_handler))
        .layer(from_fn_with_state(state.clone(), middleware::cors_middleware))
        .layer(from_fn(middleware::request_tracing_middleware))
        .with_state(state)
}
