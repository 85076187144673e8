//! Service wiring and the HTTP server loop

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::database::Database;
use crate::documents::ContractDocuments;
use crate::http::{build_router, AppState};
use crate::notification::{Notifier, SmtpNotifier};
use crate::postal::{PostalLookup, ViaCepClient};
use crate::services::{ClientRegistry, ContractService};
use crate::shutdown::shutdown_signal;
use crate::signature::{SignatureProvider, SimulatedSignatureProvider};

/// Connect the store and build the default collaborators
pub async fn build_state(config: &AppConfig) -> Result<(AppState, Database)> {
    let db = Database::connect(
        &config.database.url,
        config.database.max_connections,
        config.database.auto_migrate,
    )
    .await
    .with_context(|| format!("Failed to open database {}", config.database.url))?;

    let documents = ContractDocuments::new(&config.documents);
    documents
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create {}", documents.dir().display()))?;

    let signature: Arc<dyn SignatureProvider> =
        Arc::new(SimulatedSignatureProvider::new(documents.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(SmtpNotifier::new(config.smtp.clone()));
    let postal: Arc<dyn PostalLookup> =
        Arc::new(ViaCepClient::new(&config.postal).context("Failed to build postal client")?);

    let state = assemble_state(config, db.clone(), documents, signature, notifier, postal);
    Ok((state, db))
}

/// Build the handler state from explicit collaborators
pub fn assemble_state(
    config: &AppConfig,
    db: Database,
    documents: ContractDocuments,
    signature: Arc<dyn SignatureProvider>,
    notifier: Arc<dyn Notifier>,
    postal: Arc<dyn PostalLookup>,
) -> AppState {
    let contracts = ContractService::new(
        db.clone(),
        documents.clone(),
        signature,
        notifier,
        config.plan.clone(),
    );

    AppState {
        clients: ClientRegistry::new(db),
        contracts: Arc::new(contracts),
        postal,
        documents,
        cors_allowed_origins: Arc::new(config.server.cors_allowed_origins.clone()),
    }
}

pub async fn run(config: AppConfig) -> Result<()> {
    let (state, db) = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!(address = %listener.local_addr()?, "Contract signup API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    db.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}
