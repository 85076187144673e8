use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()?;
    }

    tracing::info!("Contract signup telemetry initialized");
    Ok(())
}

/// Generate an id linking every log line of one HTTP request
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one contract generation
pub fn create_contract_span(client_id: i64) -> tracing::Span {
    tracing::info_span!(
        "contract_generation",
        client.id = client_id,
        contract.number = tracing::field::Empty,
    )
}
