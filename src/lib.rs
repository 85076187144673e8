// Contract Signup - client registration, contract PDFs and simulated signatures
// This exposes the core components for the binary and integration tests

pub mod config;
pub mod contracts;
pub mod cpf;
pub mod database;
pub mod documents;
pub mod error;
pub mod http;
pub mod models;
pub mod notification;
pub mod postal;
pub mod server;
pub mod services;
pub mod shutdown;
pub mod signature;
pub mod telemetry;

// Re-export key types for easy access
pub use config::AppConfig;
pub use contracts::{contract_number, ContractEvent, TransitionError};
pub use cpf::{Cpf, CpfError};
pub use database::{Database, StoreError};
pub use documents::{ContractDocuments, DocumentError};
pub use error::AppError;
pub use http::{build_router, AppState};
pub use models::{Address, Client, Contract, ContractStatus, NewClient, NewContract, Vehicle};
pub use notification::{ContractEmail, Delivery, NotificationError, Notifier, SmtpNotifier};
pub use postal::{PostalAddress, PostalError, PostalLookup, ViaCepClient};
pub use server::{assemble_state, build_state, run};
pub use services::{ClientRegistry, ContractRequest, ContractService};
pub use signature::{
    SignatureError, SignatureOutcome, SignatureProvider, SignatureState, SignatureStatusReport,
    SimulatedSignatureProvider,
};
pub use telemetry::{generate_request_id, init_telemetry};
