//! Application services sitting between the HTTP handlers and the store

pub mod clients;
pub mod contracts;

pub use clients::ClientRegistry;
pub use contracts::{ContractRequest, ContractService};
