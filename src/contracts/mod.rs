//! Contract numbering and lifecycle rules

pub mod lifecycle;
pub mod number;

pub use lifecycle::{ContractEvent, TransitionError};
pub use number::contract_number;
