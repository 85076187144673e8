use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Contract, ContractStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractEvent {
    Sign {
        signed_at: DateTime<Utc>,
        document_url: String,
        signature_id: String,
    },
    Cancel {
        reason: String,
    },
}

impl ContractEvent {
    fn name(&self) -> &'static str {
        match self {
            ContractEvent::Sign { .. } => "sign",
            ContractEvent::Cancel { .. } => "cancel",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {event} a contract in status {from}")]
    InvalidTransition {
        from: ContractStatus,
        event: &'static str,
    },
}

impl ContractStatus {
    /// Only pending contracts move; signed and cancelled are terminal.
    pub fn next(self, event: &ContractEvent) -> Result<ContractStatus, TransitionError> {
        match (self, event) {
            (ContractStatus::Pending, ContractEvent::Sign { .. }) => Ok(ContractStatus::Signed),
            (ContractStatus::Pending, ContractEvent::Cancel { .. }) => {
                Ok(ContractStatus::Cancelled)
            }
            (from, event) => Err(TransitionError::InvalidTransition {
                from,
                event: event.name(),
            }),
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ContractStatus::Pending)
    }
}

impl Contract {
    /// Apply `event` in memory and return the status it moved from.
    pub fn apply(&mut self, event: &ContractEvent) -> Result<ContractStatus, TransitionError> {
        let previous = self.status;
        self.status = previous.next(event)?;

        if let ContractEvent::Sign {
            signed_at,
            document_url,
            signature_id,
        } = event
        {
            self.signed_at = Some(*signed_at);
            self.document_url = Some(document_url.clone());
            self.signature_id = Some(signature_id.clone());
        }

        tracing::debug!(
            contract_number = %self.number,
            from = %previous,
            to = %self.status,
            "Contract status transition"
        );
        Ok(previous)
    }
}
