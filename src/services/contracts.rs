use chrono::{Duration, Local, NaiveDate, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

use crate::config::PlanConfig;
use crate::contracts::{contract_number, ContractEvent};
use crate::database::{Database, StoreError};
use crate::documents::ContractDocuments;
use crate::error::AppError;
use crate::models::{Client, Contract, ContractStatus, NewContract};
use crate::notification::{dispatch_detached, ContractEmail, Notifier};
use crate::signature::{SignatureProvider, SignatureState, SignatureStatusReport};
use crate::telemetry::create_contract_span;

/// Age after which a pending contract is treated as left behind by a crashed request
const ABANDONED_AFTER_MINUTES: i64 = 10;

/// Contract generation request after HTTP-level parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRequest {
    pub client_id: i64,
    pub plan_name: Option<String>,
    pub plan_value: Option<String>,
    pub terms_accepted: bool,
}

/// Creates, renders, signs and announces contracts
pub struct ContractService {
    db: Database,
    documents: ContractDocuments,
    signature: Arc<dyn SignatureProvider>,
    notifier: Arc<dyn Notifier>,
    plan: PlanConfig,
    abandoned_after: Duration,
}

impl ContractService {
    pub fn new(
        db: Database,
        documents: ContractDocuments,
        signature: Arc<dyn SignatureProvider>,
        notifier: Arc<dyn Notifier>,
        plan: PlanConfig,
    ) -> Self {
        Self {
            db,
            documents,
            signature,
            notifier,
            plan,
            abandoned_after: Duration::minutes(ABANDONED_AFTER_MINUTES),
        }
    }

    pub fn with_abandoned_after(mut self, abandoned_after: Duration) -> Self {
        self.abandoned_after = abandoned_after;
        self
    }

    pub async fn generate(&self, request: ContractRequest) -> Result<Contract, AppError> {
        let span = create_contract_span(request.client_id);
        self.generate_on(request, Local::now().date_naive())
            .instrument(span)
            .await
    }

    /// Pending → signed within one call. Any failure after the pending row
    /// exists cancels it so the number can be reused.
    pub async fn generate_on(&self, request: ContractRequest, today: NaiveDate) -> Result<Contract, AppError> {
        let client = self
            .db
            .get_client(request.client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente não encontrado".to_string()))?;

        if self.db.has_signed_contract(client.id).await? {
            return Err(AppError::AlreadySigned);
        }

        self.release_abandoned(client.id).await?;

        let number = contract_number(client.id, today);
        tracing::Span::current().record("contract.number", number.as_str());

        let new_contract = NewContract {
            client_id: client.id,
            number,
            plan_name: request
                .plan_name
                .unwrap_or_else(|| self.plan.default_name.clone()),
            plan_value: request
                .plan_value
                .unwrap_or_else(|| self.plan.default_value.clone()),
            terms_accepted: request.terms_accepted,
            accepted_at: request.terms_accepted.then(Utc::now),
        };
        let mut contract = self.db.insert_contract(&new_contract).await?;
        info!(contract_id = contract.id, "Pending contract created");

        match self.sign(&client, &mut contract, today).await {
            Ok(pdf_path) => {
                dispatch_detached(
                    self.notifier.clone(),
                    ContractEmail::new(&client, &contract, pdf_path),
                );
                Ok(contract)
            }
            Err(err) => {
                self.cancel(&mut contract, &err).await;
                Err(err)
            }
        }
    }

    /// Render, sign and persist the signed state; returns the PDF path
    async fn sign(
        &self,
        client: &Client,
        contract: &mut Contract,
        today: NaiveDate,
    ) -> Result<PathBuf, AppError> {
        let pdf_path = self.documents.render_on(client, contract, today).await?;

        let outcome = self
            .signature
            .sign_document(client, contract, &pdf_path)
            .await?;
        if outcome.status != SignatureState::Signed {
            return Err(AppError::internal(format!(
                "{} provider returned {:?} for {}",
                self.signature.name(),
                outcome.status,
                contract.number
            )));
        }

        let previous = contract
            .apply(&ContractEvent::Sign {
                signed_at: outcome.signed_at,
                document_url: outcome.contract_url,
                signature_id: outcome.signature_id,
            })
            .map_err(AppError::internal)?;
        self.db.persist_transition(contract, previous).await?;

        info!(
            signature_id = contract.signature_id.as_deref().unwrap_or_default(),
            "Contract signed"
        );
        Ok(pdf_path)
    }

    /// Cancel pending rows older than `abandoned_after`.
    ///
    /// A request that died between insert and cancel leaves its row pending,
    /// which would hold that day's contract number. Younger rows belong to
    /// requests that may still be running and are left alone.
    async fn release_abandoned(&self, client_id: i64) -> Result<(), AppError> {
        let cutoff = Utc::now() - self.abandoned_after;

        for mut stale in self.db.pending_contracts(client_id).await? {
            if stale.created_at > cutoff {
                continue;
            }
            let previous = stale
                .apply(&ContractEvent::Cancel {
                    reason: "abandoned while pending".to_string(),
                })
                .map_err(AppError::internal)?;
            match self.db.persist_transition(&stale, previous).await {
                Ok(()) => warn!(
                    contract_id = stale.id,
                    contract_number = %stale.number,
                    "Cancelled abandoned pending contract"
                ),
                // Another request settled it first.
                Err(StoreError::StaleTransition { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn cancel(&self, contract: &mut Contract, cause: &AppError) {
        if contract.status == ContractStatus::Signed {
            // Persisting the signature failed, so the stored row is still pending.
            contract.status = ContractStatus::Pending;
            contract.signed_at = None;
            contract.document_url = None;
            contract.signature_id = None;
        }

        let event = ContractEvent::Cancel {
            reason: cause.to_string(),
        };
        let result = match contract.apply(&event) {
            Ok(previous) => self.db.persist_transition(contract, previous).await.map_err(AppError::from),
            Err(e) => Err(AppError::internal(e)),
        };

        match result {
            Ok(()) => info!(cause = ?cause, "Contract cancelled after failed signing"),
            Err(e) => error!(error = ?e, "Could not cancel contract after failed signing"),
        }
    }

    pub async fn get(&self, id: i64) -> Result<Contract, AppError> {
        self.db
            .get_contract(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contrato não encontrado".to_string()))
    }

    pub async fn signature_status(&self, contract_id: i64) -> Result<SignatureStatusReport, AppError> {
        let contract = self.get(contract_id).await?;
        let signature_id = contract
            .signature_id
            .ok_or_else(|| AppError::NotFound("Contrato sem assinatura".to_string()))?;

        Ok(self.signature.check_signature_status(&signature_id).await?)
    }
}
