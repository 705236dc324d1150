use std::sync::Arc;

use serde_json::{json, Value};
use sqlx::{MySql, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, AppResult};
use crate::payments::models::{AuditAction, Payment, PaymentAudit};
use crate::payments::repositories::{InsertOutcome, PaymentStore};
use crate::processors::{PaymentRequest, PaymentResponse, ProcessorRegistry};

/// Orchestrates the idempotent payment pipeline — the heart of the
/// system. Ties together the store, the processor registry, and whichever
/// processor the registry selects.
pub struct PaymentService {
    store: Arc<dyn PaymentStore>,
    registry: ProcessorRegistry,
}

impl PaymentService {
    pub fn new(store: Arc<dyn PaymentStore>, registry: ProcessorRegistry) -> Self {
        Self { store, registry }
    }

    /// Runs the request→persist-pending→process→persist-final→respond
    /// state machine. A new idempotency key runs the full pipeline; a
    /// previously-seen key is a replay and short-circuits to
    /// `find_and_map` without touching the processor or writing a second
    /// audit row.
    pub async fn handle_payment(
        &self,
        idempotency_key: &str,
        request: PaymentRequest,
    ) -> AppResult<PaymentResponse> {
        // Written and committed eagerly, before the payment row exists or
        // the enclosing transaction begins, so it survives even if that
        // transaction later rolls back.
        let scrubbed = scrub_request_payload(&request);
        let received_audit = PaymentAudit::new(
            None,
            idempotency_key,
            AuditAction::RequestReceived,
            scrubbed.to_string(),
        );
        if let Err(e) = self.store.insert_audit_standalone(&received_audit).await {
            tracing::error!(error = %e, idempotency_key, "failed to persist REQUEST_RECEIVED audit");
        }

        let mut tx = self.store.begin().await?;

        if self
            .store
            .find_by_idempotency_key(&mut tx, idempotency_key)
            .await?
            .is_some()
        {
            let response = self.find_and_map(&mut tx, idempotency_key).await?;
            tx.commit().await.map_err(AppError::Database)?;
            return Ok(response);
        }

        let mut payment =
            Payment::new_pending(idempotency_key.to_string(), request.amount, request.currency.clone());

        match self.store.insert(&mut tx, &payment).await? {
            InsertOutcome::Inserted => {}
            InsertOutcome::AlreadyExists => {
                // Lost a race against a concurrent inserter with the same
                // key. Treat it exactly like an ordinary replay.
                let response = self.find_and_map(&mut tx, idempotency_key).await?;
                tx.commit().await.map_err(AppError::Database)?;
                return Ok(response);
            }
        }

        // Any failure from here drops `tx` uncommitted, rolling the PENDING
        // row back along with it — the already-committed REQUEST_RECEIVED
        // audit is all that survives.
        let processor = self.registry.select(&request.payment_type)?;
        let outcome = processor.process(&request).await?;

        let details = Value::Object(outcome.fields.clone());
        payment.finalize(outcome.status, details);
        self.store.update(&mut tx, &payment).await?;

        let completed_payload = serde_json::to_string(&outcome)
            .unwrap_or_else(|_| "{}".to_string());
        let completed_audit = PaymentAudit::new(
            Some(payment.id),
            idempotency_key,
            AuditAction::ProcessCompleted,
            completed_payload,
        );
        if let Err(e) = self.store.insert_audit(&mut tx, &completed_audit).await {
            tracing::error!(error = %e, idempotency_key, "failed to persist PROCESS_COMPLETED audit");
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(self.map_to_response(&payment))
    }

    /// Replay path: takes a pessimistic row lock so a concurrent finalizer
    /// is fully committed (or waited on) before this read observes the row.
    async fn find_and_map(
        &self,
        tx: &mut Transaction<'_, MySql>,
        idempotency_key: &str,
    ) -> AppResult<PaymentResponse> {
        let payment = self
            .store
            .find_and_lock_by_idempotency_key(tx, idempotency_key)
            .await?
            .ok_or_else(|| {
                AppError::consistency(format!(
                    "replay lost its own row for idempotency key {}",
                    idempotency_key
                ))
            })?;
        Ok(self.map_to_response(&payment))
    }

    pub async fn get_payment_by_id(&self, id: Uuid) -> AppResult<PaymentResponse> {
        let payment = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("payment {} not found", id)))?;
        Ok(self.map_to_response(&payment))
    }

    /// Seeds payment_id/status/amount/currency, then lets whichever
    /// processor the stored `details.type` names project the rest.
    fn map_to_response(&self, payment: &Payment) -> PaymentResponse {
        let mut response =
            PaymentResponse::new(Some(payment.id), payment.status, payment.amount, payment.currency.clone());

        if let Some(details) = payment.details.as_ref().and_then(|v| v.as_object()) {
            let payment_type = details.get("type").and_then(|v| v.as_str()).unwrap_or("UNKNOWN");
            if let Ok(processor) = self.registry.select(payment_type) {
                processor.map_details_to_response(details, &mut response);
            }
            if let Some(message) = details.get("message").and_then(|v| v.as_str()) {
                response.message = Some(message.to_string());
            }
        }

        response
    }
}

/// Scrub PAN/CVV before an audit payload derived from a request is ever
/// serialized. `card_number` → `****`, `cvv` → `***`.
fn scrub_request_payload(request: &PaymentRequest) -> Value {
    let mut data = request.fields.clone();
    if data.contains_key("card_number") {
        data.insert("card_number".to_string(), Value::String("****".to_string()));
    }
    if data.contains_key("cvv") {
        data.insert("cvv".to_string(), Value::String("***".to_string()));
    }
    json!({
        "amount": request.amount,
        "currency": request.currency,
        "data": data,
    })
}
