use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::processors::PaymentStatus;

/// Persistent payment record. Invariants: `idempotency_key` is unique,
/// status is monotonic PENDING → terminal, and `details` never carries a
/// raw PAN or CVV.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub idempotency_key: String,
    pub details: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new_pending(idempotency_key: String, amount: i64, currency: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            amount,
            currency,
            status: PaymentStatus::Pending,
            idempotency_key,
            details: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn finalize(&mut self, status: PaymentStatus, details: Value) {
        self.status = status;
        self.details = Some(details);
        self.updated_at = Utc::now();
    }
}
