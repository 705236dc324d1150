use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two points in the pipeline an audit row is ever written at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(32)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    RequestReceived,
    ProcessCompleted,
}

/// Append-only audit row. `payload` must already be scrubbed before a
/// `PaymentAudit` is constructed — this type does not scrub.
#[derive(Debug, Clone)]
pub struct PaymentAudit {
    pub id: i64,
    pub payment_id: Option<Uuid>,
    pub idempotency_key: String,
    pub action: AuditAction,
    pub payload: String,
    pub timestamp: DateTime<Utc>,
}

impl PaymentAudit {
    pub fn new(
        payment_id: Option<Uuid>,
        idempotency_key: impl Into<String>,
        action: AuditAction,
        payload: String,
    ) -> Self {
        Self {
            id: 0,
            payment_id,
            idempotency_key: idempotency_key.into(),
            action,
            payload,
            timestamp: Utc::now(),
        }
    }
}
