use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::AppResult;

/// Payment status, persisted on `Payment.status` and returned to the
/// merchant verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(32)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Authorized,
    Declined,
    PendingReconciliation,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Authorized => "AUTHORIZED",
            PaymentStatus::Declined => "DECLINED",
            PaymentStatus::PendingReconciliation => "PENDING_RECONCILIATION",
        };
        write!(f, "{}", s)
    }
}

/// Request coming off the HTTP surface: a strongly-typed core (amount,
/// currency, declared type) plus an open side map carrying everything
/// else the caller sent — card fields for `CARD`, and unknown extra keys
/// the wire format allows through untouched.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount: i64,
    pub currency: String,
    pub payment_type: String,
    pub fields: Map<String, Value>,
}

/// Merchant-visible response. Seeded by the service with the persisted
/// payment's id/status/amount/currency, then enriched by whichever
/// processor's `map_details_to_response` applies.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub payment_id: Option<uuid::Uuid>,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_four_card_digits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_year: Option<u32>,
}

impl PaymentResponse {
    pub fn new(payment_id: Option<uuid::Uuid>, status: PaymentStatus, amount: i64, currency: String) -> Self {
        Self {
            payment_id,
            status,
            message: None,
            amount,
            currency,
            last_four_card_digits: None,
            expiry_month: None,
            expiry_year: None,
        }
    }
}

/// Internal, unfiltered result of a processor call — becomes `Payment.details`
/// verbatim and the `PROCESS_COMPLETED` audit payload. Never serialized to
/// the merchant directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorOutcome {
    pub status: PaymentStatus,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A pluggable, payment-type–specific processor. The registry holds an
/// ordered collection of these and dispatches by declared payment type.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Whether this processor handles the declared payment type.
    fn supports(&self, payment_type: &str) -> bool;

    /// Validate, call the external collaborator, and classify the outcome.
    /// Validation failures surface as `AppError::InvalidArgument`.
    async fn process(&self, request: &PaymentRequest) -> AppResult<ProcessorOutcome>;

    /// Project a persisted `details` map into the merchant-visible response.
    fn map_details_to_response(&self, details: &Map<String, Value>, response: &mut PaymentResponse);
}
