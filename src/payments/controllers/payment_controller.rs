// HTTP handlers for the payment endpoints.
//
// Endpoints:
// - POST /v1/payments/process - Run the idempotent payment pipeline
// - GET /v1/payments/{id} - Fetch a previously processed payment

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::core::error::{AppError, AppResult};
use crate::payments::services::PaymentService;
use crate::processors::PaymentRequest;

const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";

/// POST /v1/payments/process
///
/// # Request body
/// ```json
/// { "amount": 1000, "currency": "USD", "type": "CARD",
///   "card_number": "4234567890123456", "cvv": "123",
///   "expiry_month": 12, "expiry_year": 2030 }
/// ```
/// Fields beyond `amount`, `currency`, and `type` are preserved verbatim
/// and handed to whichever processor is selected.
///
/// # Response
/// - 201 Created: payment processed (or replayed)
/// - 400 Bad Request: body failed schema validation, or was rejected by
///   the domain (unsupported type/currency/card)
/// - 500 Internal Server Error: unexpected failure
pub async fn process_payment(
    req: HttpRequest,
    body: web::Json<Value>,
    service: web::Data<PaymentService>,
) -> AppResult<HttpResponse> {
    let idempotency_key = req
        .headers()
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty());

    let body = body.as_object().cloned().unwrap_or_default();
    let (idempotency_key, request) = match parse_payment_request(idempotency_key, &body) {
        Ok(parsed) => parsed,
        Err(errors) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "status": "REJECTED",
                "message": "Validation failed",
                "errors": errors,
            })));
        }
    };

    let response = service.handle_payment(&idempotency_key, request).await?;

    Ok(HttpResponse::Created().json(response))
}

/// GET /v1/payments/{id}
///
/// # Response
/// - 200 OK: payment found
/// - 404 Not Found: unknown id
pub async fn get_payment(
    id: web::Path<String>,
    service: web::Data<PaymentService>,
) -> AppResult<HttpResponse> {
    let payment_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::not_found(format!("payment {} not found", id)))?;

    let response = service.get_payment_by_id(payment_id).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Schema-level validation: required header, required core fields. Domain
/// validation (card number format, supported currency, ...) happens later
/// inside the selected processor and surfaces as a `BAD_REQUEST` rejection
/// instead of this field-level `errors` map.
fn parse_payment_request(
    idempotency_key: Option<&str>,
    body: &Map<String, Value>,
) -> Result<(String, PaymentRequest), Map<String, Value>> {
    let mut errors = Map::new();

    if idempotency_key.is_none() {
        errors.insert(
            IDEMPOTENCY_KEY_HEADER.to_string(),
            json!("header is required"),
        );
    }

    let amount = body.get("amount").and_then(Value::as_i64);
    match amount {
        None => {
            errors.insert("amount".to_string(), json!("amount is required and must be an integer"));
        }
        Some(value) if value < 0 => {
            errors.insert("amount".to_string(), json!("amount must not be negative"));
        }
        Some(_) => {}
    }

    let currency = body.get("currency").and_then(Value::as_str);
    if currency.is_none() {
        errors.insert("currency".to_string(), json!("currency is required"));
    }

    let payment_type = body.get("type").and_then(Value::as_str);
    if payment_type.is_none() {
        errors.insert("type".to_string(), json!("type is required"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut fields = body.clone();
    fields.remove("amount");
    fields.remove("currency");
    fields.remove("type");

    let request = PaymentRequest {
        amount: amount.expect("checked above"),
        currency: currency.expect("checked above").to_string(),
        payment_type: payment_type.expect("checked above").to_string(),
        fields,
    };

    Ok((idempotency_key.expect("checked above").to_string(), request))
}

/// Registers the payment routes on the given scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/payments")
            .route("/process", web::post().to(process_payment))
            .route("/{id}", web::get().to(get_payment)),
    );
}
