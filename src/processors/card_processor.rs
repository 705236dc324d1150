use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use serde_json::{Map, Value};

use crate::bank::{BankClient, BankRequest};
use crate::core::error::{AppError, AppResult};
use crate::processors::traits::{PaymentProcessor, PaymentRequest, PaymentResponse, PaymentStatus, ProcessorOutcome};

const SUPPORTED_CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];

/// Card (PAN) payment processor: field validation, PAN masking, bank
/// dispatch, and outcome classification.
pub struct CardProcessor {
    bank: Arc<dyn BankClient>,
}

impl CardProcessor {
    pub fn new(bank: Arc<dyn BankClient>) -> Self {
        Self { bank }
    }
}

#[async_trait]
impl PaymentProcessor for CardProcessor {
    fn supports(&self, payment_type: &str) -> bool {
        payment_type.eq_ignore_ascii_case("CARD")
    }

    async fn process(&self, request: &PaymentRequest) -> AppResult<ProcessorOutcome> {
        let currency = validate_currency(&request.currency)?;
        let card_number = validate_card_number(&request.fields)?;
        let cvv = validate_cvv(&request.fields)?;
        let (expiry_month, expiry_year) = validate_expiry(&request.fields)?;

        let expiry_date = format!("{:02}/{}", expiry_month, expiry_year);
        let bank_request = BankRequest::new(request.amount, currency, &card_number, expiry_date, cvv);
        let bank_response = self.bank.process_bank_payment(bank_request).await;

        let (status, message) = classify(&bank_response);

        let mut fields = Map::new();
        fields.insert("message".to_string(), Value::String(message.to_string()));
        fields.insert("type".to_string(), Value::String("CARD".to_string()));
        fields.insert(
            "masked_card_number".to_string(),
            Value::String(mask_card_number(&card_number)),
        );
        fields.insert(
            "card_type".to_string(),
            Value::String(card_type(&card_number).to_string()),
        );
        fields.insert("expiry_month".to_string(), Value::from(expiry_month));
        fields.insert("expiry_year".to_string(), Value::from(expiry_year));
        fields.insert("amount".to_string(), Value::from(request.amount));
        fields.insert("currency".to_string(), Value::String(currency.to_string()));
        if let Some(code) = &bank_response.authorization_code {
            fields.insert("authorization_code".to_string(), Value::String(code.clone()));
        }

        Ok(ProcessorOutcome { status, fields })
    }

    fn map_details_to_response(&self, details: &Map<String, Value>, response: &mut PaymentResponse) {
        if let Some(month) = details.get("expiry_month").and_then(|v| v.as_u64()) {
            response.expiry_month = Some(month as u32);
        }
        if let Some(year) = details.get("expiry_year").and_then(|v| v.as_u64()) {
            response.expiry_year = Some(year as u32);
        }
        if let Some(masked) = details.get("masked_card_number").and_then(|v| v.as_str()) {
            if masked.len() >= 4 {
                response.last_four_card_digits = Some(masked[masked.len() - 4..].to_string());
            }
        }
    }
}

fn validate_currency(currency: &str) -> AppResult<&'static str> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(currency))
        .copied()
        .ok_or_else(|| AppError::invalid_argument(format!("Unsupported currency: {}", currency)))
}

fn validate_card_number(fields: &Map<String, Value>) -> AppResult<String> {
    let card_number = fields
        .get("card_number")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::invalid_argument("card_number is required"))?;

    let digits_only = card_number.chars().all(|c| c.is_ascii_digit());
    if !digits_only || card_number.len() < 14 || card_number.len() > 19 {
        return Err(AppError::invalid_argument(
            "card_number must be 14 to 19 digits",
        ));
    }
    Ok(card_number.to_string())
}

fn validate_cvv(fields: &Map<String, Value>) -> AppResult<String> {
    let cvv = fields
        .get("cvv")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::invalid_argument("cvv is required"))?;

    let digits_only = cvv.chars().all(|c| c.is_ascii_digit());
    if !digits_only || cvv.len() < 3 || cvv.len() > 4 {
        return Err(AppError::invalid_argument("cvv must be 3 or 4 digits"));
    }
    Ok(cvv.to_string())
}

fn validate_expiry(fields: &Map<String, Value>) -> AppResult<(u32, u32)> {
    let month = parse_numeric_field(fields, "expiry_month")
        .ok_or_else(|| AppError::invalid_argument("expiry_month is required"))?;
    let year = parse_numeric_field(fields, "expiry_year")
        .ok_or_else(|| AppError::invalid_argument("expiry_year is required"))?;

    if !(1..=12).contains(&month) {
        return Err(AppError::invalid_argument("expiry_month must be 1-12"));
    }

    let now = chrono::Utc::now();
    let (current_year, current_month) = (now.year() as u32, now.month());
    if year < current_year || (year == current_year && month < current_month) {
        return Err(AppError::invalid_argument("card has expired"));
    }

    Ok((month, year))
}

/// Accepts both integer-valued and numeric-string JSON forms; anything
/// else (e.g. `"abc"`, a float) fails validation.
fn parse_numeric_field(fields: &Map<String, Value>, key: &str) -> Option<u32> {
    match fields.get(key)? {
        Value::Number(n) => n.as_u64().map(|v| v as u32),
        Value::String(s) => s.parse::<u32>().ok(),
        _ => None,
    }
}

fn mask_card_number(card_number: &str) -> String {
    let last4 = &card_number[card_number.len() - 4..];
    format!("**** **** **** {}", last4)
}

fn card_type(card_number: &str) -> &'static str {
    match card_number.chars().next() {
        Some('4') => "VISA",
        Some('5') => "MASTERCARD",
        _ => "UNKNOWN",
    }
}

fn classify(response: &crate::bank::BankResponse) -> (PaymentStatus, &'static str) {
    if response.indeterminate {
        return (PaymentStatus::PendingReconciliation, "Bank timeout");
    }
    match response.authorized {
        None => (PaymentStatus::PendingReconciliation, "Malformed bank response"),
        Some(true) => (PaymentStatus::Authorized, "Success"),
        Some(false) => (PaymentStatus::Declined, "Declined"),
    }
}
