// Fixtures for building CARD payment request bodies and idempotency keys.
// Uses UUIDs so concurrent test runs never collide on a shared key.

use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

pub struct TestDataFactory;

impl TestDataFactory {
    /// Unique idempotency key, one per logical payment under test.
    pub fn random_idempotency_key() -> String {
        format!("TEST-{}", Uuid::new_v4())
    }

    /// A valid CARD payment body that authorizes against
    /// [`TestFixtures::VISA_SUCCESS`].
    pub fn valid_card_payment() -> Value {
        Self::card_payment_with(TestFixtures::VISA_SUCCESS, 1000, "USD")
    }

    /// A CARD payment body with a caller-chosen card number, amount, and
    /// currency; expiry is always five years out so it never goes stale.
    pub fn card_payment_with(card_number: &str, amount: i64, currency: &str) -> Value {
        let expiry_year = Utc::now().year() as u32 + 5;
        json!({
            "amount": amount,
            "currency": currency,
            "type": "CARD",
            "card_number": card_number,
            "cvv": "123",
            "expiry_month": 12,
            "expiry_year": expiry_year,
        })
    }

    /// A CARD payment body that fails field-level validation (card number
    /// too short) — exercises the `400 REJECTED` path.
    pub fn invalid_card_payment() -> Value {
        json!({
            "amount": 1000,
            "currency": "USD",
            "type": "CARD",
            "card_number": "123",
            "cvv": "123",
            "expiry_month": 12,
            "expiry_year": Utc::now().year() as u32 + 5,
        })
    }
}

/// Test card numbers and bank-simulator responses for each row of the
/// classification table.
pub struct TestFixtures;

impl TestFixtures {
    /// VISA PAN, authorizes in the local bank simulator stand-in.
    pub const VISA_SUCCESS: &'static str = "4234567890123456";

    /// MASTERCARD PAN, declines in the local bank simulator stand-in.
    pub const MASTERCARD_DECLINE: &'static str = "5234567890123456";

    pub fn bank_authorized() -> Value {
        json!({"authorized": true, "authorization_code": "auth-4cfc3a33"})
    }

    pub fn bank_declined() -> Value {
        json!({"authorized": false})
    }

    pub fn bank_malformed() -> Value {
        json!({})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotency_keys_are_unique() {
        assert_ne!(
            TestDataFactory::random_idempotency_key(),
            TestDataFactory::random_idempotency_key()
        );
    }

    #[test]
    fn valid_card_payment_has_expected_shape() {
        let body = TestDataFactory::valid_card_payment();
        assert_eq!(body["type"], "CARD");
        assert_eq!(body["card_number"], TestFixtures::VISA_SUCCESS);
        assert_eq!(body["currency"], "USD");
    }

    #[test]
    fn invalid_card_payment_has_a_short_card_number() {
        let body = TestDataFactory::invalid_card_payment();
        assert_eq!(body["card_number"], "123");
    }
}
