use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bank::circuit_breaker::CircuitBreaker;
use crate::config::BankClientConfig;

/// Open map sent to the bank simulator. `amount`, `currency`, `card_number`,
/// `expiry_date` (`MM/YYYY`), and `cvv` are the fields this service writes;
/// additional keys set via `extra` travel through unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct BankRequest {
    pub amount: i64,
    pub currency: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BankRequest {
    pub fn new(
        amount: i64,
        currency: impl Into<String>,
        card_number: impl Into<String>,
        expiry_date: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            currency: currency.into(),
            card_number: card_number.into(),
            expiry_date: expiry_date.into(),
            cvv: cvv.into(),
            extra: Map::new(),
        }
    }
}

/// Open map returned by the bank simulator. Only `authorized`,
/// `indeterminate`, `authorization_code`, and `error_message` are consumed
/// by this service; any other keys the bank sends are preserved in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankResponse {
    pub authorized: Option<bool>,
    #[serde(default)]
    pub indeterminate: bool,
    pub authorization_code: Option<String>,
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BankResponse {
    /// Synthesized when retries are exhausted or the circuit is open.
    /// Never raised as an error to the caller.
    pub fn fallback(cause: impl Into<String>) -> Self {
        Self {
            authorized: Some(false),
            indeterminate: true,
            authorization_code: None,
            error_message: Some(cause.into()),
            extra: Map::new(),
        }
    }
}

#[async_trait]
pub trait BankClient: Send + Sync {
    async fn process_bank_payment(&self, request: BankRequest) -> BankResponse;
}

/// `reqwest`-backed bank client with bounded retries and a circuit breaker.
/// Never propagates an error to its caller: every failure mode collapses
/// into [`BankResponse::fallback`].
pub struct HttpBankClient {
    http: ClientWithMiddleware,
    endpoint: String,
    breaker: Arc<CircuitBreaker>,
}

impl HttpBankClient {
    pub fn new(config: &BankClientConfig) -> Self {
        let inner = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .expect("failed to build bank HTTP client");

        let retry_policy = ExponentialBackoff::builder()
            .build_with_max_retries(config.retry_attempts.saturating_sub(1));

        let http = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            http,
            endpoint: config.simulator_url.clone(),
            breaker: Arc::new(CircuitBreaker::new(
                config.breaker_failure_threshold,
                config.breaker_open_timeout,
            )),
        }
    }

    #[cfg(test)]
    pub fn with_client(http: ClientWithMiddleware, endpoint: String, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            http,
            endpoint,
            breaker,
        }
    }
}

#[async_trait]
impl BankClient for HttpBankClient {
    async fn process_bank_payment(&self, request: BankRequest) -> BankResponse {
        if !self.breaker.allow_request() {
            tracing::warn!("bank circuit open, short-circuiting to fallback");
            return BankResponse::fallback("Circuit breaker open");
        }

        let result = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<BankResponse>().await {
                    Ok(parsed) => {
                        self.breaker.record_success();
                        parsed
                    }
                    Err(err) => {
                        // Malformed body counts as a bank-side failure for breaker
                        // purposes, but is not transport indeterminacy — the caller
                        // classifies a response with no `authorized` field itself.
                        self.breaker.record_success();
                        tracing::warn!(error = %err, "bank response failed to parse");
                        BankResponse::default()
                    }
                }
            }
            Ok(response) => {
                self.breaker.record_failure();
                let status = response.status();
                tracing::warn!(%status, "bank simulator returned an error status");
                BankResponse::fallback(format!("Bank simulator returned {}", status))
            }
            Err(err) => {
                self.breaker.record_failure();
                tracing::warn!(error = %err, "bank simulator call failed after retries");
                BankResponse::fallback(format!("Bank simulator unreachable: {}", err))
            }
        }
    }
}
