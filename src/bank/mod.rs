pub mod circuit_breaker;
pub mod client;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use client::{BankClient, BankRequest, BankResponse, HttpBankClient};
