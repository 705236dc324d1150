use anyhow::Result;
use std::env;
use std::time::Duration;

/// Configuration for the bank simulator client and its resilience policy.
#[derive(Debug, Clone)]
pub struct BankClientConfig {
    pub simulator_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub retry_attempts: u32,
    pub breaker_failure_threshold: u32,
    pub breaker_open_timeout: Duration,
}

impl BankClientConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            simulator_url: env::var("BANK_SIMULATOR_URL")
                .unwrap_or_else(|_| "http://localhost:9090".to_string()),
            connect_timeout: Duration::from_millis(env_ms(
                "BANK_SIMULATOR_CONNECT_TIMEOUT_MS",
                2_000,
            )?),
            read_timeout: Duration::from_millis(env_ms(
                "BANK_SIMULATOR_READ_TIMEOUT_MS",
                5_000,
            )?),
            retry_attempts: env_u32("BANK_SIMULATOR_RETRY_ATTEMPTS", 3)?,
            breaker_failure_threshold: env_u32("BANK_SIMULATOR_BREAKER_FAILURE_THRESHOLD", 5)?,
            breaker_open_timeout: Duration::from_millis(env_ms(
                "BANK_SIMULATOR_BREAKER_OPEN_TIMEOUT_MS",
                30_000,
            )?),
        })
    }
}

fn env_ms(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number of milliseconds", key)),
        Err(_) => Ok(default),
    }
}

fn env_u32(key: &str, default: u32) -> Result<u32> {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}
