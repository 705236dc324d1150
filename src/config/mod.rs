pub mod app;
pub mod bank;
pub mod database;
pub mod server;

use anyhow::Result;
use dotenvy::dotenv;

pub use app::AppConfig;
pub use bank::BankClientConfig;
pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Application configuration assembled from environment variables at startup.
///
/// One sub-config per external collaborator: process environment, HTTP
/// server, database, bank simulator.
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub bank: BankClientConfig,
}

impl Config {
    /// Load configuration from environment variables, falling back to a
    /// local `.env` file if present. Fails fast on missing or malformed
    /// required values rather than panicking deep inside request handling.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            app: AppConfig::from_env()?,
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            bank: BankClientConfig::from_env()?,
        })
    }

    /// Sanity-check values that can't be validated purely by parsing
    /// (e.g. ranges, non-empty strings).
    pub fn validate(&self) -> Result<()> {
        if self.bank.simulator_url.is_empty() {
            anyhow::bail!("bank.simulator.url must not be empty");
        }
        if self.bank.retry_attempts == 0 {
            anyhow::bail!("bank.simulator retry attempts must be at least 1");
        }
        if self.bank.breaker_failure_threshold == 0 {
            anyhow::bail!("bank.simulator breaker failure threshold must be at least 1");
        }
        Ok(())
    }
}
