// Test Server Helpers
//
// Spawns the real payment HTTP surface using actix-test, wired against a
// real test database and a real (local) bank simulator stand-in. No mocks
// for the service's own HTTP layer.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App};

pub use actix_test::TestServer;

use paytrust::bank::HttpBankClient;
use paytrust::config::BankClientConfig;
use paytrust::payments::controllers::configure as configure_payment_routes;
use paytrust::payments::{MySqlPaymentStore, PaymentService, PaymentStore};
use paytrust::processors::{CardProcessor, ProcessorRegistry};

use super::test_database::create_test_pool;

/// Spawn the real payment HTTP surface against a test database, with the
/// card processor's bank client pointed at `bank_simulator_url`.
///
/// # Behavior
/// - Runs pending migrations against the test database.
/// - Starts actix-web on a random available port via actix-test.
/// - Server stops automatically when the returned `TestServer` drops.
pub async fn spawn_payment_test_server(bank_simulator_url: String) -> TestServer {
    let pool = create_test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations against test database");

    let bank_config = BankClientConfig {
        simulator_url: bank_simulator_url,
        connect_timeout: Duration::from_millis(500),
        read_timeout: Duration::from_secs(2),
        retry_attempts: 2,
        breaker_failure_threshold: 5,
        breaker_open_timeout: Duration::from_secs(5),
    };

    actix_test::start(move || {
        let bank_client = Arc::new(HttpBankClient::new(&bank_config));
        let card_processor = Arc::new(CardProcessor::new(bank_client));
        let registry = ProcessorRegistry::new(vec![card_processor]);
        let store: Arc<dyn PaymentStore> = Arc::new(MySqlPaymentStore::new(pool.clone()));
        let service = web::Data::new(PaymentService::new(store, registry));

        App::new()
            .app_data(service)
            .configure(configure_payment_routes)
    })
}
