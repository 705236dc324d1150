// Local HTTP stand-in for the bank simulator. The real bank simulator is
// an external collaborator and out of scope; these helpers let
// integration tests drive every row of the classification table,
// including failures that exercise retry and circuit-breaker behavior,
// without depending on anything outside this process.

use actix_web::{web, App, HttpResponse};
use serde_json::Value;

pub use actix_test::TestServer;

/// Spawns an endpoint that answers every request with the same canned body.
pub async fn spawn_bank_simulator(response: Value) -> TestServer {
    actix_test::start(move || {
        let response = response.clone();
        App::new().default_service(web::route().to(move || {
            let response = response.clone();
            async move { HttpResponse::Ok().json(response) }
        }))
    })
}

/// Spawns an endpoint that always answers 503, to exercise the bank
/// client's retry exhaustion and circuit breaker.
pub async fn spawn_failing_bank_simulator() -> TestServer {
    actix_test::start(|| {
        App::new()
            .default_service(web::route().to(|| async { HttpResponse::ServiceUnavailable().finish() }))
    })
}
