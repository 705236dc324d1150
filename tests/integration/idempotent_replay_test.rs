// The idempotent-replay contract and the concurrency property it's a
// special case of: N requests sharing an idempotency key must yield
// exactly one persisted `Payment` and identical `payment_id`/`status` in
// every response.
//
// Requires a reachable MySQL instance (TEST_DATABASE_URL / DATABASE_URL);
// run with `cargo test -- --ignored` once one is available.

#[path = "../helpers/mod.rs"]
mod helpers;

use futures_util::future::join_all;
use serde_json::Value;

use helpers::{assert_created, spawn_bank_simulator, spawn_payment_test_server, TestClient, TestDataFactory, TestFixtures};

#[actix_web::test]
#[ignore = "requires a reachable test database"]
async fn replaying_the_same_key_returns_the_same_outcome_without_a_second_audit() {
    let bank = spawn_bank_simulator(TestFixtures::bank_authorized()).await;
    let server = spawn_payment_test_server(bank.url("/authorize")).await;
    let client = TestClient::new(server.url(""));

    let key = TestDataFactory::random_idempotency_key();
    let body = TestDataFactory::valid_card_payment();

    let mut first = client.post_payment("/v1/payments/process", &key, &body).await;
    assert_created(&first);
    let first_payment: Value = first.json().await.unwrap();

    let mut second = client.post_payment("/v1/payments/process", &key, &body).await;
    assert_created(&second);
    let second_payment: Value = second.json().await.unwrap();

    assert_eq!(first_payment["payment_id"], second_payment["payment_id"]);
    assert_eq!(first_payment["status"], second_payment["status"]);
    assert_eq!(first_payment["message"], second_payment["message"]);

    let pool = helpers::create_test_pool().await;
    let process_completed_rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM payment_audit_logs WHERE idempotency_key = ? AND action = 'PROCESS_COMPLETED'",
    )
    .bind(&key)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(process_completed_rows, 1, "replay must not write a second PROCESS_COMPLETED audit");

    let payment_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE idempotency_key = ?")
        .bind(&key)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(payment_rows, 1, "exactly one Payment row must exist per idempotency key");
}

#[actix_web::test]
#[ignore = "requires a reachable test database"]
async fn concurrent_requests_with_the_same_key_converge_on_one_payment() {
    const CONCURRENCY: usize = 8;

    let bank = spawn_bank_simulator(TestFixtures::bank_authorized()).await;
    let server = spawn_payment_test_server(bank.url("/authorize")).await;
    let client = TestClient::new(server.url(""));

    let key = TestDataFactory::random_idempotency_key();
    let body = TestDataFactory::valid_card_payment();

    let requests = (0..CONCURRENCY).map(|_| client.post_payment("/v1/payments/process", &key, &body));
    let mut responses = join_all(requests).await;

    let mut payment_ids = Vec::with_capacity(CONCURRENCY);
    let mut statuses = Vec::with_capacity(CONCURRENCY);
    for response in &mut responses {
        assert_created(response);
        let payment: Value = response.json().await.unwrap();
        payment_ids.push(payment["payment_id"].as_str().unwrap().to_string());
        statuses.push(payment["status"].as_str().unwrap().to_string());
    }

    assert!(payment_ids.windows(2).all(|w| w[0] == w[1]), "all responses must share one payment_id");
    assert!(statuses.windows(2).all(|w| w[0] == w[1]), "all responses must share one final status");

    let pool = helpers::create_test_pool().await;
    let payment_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE idempotency_key = ?")
        .bind(&key)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(payment_rows, 1, "concurrent replays must not duplicate the Payment row");
}
