use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paytrust::bank::HttpBankClient;
use paytrust::config::Config;
use paytrust::middleware::{
    ErrorHandler, InMemoryRateLimiter, MetricsCollector, MetricsMiddleware, RateLimitMiddleware,
    RateLimiter, RequestId,
};
use paytrust::payments::controllers::configure as configure_payment_routes;
use paytrust::payments::{MySqlPaymentStore, PaymentService, PaymentStore};
use paytrust::processors::{CardProcessor, ProcessorRegistry};

/// Requests per minute allowed process-wide by the rate limiter.
const RATE_LIMIT_PER_MINUTE: u32 = 1_000;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paytrust=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting PayTrust payment gateway");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let bank_client = Arc::new(HttpBankClient::new(&config.bank));
    let card_processor = Arc::new(CardProcessor::new(bank_client));
    let registry = ProcessorRegistry::new(vec![card_processor]);
    let store: Arc<dyn PaymentStore> = Arc::new(MySqlPaymentStore::new(db_pool));
    let payment_service = web::Data::new(PaymentService::new(store, registry));

    let metrics_collector = MetricsCollector::new();
    let rate_limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::new(RATE_LIMIT_PER_MINUTE));

    let bind_address = config.server.bind_address();
    let workers = config.server.workers;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(payment_service.clone())
            .wrap(RequestId)
            .wrap(ErrorHandler)
            .wrap(MetricsMiddleware::new(metrics_collector.clone()))
            .wrap(RateLimitMiddleware::new(rate_limiter.clone()))
            .wrap(Cors::permissive())
            .route("/health", web::get().to(health_check))
            .route("/", web::get().to(index))
            .configure(configure_payment_routes)
    })
    .workers(workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "paytrust"
    }))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "PayTrust Payment Gateway",
        "version": "0.1.0",
        "status": "running"
    }))
}
