use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Alias used throughout the rest of the crate alongside [`Result`].
pub type AppResult<T> = Result<T>;

/// Main application error type, covering both the payment domain's error
/// taxonomy and the ambient infrastructure concerns around it.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Schema / field-level validation failure (amount, currency, card,
    /// CVV, expiry, unsupported payment type).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A lookup (e.g. `get_payment_by_id`) found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The replay path failed to locate the row it just observed under
    /// lock. Indicates a real bug or data corruption, not expected in
    /// normal operation.
    #[error("Consistency error: {0}")]
    ConsistencyError(String),

    /// Resource state conflict (e.g. concurrent modifications).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation errors.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP client errors talking to the bank simulator.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors not covered above.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        // Client errors get their message verbatim; server errors are
        // sanitized so internal details never leak over the wire.
        let error_message = match self {
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Json(err) => format!("Invalid JSON: {}", err),

            AppError::ConsistencyError(_) => "An unexpected error occurred".to_string(),
            AppError::Database(_) => "An unexpected error occurred".to_string(),
            AppError::Configuration(_) => "An unexpected error occurred".to_string(),
            AppError::HttpClient(_) => "An unexpected error occurred".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
        };

        // Log full error for debugging regardless of what the client sees.
        match self {
            AppError::ConsistencyError(e) => {
                tracing::error!(error = %e, "consistency error: replay path lost its own row");
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error occurred");
            }
            AppError::HttpClient(e) => {
                tracing::error!(error = %e, "bank client HTTP error occurred");
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error occurred");
            }
            _ => {}
        }

        let body = match self {
            AppError::NotFound(_) => serde_json::json!({
                "error": "NOT_FOUND",
                "message": error_message,
            }),
            AppError::InvalidArgument(_) | AppError::Json(_) => serde_json::json!({
                "error": "BAD_REQUEST",
                "message": error_message,
            }),
            AppError::Conflict(_) => serde_json::json!({
                "error": "CONFLICT",
                "message": error_message,
            }),
            AppError::ConsistencyError(_)
            | AppError::Database(_)
            | AppError::Configuration(_)
            | AppError::HttpClient(_)
            | AppError::Internal(_) => serde_json::json!({
                "error": "SYSTEM_ERROR",
                "message": "An unexpected error occurred",
            }),
        };

        HttpResponse::build(status_code).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConsistencyError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper constructors for common error scenarios
impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn consistency(msg: impl Into<String>) -> Self {
        AppError::ConsistencyError(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
