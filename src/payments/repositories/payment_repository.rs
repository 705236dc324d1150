use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::payments::models::{AuditAction, Payment, PaymentAudit};
use crate::processors::PaymentStatus;

/// Outcome of a unique-keyed insert. Callers that cannot rely on true
/// serializable isolation alone detect `AlreadyExists` here and fall back
/// to the locked re-read replay path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Required operations of the payment store. All transactional methods
/// take an explicit `&mut Transaction` rather than hiding one behind a
/// lazily-injected self-reference, so the replay read's transaction
/// boundary is visible at the call site.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn begin(&self) -> Result<Transaction<'static, MySql>>;

    async fn insert(&self, tx: &mut Transaction<'_, MySql>, payment: &Payment) -> Result<InsertOutcome>;

    async fn update(&self, tx: &mut Transaction<'_, MySql>, payment: &Payment) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;

    async fn find_by_idempotency_key(
        &self,
        tx: &mut Transaction<'_, MySql>,
        key: &str,
    ) -> Result<Option<Payment>>;

    async fn find_and_lock_by_idempotency_key(
        &self,
        tx: &mut Transaction<'_, MySql>,
        key: &str,
    ) -> Result<Option<Payment>>;

    /// Appends an audit row within the caller's transaction.
    async fn insert_audit(&self, tx: &mut Transaction<'_, MySql>, audit: &PaymentAudit) -> Result<()>;

    /// Appends an audit row in its own, immediately-committed transaction.
    /// Used for `REQUEST_RECEIVED`, written before the payment row exists
    /// and before the enclosing `handle_payment` transaction begins.
    async fn insert_audit_standalone(&self, audit: &PaymentAudit) -> Result<()>;
}

pub struct MySqlPaymentStore {
    pool: MySqlPool,
}

impl MySqlPaymentStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for MySqlPaymentStore {
    async fn begin(&self) -> Result<Transaction<'static, MySql>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("failed to start transaction: {}", e)))
    }

    async fn insert(&self, tx: &mut Transaction<'_, MySql>, payment: &Payment) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (id, amount, currency, status, idempotency_key, details, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.status)
        .bind(&payment.idempotency_key)
        .bind(payment.details.as_ref().map(sqlx::types::Json))
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut **tx)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return Ok(InsertOutcome::AlreadyExists);
                    }
                }
                Err(AppError::Database(e))
            }
        }
    }

    async fn update(&self, tx: &mut Transaction<'_, MySql>, payment: &Payment) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = ?, details = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(payment.status)
        .bind(payment.details.as_ref().map(sqlx::types::Json))
        .bind(payment.updated_at)
        .bind(payment.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::consistency(format!(
                "update affected no rows for payment {}",
                payment.id
            )));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, amount, currency, status, idempotency_key, details, created_at, updated_at
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(PaymentRow::into_payment).transpose()
    }

    async fn find_by_idempotency_key(
        &self,
        tx: &mut Transaction<'_, MySql>,
        key: &str,
    ) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, amount, currency, status, idempotency_key, details, created_at, updated_at
            FROM payments
            WHERE idempotency_key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::Database)?;

        row.map(PaymentRow::into_payment).transpose()
    }

    async fn find_and_lock_by_idempotency_key(
        &self,
        tx: &mut Transaction<'_, MySql>,
        key: &str,
    ) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, amount, currency, status, idempotency_key, details, created_at, updated_at
            FROM payments
            WHERE idempotency_key = ?
            FOR UPDATE
            "#,
        )
        .bind(key)
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::Database)?;

        row.map(PaymentRow::into_payment).transpose()
    }

    async fn insert_audit(&self, tx: &mut Transaction<'_, MySql>, audit: &PaymentAudit) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_audit_logs (payment_id, idempotency_key, action, payload, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(audit.payment_id.map(|id| id.to_string()))
        .bind(&audit.idempotency_key)
        .bind(audit.action)
        .bind(&audit.payload)
        .bind(audit.timestamp)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Database)?;
        Ok(())
    }

    async fn insert_audit_standalone(&self, audit: &PaymentAudit) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_audit_logs (payment_id, idempotency_key, action, payload, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(audit.payment_id.map(|id| id.to_string()))
        .bind(&audit.idempotency_key)
        .bind(audit.action)
        .bind(&audit.payload)
        .bind(audit.timestamp)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: String,
    amount: i64,
    currency: String,
    status: PaymentStatus,
    idempotency_key: String,
    details: Option<sqlx::types::Json<serde_json::Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| AppError::Internal(format!("invalid payment id in database: {}", e)))?;

        Ok(Payment {
            id,
            amount: self.amount,
            currency: self.currency,
            status: self.status,
            idempotency_key: self.idempotency_key,
            details: self.details.map(|json| json.0),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
