// Payments module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{AuditAction, Payment, PaymentAudit};
pub use repositories::{InsertOutcome, MySqlPaymentStore, PaymentStore};
pub use services::PaymentService;
