pub mod audit;
pub mod payment;

pub use audit::{AuditAction, PaymentAudit};
pub use payment::Payment;
