pub mod error;

pub use error::{AppError, AppResult};

// Kept alongside `AppResult` for call sites that prefer the bare alias
// (matches the error module's own naming).
pub use error::Result;
