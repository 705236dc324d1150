use std::sync::Arc;

use crate::core::error::{AppError, AppResult};
use crate::processors::traits::PaymentProcessor;

/// Ordered collection of processors; selects the first whose `supports`
/// matches the declared payment type.
#[derive(Clone)]
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn PaymentProcessor>>,
}

impl ProcessorRegistry {
    pub fn new(processors: Vec<Arc<dyn PaymentProcessor>>) -> Self {
        Self { processors }
    }

    pub fn select(&self, payment_type: &str) -> AppResult<Arc<dyn PaymentProcessor>> {
        self.processors
            .iter()
            .find(|p| p.supports(payment_type))
            .cloned()
            .ok_or_else(|| {
                AppError::invalid_argument(format!("Unsupported payment type: {}", payment_type))
            })
    }
}
