pub mod card_processor;
pub mod registry;
pub mod traits;

pub use card_processor::CardProcessor;
pub use registry::ProcessorRegistry;
pub use traits::{PaymentProcessor, PaymentRequest, PaymentResponse, PaymentStatus, ProcessorOutcome};
