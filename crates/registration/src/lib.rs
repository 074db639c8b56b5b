// Core modules
pub mod core;
pub mod handlers;
pub mod orchestrator;

pub mod events;
pub mod form_filler;
pub mod outcomes;
pub mod phone_pool;
pub mod stats;
pub mod validator;

// Re-exports for convenience
pub use self::core::types::*;
pub use self::core::context::*;
pub use self::core::result::*;
pub use events::*;
pub use handlers::*;
pub use orchestrator::*;
pub use outcomes::*;
pub use phone_pool::PhoneNumberPool;
pub use stats::RegistrationStats;
pub use validator::{RegistrationValidator, Validation};

use autoreg_core::ConfigError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error("No active phone numbers available")]
    NoActivePhoneNumbers,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<String>),

    #[error("{0}")]
    HandlerExecution(String),

    #[error("Invalid registration config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Unknown phone number: {0}")]
    UnknownPhoneNumber(String),

    #[error("Phone number already registered: {0}")]
    DuplicatePhoneNumber(String),

    #[error("Phone number must not be empty")]
    EmptyPhoneNumber,

    #[error("Registration run in progress")]
    RunInProgress,
}
