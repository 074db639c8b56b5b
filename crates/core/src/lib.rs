pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, EngineConfig, PhoneSelection, RegistrationConfig};
pub use error::ConfigError;
pub use types::*;
