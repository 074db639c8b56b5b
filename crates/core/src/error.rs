use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("speed must be between {min} and {max} registrations per hour, got {got}")]
    SpeedOutOfRange { got: u32, min: u32, max: u32 },

    #[error("max_retries must be at least 1")]
    ZeroRetries,

    #[error("invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),

    #[error("start time {start} is after end time {end}; overnight windows are not supported")]
    InvertedWindow { start: String, end: String },

    #[error("config parse error: {0}")]
    Parse(String),
}
