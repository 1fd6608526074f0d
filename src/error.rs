use thiserror::Error;

/// Sensor capability errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    #[error("{0} sensor is not available on this device")]
    CapabilityUnavailable(String),

    #[error("{sensor} subscription failed: {reason}")]
    SubscriptionFailed { sensor: String, reason: String },
}

/// Durable key-value store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Write rejected for key {0}")]
    WriteRejected(String),
}

/// Sampling configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type SensorResult<T> = Result<T, SensorError>;
pub type StoreResult<T> = Result<T, StoreError>;
