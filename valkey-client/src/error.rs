pub type ValkeyResult<T> = Result<T, ValkeyError>;

#[derive(Debug, thiserror::Error)]
pub enum ValkeyError {
    #[error("Valkey command error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
