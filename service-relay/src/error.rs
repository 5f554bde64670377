use valkey_client::error::ValkeyError;

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Durable log error: {0}")]
    Valkey(#[from] ValkeyError),
    #[error("Malformed message: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] axum::Error),
    #[error("Send timed out")]
    SendTimeout,
    #[error("Durable log append timed out")]
    PersistTimeout,
    #[error("Broadcast router is not running")]
    RouterClosed,
    #[error("Connection closed by peer")]
    PeerClosed,
}
