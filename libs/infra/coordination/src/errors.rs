use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("coordination store connection failed: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("coordination store URL is empty or malformed")]
    InvalidUrl,
}
