use chainidx_coordination::CoordinationError;
use chainidx_models::RangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Coordination(#[from] CoordinationError),

    #[error("corrupt range payload in coordination store: {0}")]
    CorruptPayload(#[from] RangeError),
}
