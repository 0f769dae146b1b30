use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Queue(#[from] chainidx_queue::QueueError),

    #[error(transparent)]
    Rpc(#[from] chainidx_rpc::RpcError),

    #[error(transparent)]
    Store(#[from] chainidx_store::StoreError),

    #[error(transparent)]
    Coordination(#[from] chainidx_coordination::CoordinationError),
}
