use thiserror::Error;

/// Every RPC failure is treated as transient by the Fetcher; only the
/// Worker Loop decides that exhausted retries constitute a range failure.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed RPC response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed hex value: {0}")]
    Malformed(String),

    #[error("node returned error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("node omitted block {height} from its response")]
    MissingBlock { height: u64 },

    #[error("node returned a transaction with no matching receipt: {hash}")]
    MissingReceipt { hash: String },

    #[error("rate limiter unavailable: {0}")]
    RateLimit(#[from] chainidx_ratelimit::RateLimitError),

    #[error("exhausted {attempts} attempts fetching block {height}: {source}")]
    RetriesExhausted {
        height: u64,
        attempts: u32,
        #[source]
        source: Box<RpcError>,
    },
}
