use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::instrument;

use crate::errors::RpcError;
use crate::types::{JsonRpcRequest, JsonRpcResponse};

/// Thin JSON-RPC 2.0 transport. Carries no rate-limiting or retry logic of
/// its own — both live in [`crate::fetcher::Fetcher`], which is the only
/// thing that should instantiate token budgets and attempt counters.
pub struct RpcClient {
    http: Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("failed to build reqwest client");
        Self { http, url: url.into(), next_id: AtomicU64::new(1) }
    }

    #[instrument(skip(self, params))]
    pub async fn call<T: DeserializeOwned>(&self, method: &'static str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, id);
        let response: JsonRpcResponse<T> = self.http.post(&self.url).json(&request).send().await?.json().await?;

        if let Some(error) = response.error {
            return Err(RpcError::Node { code: error.code, message: error.message });
        }
        response.result.ok_or_else(|| RpcError::Node {
            code: 0,
            message: format!("{method} returned neither result nor error"),
        })
    }

    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let hex: String = self.call("eth_blockNumber", json!([])).await?;
        crate::hex::to_u64(&hex)
    }
}
