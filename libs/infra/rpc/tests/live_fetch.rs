//! Exercises the full `Fetcher::fetch` path against a mocked RPC endpoint
//! and a live coordination store (for the rate limiter). Requires
//! `REDIS_URL`; skipped otherwise.
//!
//! Run with: `REDIS_URL=redis://127.0.0.1 cargo test -p chainidx-rpc -- --ignored`

use std::sync::Arc;
use std::time::Duration;

use chainidx_coordination::CoordinationStore;
use chainidx_rpc::{Fetcher, RpcClient};
use chainidx_ratelimit::RateLimiter;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
#[ignore]
async fn fetches_and_assembles_a_full_block() {
    let Ok(redis_url) = std::env::var("REDIS_URL") else { return };
    let store = CoordinationStore::connect(&redis_url).await.unwrap();
    store.delete("test:ratelimit:fetch").await.unwrap();
    let limiter = Arc::new(RateLimiter::new(store, "test:ratelimit:fetch", 100, Duration::from_secs(1)));

    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_getBlockByNumber"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "number": "0x64",
                "hash": "0xblockhash",
                "parentHash": "0xparenthash",
                "timestamp": "0x5f5e100",
                "miner": "0xminer",
                "gasUsed": "0x5208",
                "gasLimit": "0x1c9c380",
                "baseFeePerGas": "0x3b9aca00",
                "transactions": [{
                    "hash": "0xtx1",
                    "blockNumber": "0x64",
                    "transactionIndex": "0x0",
                    "from": "0xfrom",
                    "to": "0xto",
                    "value": "0xde0b6b3a7640000",
                    "gas": "0x5208",
                    "gasPrice": "0x3b9aca00",
                    "nonce": "0x7",
                    "input": "0x"
                }]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"method": "eth_getBlockReceipts"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "result": [{
                "transactionHash": "0xtx1",
                "status": "0x1",
                "cumulativeGasUsed": "0x5208",
                "effectiveGasPrice": "0x3b9aca00",
                "logs": []
            }]
        })))
        .mount(&server)
        .await;

    let client = RpcClient::new(server.uri(), Duration::from_secs(5));
    let fetcher = Fetcher::new(client, limiter, 3);

    let bundle = fetcher.fetch(100).await.unwrap();
    let block = bundle.block.unwrap();
    assert_eq!(block.number, 100);
    assert_eq!(bundle.transactions.len(), 1);
}
