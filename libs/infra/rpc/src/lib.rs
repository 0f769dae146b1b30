//! JSON-RPC client for the upstream EVM node: low-level transport
//! ([`RpcClient`]) plus the per-block assembly protocol ([`Fetcher`]) that
//! pairs `eth_getBlockByNumber` with `eth_getBlockReceipts` under the
//! shared rate limiter.

mod client;
mod errors;
mod fetcher;
mod hex;
mod types;

pub use client::RpcClient;
pub use errors::RpcError;
pub use fetcher::Fetcher;
