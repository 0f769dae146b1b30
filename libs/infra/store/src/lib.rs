//! Idempotent, chunked bulk-write repository against the Postgres-backed
//! blocks/transactions/logs schema, with the deliberate not-null-violation
//! trick used to surface reorgs as a distinguishable error.

mod client;
mod errors;
mod repository;

pub use client::StoreClient;
pub use errors::StoreError;
pub use repository::BlockRepository;
