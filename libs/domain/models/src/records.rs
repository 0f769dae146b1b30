use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single block, flattened for insertion. 256-bit numeric fields are
/// carried as decimal strings end-to-end to avoid precision loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: DateTime<Utc>,
    pub miner: String,
    pub gas_used: String,
    pub gas_limit: String,
    pub base_fee_per_gas: Option<String>,
    pub transaction_count: u32,
}

/// A single transaction, owned by exactly one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub block_number: u64,
    pub transaction_index: u32,
    pub from_address: String,
    pub to_address: Option<String>,
    pub value: String,
    pub gas: String,
    pub gas_price: String,
    pub nonce: u64,
    pub input: String,
    pub status: Option<u8>,
    pub cumulative_gas_used: String,
    pub effective_gas_price: String,
}

/// A single log entry, owned by exactly one transaction. Topics are split
/// into four positional, independently-nullable columns rather than an
/// array, matching the fixed-width schema the store exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub transaction_hash: String,
    pub log_index: u32,
    pub block_number: u64,
    pub address: String,
    pub topic0: Option<String>,
    pub topic1: Option<String>,
    pub topic2: Option<String>,
    pub topic3: Option<String>,
    pub data: String,
}

/// The full set of records extracted for one block, as produced by the
/// Fetcher and consumed by the Worker Loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockBundle {
    pub block: Option<BlockRecord>,
    pub transactions: Vec<TransactionRecord>,
    pub logs: Vec<LogRecord>,
}

impl BlockBundle {
    pub fn new(block: BlockRecord, transactions: Vec<TransactionRecord>, logs: Vec<LogRecord>) -> Self {
        Self {
            block: Some(block),
            transactions,
            logs,
        }
    }

    /// Merges a sequence of per-block bundles (as produced by a fanned-out
    /// fetch over a range) into the three flat arrays the store expects.
    pub fn flatten(bundles: Vec<BlockBundle>) -> (Vec<BlockRecord>, Vec<TransactionRecord>, Vec<LogRecord>) {
        let mut blocks = Vec::with_capacity(bundles.len());
        let mut transactions = Vec::new();
        let mut logs = Vec::new();
        for bundle in bundles {
            if let Some(block) = bundle.block {
                blocks.push(block);
            }
            transactions.extend(bundle.transactions);
            logs.extend(bundle.logs);
        }
        (blocks, transactions, logs)
    }
}
