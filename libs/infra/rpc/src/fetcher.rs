use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chainidx_models::{BlockBundle, BlockRecord, LogRecord, TransactionRecord};
use chainidx_ratelimit::RateLimiter;
use rand::Rng;
use serde_json::json;
use tracing::{instrument, warn};

use crate::client::RpcClient;
use crate::errors::RpcError;
use crate::hex;
use crate::types::{RawBlock, RawReceipt};

/// Fetches one block's worth of block/transaction/log records, acquiring
/// one rate-limit token per RPC call and retrying the whole call with
/// exponential backoff on any transient failure.
pub struct Fetcher {
    client: RpcClient,
    limiter: Arc<RateLimiter>,
    max_attempts: u32,
}

impl Fetcher {
    pub fn new(client: RpcClient, limiter: Arc<RateLimiter>, max_attempts: u32) -> Self {
        Self { client, limiter, max_attempts }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, height: u64) -> Result<BlockBundle, RpcError> {
        let mut last_error = None;
        for attempt in 0..self.max_attempts {
            match self.fetch_once(height).await {
                Ok(bundle) => return Ok(bundle),
                Err(err) => {
                    warn!(height, attempt, error = %err, "block fetch attempt failed");
                    last_error = Some(err);
                    if attempt + 1 < self.max_attempts {
                        let backoff_ms = 2u64.pow(attempt) * 500;
                        let jitter_ms = rand::thread_rng().gen_range(0..=500);
                        tokio::time::sleep(Duration::from_millis(backoff_ms + jitter_ms)).await;
                    }
                }
            }
        }
        Err(RpcError::RetriesExhausted {
            height,
            attempts: self.max_attempts,
            source: Box::new(last_error.expect("loop ran at least once")),
        })
    }

    async fn fetch_once(&self, height: u64) -> Result<BlockBundle, RpcError> {
        let hex_height = hex::to_hex_quantity(height);

        let block_fut = async {
            self.limiter.acquire().await?;
            self.client
                .call::<Option<RawBlock>>("eth_getBlockByNumber", json!([hex_height, true]))
                .await
        };
        let receipts_fut = async {
            self.limiter.acquire().await?;
            self.client
                .call::<Vec<RawReceipt>>("eth_getBlockReceipts", json!([hex_height]))
                .await
        };

        let (block, receipts) = tokio::try_join!(block_fut, receipts_fut)?;
        let block = block.ok_or(RpcError::MissingBlock { height })?;
        assemble(height, block, receipts)
    }
}

fn assemble(height: u64, block: RawBlock, receipts: Vec<RawReceipt>) -> Result<BlockBundle, RpcError> {
    let receipts_by_hash: HashMap<&str, &RawReceipt> =
        receipts.iter().map(|r| (r.transaction_hash.as_str(), r)).collect();

    let block_record = BlockRecord {
        number: height,
        hash: block.hash.clone(),
        parent_hash: block.parent_hash.clone(),
        timestamp: hex::to_timestamp(&block.timestamp)?,
        miner: block.miner.clone(),
        gas_used: hex::to_decimal_string(&block.gas_used)?,
        gas_limit: hex::to_decimal_string(&block.gas_limit)?,
        base_fee_per_gas: block.base_fee_per_gas.as_deref().map(hex::to_decimal_string).transpose()?,
        transaction_count: block.transactions.len() as u32,
    };

    let mut transaction_records = Vec::with_capacity(block.transactions.len());
    let mut log_records = Vec::new();

    for tx in &block.transactions {
        let receipt = receipts_by_hash
            .get(tx.hash.as_str())
            .ok_or_else(|| RpcError::MissingReceipt { hash: tx.hash.clone() })?;

        transaction_records.push(TransactionRecord {
            hash: tx.hash.clone(),
            block_number: height,
            transaction_index: hex::to_u64(&tx.transaction_index)? as u32,
            from_address: tx.from.clone(),
            to_address: tx.to.clone(),
            value: hex::to_decimal_string(&tx.value)?,
            gas: hex::to_decimal_string(&tx.gas)?,
            gas_price: hex::to_decimal_string(&tx.gas_price)?,
            nonce: hex::to_u64(&tx.nonce)?,
            input: tx.input.clone(),
            status: receipt.status.as_deref().map(hex::to_u64).transpose()?.map(|s| s as u8),
            cumulative_gas_used: hex::to_decimal_string(&receipt.cumulative_gas_used)?,
            effective_gas_price: match &receipt.effective_gas_price {
                Some(hex_value) => hex::to_decimal_string(hex_value)?,
                None => hex::to_decimal_string(&tx.gas_price)?,
            },
        });

        for log in &receipt.logs {
            log_records.push(LogRecord {
                transaction_hash: log.transaction_hash.clone(),
                log_index: hex::to_u64(&log.log_index)?,
                block_number: height,
                address: log.address.clone(),
                topic0: log.topics.first().cloned(),
                topic1: log.topics.get(1).cloned(),
                topic2: log.topics.get(2).cloned(),
                topic3: log.topics.get(3).cloned(),
                data: log.data.clone(),
            });
        }
    }

    Ok(BlockBundle { block: Some(block_record), transactions: transaction_records, logs: log_records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawLog, RawTransaction};

    fn sample_block() -> RawBlock {
        RawBlock {
            number: "0x64".into(),
            hash: "0xblockhash".into(),
            parent_hash: "0xparenthash".into(),
            timestamp: "0x5f5e100".into(),
            miner: "0xminer".into(),
            gas_used: "0x5208".into(),
            gas_limit: "0x1c9c380".into(),
            base_fee_per_gas: Some("0x3b9aca00".into()),
            transactions: vec![RawTransaction {
                hash: "0xtx1".into(),
                block_number: "0x64".into(),
                transaction_index: "0x0".into(),
                from: "0xfrom".into(),
                to: Some("0xto".into()),
                value: "0xde0b6b3a7640000".into(),
                gas: "0x5208".into(),
                gas_price: "0x3b9aca00".into(),
                nonce: "0x7".into(),
                input: "0x".into(),
            }],
        }
    }

    fn sample_receipt() -> RawReceipt {
        RawReceipt {
            transaction_hash: "0xtx1".into(),
            status: Some("0x1".into()),
            cumulative_gas_used: "0x5208".into(),
            effective_gas_price: Some("0x3b9aca00".into()),
            logs: vec![RawLog {
                address: "0xcontract".into(),
                topics: vec!["0xtopicA".into(), "0xtopicB".into()],
                data: "0xdata".into(),
                log_index: "0x0".into(),
                block_number: "0x64".into(),
                transaction_hash: "0xtx1".into(),
            }],
        }
    }

    #[test]
    fn assembles_block_with_matching_receipt() {
        let bundle = assemble(100, sample_block(), vec![sample_receipt()]).unwrap();
        let block = bundle.block.unwrap();
        assert_eq!(block.number, 100);
        assert_eq!(block.gas_used, "21000");
        assert_eq!(block.transaction_count, 1);

        assert_eq!(bundle.transactions.len(), 1);
        let tx = &bundle.transactions[0];
        assert_eq!(tx.nonce, 7);
        assert_eq!(tx.value, "1000000000000000000");
        assert_eq!(tx.status, Some(1));

        assert_eq!(bundle.logs.len(), 1);
        let log = &bundle.logs[0];
        assert_eq!(log.topic0.as_deref(), Some("0xtopicA"));
        assert_eq!(log.topic1.as_deref(), Some("0xtopicB"));
        assert_eq!(log.topic2, None);
        assert_eq!(log.topic3, None);
    }

    #[test]
    fn missing_receipt_for_a_transaction_is_a_hard_error() {
        let err = assemble(100, sample_block(), vec![]).unwrap_err();
        assert!(matches!(err, RpcError::MissingReceipt { .. }));
    }
}
