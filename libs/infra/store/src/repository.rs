use chainidx_models::{BlockRecord, LogRecord, TransactionRecord};
use sqlx::{Postgres, Transaction};
use tracing::{instrument, warn};

use crate::client::StoreClient;
use crate::errors::{classify, StoreError};

/// Bulk-insert batches are capped at this many rows so a single statement
/// never approaches Postgres's parameter-count limits.
const MAX_CHUNK_ROWS: usize = 1000;

pub struct BlockRepository {
    client: StoreClient,
}

impl BlockRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Persists one range's worth of records atomically. Idempotent: a
    /// second call with identical records leaves the store unchanged,
    /// except for blocks whose conflicting hash trips the reorg sentinel.
    #[instrument(skip(self, blocks, transactions, logs), fields(blocks = blocks.len(), transactions = transactions.len(), logs = logs.len()))]
    pub async fn save(
        &self,
        blocks: &[BlockRecord],
        transactions: &[TransactionRecord],
        logs: &[LogRecord],
    ) -> Result<(), StoreError> {
        let mut tx = self.client.pool().begin().await.map_err(StoreError::Other)?;

        if let Err(err) = Self::insert_all(&mut tx, blocks, transactions, logs).await {
            warn!(error = %err, "store write failed, rolling back");
            let _ = tx.rollback().await;
            return Err(err);
        }

        tx.commit().await.map_err(StoreError::Other)?;
        Ok(())
    }

    async fn insert_all(
        tx: &mut Transaction<'_, Postgres>,
        blocks: &[BlockRecord],
        transactions: &[TransactionRecord],
        logs: &[LogRecord],
    ) -> Result<(), StoreError> {
        for chunk in blocks.chunks(MAX_CHUNK_ROWS) {
            insert_blocks_chunk(tx, chunk).await?;
        }
        for chunk in transactions.chunks(MAX_CHUNK_ROWS) {
            insert_transactions_chunk(tx, chunk).await?;
        }
        for chunk in logs.chunks(MAX_CHUNK_ROWS) {
            insert_logs_chunk(tx, chunk).await?;
        }
        Ok(())
    }
}

async fn insert_blocks_chunk(tx: &mut Transaction<'_, Postgres>, chunk: &[BlockRecord]) -> Result<(), StoreError> {
    if chunk.is_empty() {
        return Ok(());
    }
    let numbers: Vec<String> = chunk.iter().map(|b| b.number.to_string()).collect();
    let hashes: Vec<&str> = chunk.iter().map(|b| b.hash.as_str()).collect();
    let parent_hashes: Vec<&str> = chunk.iter().map(|b| b.parent_hash.as_str()).collect();
    let timestamps: Vec<chrono::DateTime<chrono::Utc>> = chunk.iter().map(|b| b.timestamp).collect();
    let miners: Vec<&str> = chunk.iter().map(|b| b.miner.as_str()).collect();
    let gas_used: Vec<&str> = chunk.iter().map(|b| b.gas_used.as_str()).collect();
    let gas_limit: Vec<&str> = chunk.iter().map(|b| b.gas_limit.as_str()).collect();
    let base_fee: Vec<Option<&str>> = chunk.iter().map(|b| b.base_fee_per_gas.as_deref()).collect();
    let tx_counts: Vec<i32> = chunk.iter().map(|b| b.transaction_count as i32).collect();

    sqlx::query(
        r#"
        INSERT INTO blocks (number, hash, parent_hash, "timestamp", miner, gas_used, gas_limit, base_fee_per_gas, transaction_count)
        SELECT * FROM UNNEST(
            $1::text[]::numeric[], $2::text[], $3::text[], $4::timestamptz[], $5::text[],
            $6::text[]::numeric[], $7::text[]::numeric[], $8::text[]::numeric[], $9::int[]
        )
        ON CONFLICT (number) DO UPDATE SET
            reorg_sentinel = CASE WHEN blocks.hash = excluded.hash THEN TRUE ELSE NULL END
        "#,
    )
    .bind(&numbers)
    .bind(&hashes)
    .bind(&parent_hashes)
    .bind(&timestamps)
    .bind(&miners)
    .bind(&gas_used)
    .bind(&gas_limit)
    .bind(&base_fee)
    .bind(&tx_counts)
    .execute(&mut **tx)
    .await
    .map_err(classify)?;

    Ok(())
}

async fn insert_transactions_chunk(
    tx: &mut Transaction<'_, Postgres>,
    chunk: &[TransactionRecord],
) -> Result<(), StoreError> {
    if chunk.is_empty() {
        return Ok(());
    }
    let hashes: Vec<&str> = chunk.iter().map(|t| t.hash.as_str()).collect();
    let block_numbers: Vec<String> = chunk.iter().map(|t| t.block_number.to_string()).collect();
    let indices: Vec<i32> = chunk.iter().map(|t| t.transaction_index as i32).collect();
    let from_addresses: Vec<&str> = chunk.iter().map(|t| t.from_address.as_str()).collect();
    let to_addresses: Vec<Option<&str>> = chunk.iter().map(|t| t.to_address.as_deref()).collect();
    let values: Vec<&str> = chunk.iter().map(|t| t.value.as_str()).collect();
    let gas: Vec<&str> = chunk.iter().map(|t| t.gas.as_str()).collect();
    let gas_price: Vec<&str> = chunk.iter().map(|t| t.gas_price.as_str()).collect();
    let nonces: Vec<String> = chunk.iter().map(|t| t.nonce.to_string()).collect();
    let inputs: Vec<&str> = chunk.iter().map(|t| t.input.as_str()).collect();
    let statuses: Vec<Option<i16>> = chunk.iter().map(|t| t.status.map(|s| s as i16)).collect();
    let cumulative_gas_used: Vec<&str> = chunk.iter().map(|t| t.cumulative_gas_used.as_str()).collect();
    let effective_gas_price: Vec<&str> = chunk.iter().map(|t| t.effective_gas_price.as_str()).collect();

    sqlx::query(
        r#"
        INSERT INTO transactions (
            hash, block_number, transaction_index, from_address, to_address,
            value, gas, gas_price, nonce, input, status, cumulative_gas_used, effective_gas_price
        )
        SELECT * FROM UNNEST(
            $1::text[], $2::text[]::numeric[], $3::int[], $4::text[], $5::text[],
            $6::text[]::numeric[], $7::text[]::numeric[], $8::text[]::numeric[], $9::text[]::numeric[],
            $10::text[], $11::smallint[], $12::text[]::numeric[], $13::text[]::numeric[]
        )
        ON CONFLICT (hash) DO NOTHING
        "#,
    )
    .bind(&hashes)
    .bind(&block_numbers)
    .bind(&indices)
    .bind(&from_addresses)
    .bind(&to_addresses)
    .bind(&values)
    .bind(&gas)
    .bind(&gas_price)
    .bind(&nonces)
    .bind(&inputs)
    .bind(&statuses)
    .bind(&cumulative_gas_used)
    .bind(&effective_gas_price)
    .execute(&mut **tx)
    .await
    .map_err(classify)?;

    Ok(())
}

async fn insert_logs_chunk(tx: &mut Transaction<'_, Postgres>, chunk: &[LogRecord]) -> Result<(), StoreError> {
    if chunk.is_empty() {
        return Ok(());
    }
    let tx_hashes: Vec<&str> = chunk.iter().map(|l| l.transaction_hash.as_str()).collect();
    let log_indices: Vec<i32> = chunk.iter().map(|l| l.log_index as i32).collect();
    let block_numbers: Vec<String> = chunk.iter().map(|l| l.block_number.to_string()).collect();
    let addresses: Vec<&str> = chunk.iter().map(|l| l.address.as_str()).collect();
    let topic0: Vec<Option<&str>> = chunk.iter().map(|l| l.topic0.as_deref()).collect();
    let topic1: Vec<Option<&str>> = chunk.iter().map(|l| l.topic1.as_deref()).collect();
    let topic2: Vec<Option<&str>> = chunk.iter().map(|l| l.topic2.as_deref()).collect();
    let topic3: Vec<Option<&str>> = chunk.iter().map(|l| l.topic3.as_deref()).collect();
    let data: Vec<&str> = chunk.iter().map(|l| l.data.as_str()).collect();

    sqlx::query(
        r#"
        INSERT INTO logs (transaction_hash, log_index, block_number, address, topic0, topic1, topic2, topic3, data)
        SELECT * FROM UNNEST(
            $1::text[], $2::int[], $3::text[]::numeric[], $4::text[],
            $5::text[], $6::text[], $7::text[], $8::text[], $9::text[]
        )
        ON CONFLICT (transaction_hash, log_index) DO NOTHING
        "#,
    )
    .bind(&tx_hashes)
    .bind(&log_indices)
    .bind(&block_numbers)
    .bind(&addresses)
    .bind(&topic0)
    .bind(&topic1)
    .bind(&topic2)
    .bind(&topic3)
    .bind(&data)
    .execute(&mut **tx)
    .await
    .map_err(classify)?;

    Ok(())
}
