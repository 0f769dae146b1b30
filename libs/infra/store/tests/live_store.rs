//! Integration tests against a live Postgres instance. Requires
//! `DATABASE_URL`; skipped otherwise.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test -p chainidx-store -- --ignored`

use chainidx_models::{BlockRecord, LogRecord, TransactionRecord};
use chainidx_store::{BlockRepository, StoreClient, StoreError};
use chrono::Utc;

async fn repository() -> Option<BlockRepository> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let client = StoreClient::connect(&url, 4).await.ok()?;
    Some(BlockRepository::new(client))
}

fn sample_block(number: u64, hash: &str) -> BlockRecord {
    BlockRecord {
        number,
        hash: hash.to_string(),
        parent_hash: "0xparent".into(),
        timestamp: Utc::now(),
        miner: "0xminer".into(),
        gas_used: "21000".into(),
        gas_limit: "30000000".into(),
        base_fee_per_gas: Some("1000000000".into()),
        transaction_count: 0,
    }
}

#[tokio::test]
#[ignore]
async fn saving_the_same_range_twice_is_idempotent() {
    let Some(repo) = repository().await else { return };
    let blocks = vec![sample_block(9_000_001, "0xblockhash_a")];

    repo.save(&blocks, &[], &[]).await.unwrap();
    repo.save(&blocks, &[], &[]).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn conflicting_hash_at_same_height_trips_reorg_sentinel() {
    let Some(repo) = repository().await else { return };
    let first = vec![sample_block(9_000_002, "0xoriginal")];
    let conflicting = vec![sample_block(9_000_002, "0xreorged")];

    repo.save(&first, &[], &[]).await.unwrap();
    let result = repo.save(&conflicting, &[], &[]).await;
    assert!(matches!(result, Err(StoreError::ReorgDetected)));
}

#[tokio::test]
#[ignore]
async fn transaction_and_log_rows_carry_foreign_keys_to_their_block() {
    let Some(repo) = repository().await else { return };
    let blocks = vec![sample_block(9_000_003, "0xblockhash_c")];
    let transactions = vec![TransactionRecord {
        hash: "0xtxhash_c".into(),
        block_number: 9_000_003,
        transaction_index: 0,
        from_address: "0xfrom".into(),
        to_address: Some("0xto".into()),
        value: "0".into(),
        gas: "21000".into(),
        gas_price: "1000000000".into(),
        nonce: 1,
        input: "0x".into(),
        status: Some(1),
        cumulative_gas_used: "21000".into(),
        effective_gas_price: "1000000000".into(),
    }];
    let logs = vec![LogRecord {
        transaction_hash: "0xtxhash_c".into(),
        log_index: 0,
        block_number: 9_000_003,
        address: "0xcontract".into(),
        topic0: Some("0xtopic".into()),
        topic1: None,
        topic2: None,
        topic3: None,
        data: "0x".into(),
    }];

    repo.save(&blocks, &transactions, &logs).await.unwrap();
}
