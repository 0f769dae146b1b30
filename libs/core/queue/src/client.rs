use chainidx_coordination::{BlockingConnection, CoordinationStore, Script};
use chainidx_models::BlockRange;
use tracing::{info, instrument, warn};

use crate::errors::QueueError;
use crate::keys;

/// Monotonic compare-and-set: only advances `last_processed` when the
/// candidate exceeds the stored value, so an out-of-order `complete()` (a
/// range finishing after a later one) never regresses the watermark.
const ADVANCE_WATERMARK_SCRIPT: &str = r#"
local key = KEYS[1]
local candidate = tonumber(ARGV[1])
local current = tonumber(redis.call('GET', key))

if current == nil or candidate > current then
    redis.call('SET', key, candidate)
    return candidate
end
return current
"#;

/// Two-list (`work` → `processing`) distributed queue with per-range
/// lease keys and the `last_queued`/`last_processed` progress watermarks.
///
/// Every range in existence lives in exactly one of the two lists;
/// duplicates in `work` are permitted and benign since processing is
/// idempotent. A range that sits in `processing` without a live lease key
/// is a zombie, recovered by [`WorkQueue::recover_zombies`].
pub struct WorkQueue {
    store: CoordinationStore,
    blocking: BlockingConnection,
    advance_watermark: Script,
    batch_size: u64,
    min_block: u64,
    lease_ttl_seconds: u64,
}

impl WorkQueue {
    pub fn new(
        store: CoordinationStore,
        blocking: BlockingConnection,
        batch_size: u64,
        min_block: u64,
        lease_ttl_seconds: u64,
    ) -> Self {
        Self {
            store,
            blocking,
            advance_watermark: Script::new(ADVANCE_WATERMARK_SCRIPT),
            batch_size,
            min_block,
            lease_ttl_seconds,
        }
    }

    /// Appends ranges covering `[last_queued + 1, target]` (or `[min_block,
    /// target]` on a cold start) to the tail of `work`, then advances
    /// `last_queued` to `target`. A no-op when the watermark already
    /// covers the target. Safe to call repeatedly across restarts; only
    /// a single Seeder routine should call it concurrently, since the
    /// read-then-write of `last_queued` here is not itself atomic.
    #[instrument(skip(self))]
    pub async fn seed(&self, target: u64) -> Result<(), QueueError> {
        let last_queued = self.last_queued().await?;
        let start = last_queued.map(|v| v + 1).unwrap_or(self.min_block);
        if start > target {
            return Ok(());
        }

        let batches = BlockRange::batches(start, target, self.batch_size);
        if batches.is_empty() {
            return Ok(());
        }
        let payloads: Vec<String> = batches.iter().map(BlockRange::to_string).collect();
        self.store.append_many_to_tail(keys::WORK, &payloads).await?;
        self.store.set_string(keys::LAST_QUEUED, &target.to_string()).await?;
        info!(start, target, batches = payloads.len(), "seeded new ranges");
        Ok(())
    }

    /// Blocks until a range is available, atomically moves it from `work`
    /// to `processing`, and sets its lease key. There is a small race
    /// window between the move and the lease `SET`: if the caller crashes
    /// in between, the Janitor will still recover the range because no
    /// lease key exists for it.
    #[instrument(skip(self))]
    pub async fn next(&mut self) -> Result<BlockRange, QueueError> {
        let payload = self.blocking.move_head_to_tail(keys::WORK, keys::PROCESSING).await?;
        let range: BlockRange = payload.parse()?;
        self.store
            .set_with_ttl(&keys::lease_key(&range), "leased", self.lease_ttl_seconds)
            .await?;
        Ok(range)
    }

    /// Refreshes a held lease's TTL. Returns `false` if the lease already
    /// expired (the caller has lost the range to the Janitor).
    pub async fn extend_lease(&self, range: BlockRange) -> Result<bool, QueueError> {
        Ok(self.store.refresh_ttl(&keys::lease_key(&range), self.lease_ttl_seconds).await?)
    }

    /// Tears down the lease and removes the range from `processing`, then
    /// advances `last_processed` monotonically.
    #[instrument(skip(self))]
    pub async fn complete(&self, range: BlockRange) -> Result<(), QueueError> {
        let payload = range.to_string();
        self.store
            .pipeline_complete(keys::PROCESSING, &payload, &keys::lease_key(&range))
            .await?;
        let _: i64 = self
            .store
            .eval_script(&self.advance_watermark, &[keys::LAST_PROCESSED], &[range.to().to_string()])
            .await?;
        Ok(())
    }

    /// Tears down the lease and re-queues the range at the tail of `work`,
    /// so a poison range never head-of-line blocks the rest of the queue.
    #[instrument(skip(self))]
    pub async fn fail(&self, range: BlockRange) -> Result<(), QueueError> {
        let payload = range.to_string();
        self.store
            .pipeline_requeue(keys::PROCESSING, &payload, &keys::lease_key(&range), keys::WORK)
            .await?;
        Ok(())
    }

    /// Scans `processing` for ranges whose lease key no longer exists and
    /// returns them to `work`. This is the only path by which a crash
    /// without acknowledgement gets recovered. Returns the count recovered.
    #[instrument(skip(self))]
    pub async fn recover_zombies(&self) -> Result<u32, QueueError> {
        let in_flight = self.store.list_all(keys::PROCESSING).await?;
        let mut recovered = 0u32;
        for payload in in_flight {
            let lease_key = keys::lease_key_for_payload(&payload);
            if !self.store.exists(&lease_key).await? {
                self.store
                    .pipeline_requeue(keys::PROCESSING, &payload, &lease_key, keys::WORK)
                    .await?;
                recovered += 1;
                warn!(range = %payload, "recovered zombie range");
            }
        }
        Ok(recovered)
    }

    pub async fn last_queued(&self) -> Result<Option<u64>, QueueError> {
        Ok(self.store.get_string(keys::LAST_QUEUED).await?.and_then(|v| v.parse().ok()))
    }

    pub async fn last_processed(&self) -> Result<Option<u64>, QueueError> {
        Ok(self.store.get_string(keys::LAST_PROCESSED).await?.and_then(|v| v.parse().ok()))
    }
}
