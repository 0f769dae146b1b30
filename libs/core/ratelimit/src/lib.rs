//! Global, coordinator-enforced sliding-window-log rate limiter.
//!
//! A single server-side script evicts stale entries, counts what remains,
//! and admits the caller atomically — no lock is held between the check
//! and the admission, because the whole sequence is one script invocation.
//! This gives strict sliding-window semantics: unlike a fixed-window
//! counter, it never admits more than `limit` calls in any rolling window
//! of `window_ms`, including across a window boundary.

use std::time::Duration;

use chainidx_coordination::{CoordinationError, CoordinationStore, Script};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, trace};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error(transparent)]
    Coordination(#[from] CoordinationError),
}

/// Evicts entries older than the window, counts what remains, and admits
/// the caller (recording `now`/a fresh unique id) iff the count is under
/// `limit`. `now` and the eviction cutoff are computed from the
/// coordinator's own clock (`TIME`), so caller clock skew is irrelevant.
/// The unique id is required because a sorted set cannot hold duplicate
/// members — two calls landing in the same millisecond must still both be
/// admissible when budget allows.
const ACQUIRE_SCRIPT: &str = r#"
local key = KEYS[1]
local window_ms = tonumber(ARGV[1])
local limit = tonumber(ARGV[2])
local member = ARGV[3]

local time = redis.call('TIME')
local now_ms = (tonumber(time[1]) * 1000) + math.floor(tonumber(time[2]) / 1000)

redis.call('ZREMRANGEBYSCORE', key, '-inf', now_ms - window_ms)
local count = redis.call('ZCARD', key)

if count < limit then
    redis.call('ZADD', key, now_ms, member)
    redis.call('PEXPIRE', key, window_ms)
    return 1
end
return 0
"#;

/// A caller rejected by the limiter sleeps a uniformly random interval in
/// this range before retrying, desynchronizing concurrent callers so they
/// don't all retry on the same tick (thundering-herd mitigation).
const RETRY_JITTER_MIN_MS: u64 = 50;
const RETRY_JITTER_MAX_MS: u64 = 250;

pub struct RateLimiter {
    store: CoordinationStore,
    script: Script,
    key: String,
    limit: u32,
    window_ms: u64,
}

impl RateLimiter {
    pub fn new(store: CoordinationStore, key: impl Into<String>, limit: u32, window: Duration) -> Self {
        Self {
            store,
            script: Script::new(ACQUIRE_SCRIPT),
            key: key.into(),
            limit,
            window_ms: window.as_millis() as u64,
        }
    }

    /// Attempts a single admission check. Returns `true` if the caller was
    /// admitted, `false` if the budget is currently exhausted.
    pub async fn try_acquire(&self) -> Result<bool, RateLimitError> {
        let member = Uuid::new_v4().to_string();
        let args = vec![self.window_ms.to_string(), self.limit.to_string(), member];
        let admitted: i64 = self.store.eval_script(&self.script, &[self.key.as_str()], &args).await?;
        Ok(admitted == 1)
    }

    /// Blocks, retrying with randomized jitter, until a token is admitted.
    /// There is no retry cap: the rate limiter is a flow-control device,
    /// not a failure source, so callers should always eventually proceed.
    pub async fn acquire(&self) -> Result<(), RateLimitError> {
        loop {
            if self.try_acquire().await? {
                trace!(key = %self.key, "rate limit token acquired");
                return Ok(());
            }
            let jitter_ms = rand::thread_rng().gen_range(RETRY_JITTER_MIN_MS..=RETRY_JITTER_MAX_MS);
            debug!(key = %self.key, jitter_ms, "rate limit rejected, backing off");
            tokio::time::sleep(Duration::from_millis(jitter_ms)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_text_references_expected_keys_and_args() {
        assert!(ACQUIRE_SCRIPT.contains("KEYS[1]"));
        assert!(ACQUIRE_SCRIPT.contains("ARGV[1]"));
        assert!(ACQUIRE_SCRIPT.contains("ARGV[2]"));
        assert!(ACQUIRE_SCRIPT.contains("ARGV[3]"));
        assert!(ACQUIRE_SCRIPT.contains("ZREMRANGEBYSCORE"));
        assert!(ACQUIRE_SCRIPT.contains("ZADD"));
    }
}
