use redis::aio::{Connection, ConnectionManager};
use redis::{AsyncCommands, Client, Direction, FromRedisValue, Script};
use tracing::{info, instrument};

use crate::errors::CoordinationError;

/// Facade over the in-memory coordination service exposing the atomic
/// primitives the distributed queue and rate limiter are built on: list
/// append/pop, scripted sorted-set evaluation, and TTL-keyed locks.
///
/// Holds a pooled, multiplexed connection suitable for every operation
/// except the blocking list take — that one needs its own dedicated
/// connection (see [`BlockingConnection`]) so it never stalls unrelated
/// commands behind an indefinite `BRPOPLPUSH`.
#[derive(Clone)]
pub struct CoordinationStore {
    client: Client,
    manager: ConnectionManager,
}

impl CoordinationStore {
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self, CoordinationError> {
        if url.is_empty() {
            return Err(CoordinationError::InvalidUrl);
        }
        let client = Client::open(url)?;
        let manager = ConnectionManager::new(client.clone()).await?;
        info!("coordination store connected");
        Ok(Self { client, manager })
    }

    /// Exposes the underlying client so callers can open their own
    /// dedicated connection for blocking commands.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Appends a value to the tail of a list.
    pub async fn append_to_tail(&self, key: &str, value: &str) -> Result<(), CoordinationError> {
        self.conn().rpush::<_, _, ()>(key, value).await?;
        Ok(())
    }

    /// Appends many values to the tail of a list in one pipelined round trip.
    pub async fn append_many_to_tail(&self, key: &str, values: &[String]) -> Result<(), CoordinationError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        for value in values {
            pipe.rpush(key, value).ignore();
        }
        pipe.query_async(&mut self.conn()).await?;
        Ok(())
    }

    /// Removes up to one occurrence of `value` from `key`.
    pub async fn remove_one(&self, key: &str, value: &str) -> Result<i64, CoordinationError> {
        Ok(self.conn().lrem(key, 1, value).await?)
    }

    /// Reads the full contents of a list, head to tail.
    pub async fn list_all(&self, key: &str) -> Result<Vec<String>, CoordinationError> {
        Ok(self.conn().lrange(key, 0, -1).await?)
    }

    /// Sets a string key with an expiry, in seconds.
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CoordinationError> {
        self.conn().set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    /// Sets a string key with no expiry.
    pub async fn set_string(&self, key: &str, value: &str) -> Result<(), CoordinationError> {
        self.conn().set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    /// Refreshes a key's TTL without touching its value. Returns `false` if
    /// the key no longer exists (the lease already expired).
    pub async fn refresh_ttl(&self, key: &str, ttl_seconds: u64) -> Result<bool, CoordinationError> {
        Ok(self.conn().expire(key, ttl_seconds as i64).await?)
    }

    pub async fn exists(&self, key: &str) -> Result<bool, CoordinationError> {
        Ok(self.conn().exists(key).await?)
    }

    pub async fn delete(&self, key: &str) -> Result<(), CoordinationError> {
        self.conn().del::<_, ()>(key).await?;
        Ok(())
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>, CoordinationError> {
        Ok(self.conn().get(key).await?)
    }

    /// Atomically removes a range from `processing` and its lease key, then
    /// appends it to `work`'s tail. Used by both `complete`/`fail` (lease
    /// teardown) and zombie recovery — a single `MULTI`/`EXEC` so a crash
    /// mid-sequence can never leave a range in both lists or neither.
    pub async fn pipeline_requeue(
        &self,
        processing_key: &str,
        range_value: &str,
        lease_key: &str,
        work_key: &str,
    ) -> Result<(), CoordinationError> {
        redis::pipe()
            .atomic()
            .lrem(processing_key, 1, range_value)
            .ignore()
            .del(lease_key)
            .ignore()
            .rpush(work_key, range_value)
            .ignore()
            .query_async(&mut self.conn())
            .await?;
        Ok(())
    }

    /// Atomically removes a range from `processing` and deletes its lease
    /// key, without requeueing — used by `complete`.
    pub async fn pipeline_complete(
        &self,
        processing_key: &str,
        range_value: &str,
        lease_key: &str,
    ) -> Result<(), CoordinationError> {
        redis::pipe()
            .atomic()
            .lrem(processing_key, 1, range_value)
            .ignore()
            .del(lease_key)
            .ignore()
            .query_async(&mut self.conn())
            .await?;
        Ok(())
    }

    /// Evaluates a server-side script with the given keys and args,
    /// deserializing the return value into `T`.
    pub async fn eval_script<T>(
        &self,
        script: &Script,
        keys: &[&str],
        args: &[String],
    ) -> Result<T, CoordinationError>
    where
        T: FromRedisValue,
    {
        let mut invocation = script.prepare_invoke();
        for key in keys {
            invocation.key(*key);
        }
        for arg in args {
            invocation.arg(arg.as_str());
        }
        Ok(invocation.invoke_async(&mut self.conn()).await?)
    }
}

/// A single, non-multiplexed connection reserved exclusively for the
/// blocking list take. Must never be shared with non-blocking commands:
/// an indefinite `BRPOPLPUSH` would otherwise stall every other operation
/// queued behind it on the same connection.
pub struct BlockingConnection {
    connection: Connection,
}

impl BlockingConnection {
    pub async fn connect(client: &Client) -> Result<Self, CoordinationError> {
        let connection = client.get_async_connection().await?;
        Ok(Self { connection })
    }

    /// Blocks until an element is available at the head of `source`, then
    /// atomically moves it to the tail of `destination`. Blocks
    /// indefinitely (timeout `0`) when `source` is empty.
    pub async fn move_head_to_tail(&mut self, source: &str, destination: &str) -> Result<String, CoordinationError> {
        let value: String = self
            .connection
            .blmove(source, destination, Direction::Left, Direction::Right, 0.0)
            .await?;
        Ok(value)
    }
}
