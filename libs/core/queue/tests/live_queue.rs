//! Integration tests against a live coordination store. Requires
//! `REDIS_URL`; skipped otherwise.
//!
//! Run with: `REDIS_URL=redis://127.0.0.1 cargo test -p chainidx-queue -- --ignored`

use chainidx_coordination::{BlockingConnection, CoordinationStore};
use chainidx_queue::WorkQueue;

async fn fresh_queue(batch_size: u64, min_block: u64) -> Option<WorkQueue> {
    let url = std::env::var("REDIS_URL").ok()?;
    let store = CoordinationStore::connect(&url).await.ok()?;
    let blocking = BlockingConnection::connect(store.client()).await.ok()?;

    for key in ["queue:work", "queue:processing", "queue:lastQueued", "queue:lastProcessed"] {
        store.delete(key).await.ok()?;
    }

    Some(WorkQueue::new(store, blocking, batch_size, min_block, 2))
}

#[tokio::test]
#[ignore]
async fn cold_start_seeds_and_drains_in_batches() {
    let Some(mut queue) = fresh_queue(5, 100).await else { return };

    queue.seed(109).await.unwrap();
    assert_eq!(queue.last_queued().await.unwrap(), Some(109));

    let first = queue.next().await.unwrap();
    assert_eq!(first.to_string(), "100-104");
    let second = queue.next().await.unwrap();
    assert_eq!(second.to_string(), "105-109");

    queue.complete(first).await.unwrap();
    queue.complete(second).await.unwrap();
    assert_eq!(queue.last_processed().await.unwrap(), Some(109));
}

#[tokio::test]
#[ignore]
async fn expired_lease_is_recovered_as_zombie() {
    let Some(mut queue) = fresh_queue(5, 200).await else { return };

    queue.seed(204).await.unwrap();
    let leased = queue.next().await.unwrap();
    assert_eq!(leased.to_string(), "200-204");

    tokio::time::sleep(std::time::Duration::from_millis(2200)).await;
    let recovered = queue.recover_zombies().await.unwrap();
    assert_eq!(recovered, 1);

    let reclaimed = queue.next().await.unwrap();
    assert_eq!(reclaimed.to_string(), "200-204");
}

#[tokio::test]
#[ignore]
async fn failed_range_requeues_at_tail_without_blocking_others() {
    let Some(mut queue) = fresh_queue(5, 300).await else { return };
    queue.seed(309).await.unwrap();

    let poison = queue.next().await.unwrap();
    queue.fail(poison).await.unwrap();

    let healthy = queue.next().await.unwrap();
    assert_eq!(healthy.to_string(), "305-309");

    let requeued_poison = queue.next().await.unwrap();
    assert_eq!(requeued_poison.to_string(), "300-304");
}
