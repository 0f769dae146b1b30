//! Integration tests against a live coordination store. Requires
//! `REDIS_URL` to point at a reachable instance; skipped otherwise.
//!
//! Run with: `REDIS_URL=redis://127.0.0.1 cargo test -p chainidx-coordination -- --ignored`

use chainidx_coordination::CoordinationStore;

async fn connect() -> Option<CoordinationStore> {
    let url = std::env::var("REDIS_URL").ok()?;
    CoordinationStore::connect(&url).await.ok()
}

#[tokio::test]
#[ignore]
async fn append_and_drain_roundtrips() {
    let Some(store) = connect().await else { return };
    let key = "test:queue:append_and_drain";
    store.delete(key).await.unwrap();

    store.append_to_tail(key, "100-109").await.unwrap();
    store.append_to_tail(key, "110-119").await.unwrap();

    let all = store.list_all(key).await.unwrap();
    assert_eq!(all, vec!["100-109".to_string(), "110-119".to_string()]);

    store.delete(key).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn lease_ttl_expires() {
    let Some(store) = connect().await else { return };
    let key = "test:lock:range:1-1";
    store.set_with_ttl(key, "worker-a", 1).await.unwrap();
    assert!(store.exists(key).await.unwrap());

    tokio::time::sleep(std::time::Duration::from_millis(1200)).await;
    assert!(!store.exists(key).await.unwrap());
}
