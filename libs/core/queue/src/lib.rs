//! Distributed work queue: a two-list (`work` → `processing`) hand-off
//! with per-range lease keys and the `last_queued`/`last_processed`
//! progress watermarks, built on [`chainidx_coordination`].

mod client;
mod errors;
pub mod keys;

pub use client::WorkQueue;
pub use errors::QueueError;

#[cfg(test)]
mod tests {
    use super::keys;
    use chainidx_models::BlockRange;

    #[test]
    fn lease_key_matches_wire_format() {
        let range = BlockRange::new(100, 109).unwrap();
        assert_eq!(keys::lease_key(&range), "lock:range:100-109");
        assert_eq!(keys::lease_key_for_payload("100-109"), "lock:range:100-109");
    }
}
