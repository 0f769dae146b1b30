use chainidx_models::BlockRange;

pub const WORK: &str = "queue:work";
pub const PROCESSING: &str = "queue:processing";
pub const LAST_QUEUED: &str = "queue:lastQueued";
pub const LAST_PROCESSED: &str = "queue:lastProcessed";

pub fn lease_key(range: &BlockRange) -> String {
    format!("lock:range:{range}")
}

pub fn lease_key_for_payload(payload: &str) -> String {
    format!("lock:range:{payload}")
}
