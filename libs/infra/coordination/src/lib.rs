//! Thin facade over the in-memory coordination service (list, sorted-set
//! and scripted operations) that the work queue, rate limiter and lease
//! mechanism are built on. This crate has no business logic of its own;
//! connection errors are propagated to the caller, which treats them as
//! transient.

mod client;
mod errors;

pub use client::{BlockingConnection, CoordinationStore};
pub use errors::CoordinationError;
pub use redis::Script;
