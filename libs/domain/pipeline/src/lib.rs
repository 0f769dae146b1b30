//! Wires the queue, rate limiter, fetcher and store into the running
//! indexer: environment-driven configuration, the worker state machine,
//! the Seeder and Janitor daemons, and the supervisor that spawns them
//! all and waits out a graceful shutdown.

mod config;
mod errors;
mod janitor;
mod seeder;
mod stop;
mod supervisor;
mod worker;

pub use config::{Config, ConfigError};
pub use errors::PipelineError;
pub use janitor::Janitor;
pub use seeder::Seeder;
pub use stop::{install as install_stop_signal, StopSignal};
pub use supervisor::Supervisor;
pub use worker::WorkerLoop;
