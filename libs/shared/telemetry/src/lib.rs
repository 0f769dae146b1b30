//! Tracing setup shared by every binary in the workspace.

use std::panic;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber and installs a panic hook that
/// logs through `tracing` before handing off to the default hook.
///
/// In development (`debug_assertions`), logs are human-readable with ANSI
/// colors. In release builds, events are emitted as flattened JSON lines so
/// they can be ingested by a log aggregator without a separate parser.
pub fn init_tracing(service_name: &str) {
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{service_name}={default_level},tower_http=warn,hyper=warn").into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if cfg!(debug_assertions) {
        registry.with(fmt::layer().with_target(true)).init();
    } else {
        registry
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    install_panic_hook();
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "<unknown>".to_string());
        tracing::error!(location = %location, "panic: {info}");
        default_hook(info);
    }));
}
