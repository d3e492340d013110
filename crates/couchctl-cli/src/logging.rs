use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Initialize the global tracing subscriber.
///
/// Call once at program startup. Respects `RUST_LOG` for filtering.
/// Default filter: `couchctl=info` plus warnings from dependencies.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("couchctl=info,warn"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .compact();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(subscriber)
        .init();
}
