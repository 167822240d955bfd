//! Development-time tracing.
//!
//! Diagnostics go to stderr so they never mix with operator results printed
//! on stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";
/// Filter used when `RUST_LOG` is unset and the CLI runs with `--verbose`.
pub const VERBOSE_FILTER: &str = "ioutils=debug,warn";

/// Initialize tracing subscriber for development logging.
///
/// `RUST_LOG` wins when set; otherwise `fallback` is used.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=ioutils=debug ioutils call IOExec '["echo", "hi"]'
/// ```
pub fn init(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
