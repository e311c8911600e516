//! Structured logging on stderr.
//!
//! Filtering follows `RUST_LOG` when set, e.g. `RUST_LOG=gridwise::session=debug`.
//! Otherwise only warnings are shown, or everything at debug level when
//! debug mode is on (`--debug` or `[debug] enabled = true`).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(debug)
        .with_filter(filter);

    // fails only when a subscriber is already set, e.g. across tests
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
