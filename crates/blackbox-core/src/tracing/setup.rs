//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Blackbox logging system.
///
/// Reads `BLACKBOX_LOG` for per-subsystem log levels, e.g.
/// `BLACKBOX_LOG=blackbox_extraction::scanner=debug,blackbox_extraction::anonymizer=warn`.
///
/// Falls back to `blackbox=info` if `BLACKBOX_LOG` is unset or invalid.
/// Calling it more than once is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("BLACKBOX_LOG")
            .unwrap_or_else(|_| EnvFilter::new("blackbox=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
