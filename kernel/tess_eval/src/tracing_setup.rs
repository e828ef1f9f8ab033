//! Process-wide tracing subscriber setup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call repeatedly; only the first call has an effect, and nothing is
/// installed when `RUST_LOG` is unset. Use e.g.
/// `RUST_LOG=tess_eval=debug` for method execution spans or
/// `RUST_LOG=tess_eval=trace` to see individual reduction decisions.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // A host may already have installed a global subscriber.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
