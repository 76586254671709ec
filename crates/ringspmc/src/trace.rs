//! Diagnostic events for ring construction, contention and teardown.
//!
//! Enable with `--features tracing`. Every macro expands to nothing when the
//! feature is off, so the push/pop paths stay free of logging overhead.

/// Install a `tracing-subscriber` fmt layer filtered by `RUST_LOG`.
///
/// Intended for tests and benchmarks. Defaults to `ringspmc_rs=trace` when
/// `RUST_LOG` is unset. A second call is a no-op. Does nothing if the
/// `tracing` feature is not enabled.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ringspmc_rs=trace"));

    // `try_init` so repeated calls from parallel tests do not panic.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
macro_rules! trace_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use debug_noop as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use trace_noop as trace;
