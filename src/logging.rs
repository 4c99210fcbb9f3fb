//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at `debug` when
/// `verbose` is true and at `info` otherwise. Calling this twice is a no-op.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "microgrid_env=debug"
    } else {
        "microgrid_env=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .ok();
}
