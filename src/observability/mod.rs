//! Logging setup and crash-report context.
//!
//! ```ignore
//! use inheritmap::observability::{init_logging, install_panic_hook};
//!
//! fn main() {
//!     install_panic_hook();
//!     init_logging(1);
//! }
//! ```

pub mod context;
pub mod panic_hook;

pub use context::{
    discovered_count, get_current_context, increment_discovered, reset_context,
    reset_discovered, set_current_type, set_phase, ContextGuard, ExplorerContext, Phase,
};
pub use panic_hook::install_panic_hook;

use tracing_subscriber::EnvFilter;

/// Map a `-v` count to a default filter directive.
pub fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbosity)));
    // a subscriber may already be installed (tests, embedding hosts)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
