//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Honors `RUST_LOG`; falls back to `info` when unset. Calling this more than
/// once is harmless.
pub fn init() {
    init_with_default_filter("info");
}

/// Initialize the logging system with a default filter used when `RUST_LOG` is unset
pub fn init_with_default_filter(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("logger already initialized");
    }
}
