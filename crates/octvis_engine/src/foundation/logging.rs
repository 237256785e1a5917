//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG` (defaults to `info`)
pub fn init() {
    init_with_level("info");
}

/// Initialize the logging system with a default filter
///
/// `RUST_LOG` still wins when it is set. Calling this twice is harmless;
/// the second attempt is reported and ignored.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if let Err(err) = env_logger::Builder::from_env(env).try_init() {
        log::debug!("Logger already initialised: {err}");
    }
}
