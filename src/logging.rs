use log::{debug, error, info, log_enabled, warn, Level};

/// Initializes the logger with the `env_logger` crate.
///
/// Verbosity comes from `RUST_LOG`; `tic::dataset=debug` alone shows the raw
/// dataset dumps.
pub fn init_logger() {
    env_logger::init();
}

/// Initializes the logger with `default_level` unless `RUST_LOG` overrides it.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger_with_level(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}
