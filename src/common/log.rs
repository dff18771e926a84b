//! Logging utilities

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Arguments
///
/// * `level` - Default log level
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // Ignore the error raised when a logger is already set
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .try_init();
}
