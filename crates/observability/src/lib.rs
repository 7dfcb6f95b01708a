//! Structured logging setup shared by every binary.

/// Initialize process-wide logging from the environment.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogConfig::from_env());
}

/// Subscriber configuration (filter, output format).
pub mod tracing;
