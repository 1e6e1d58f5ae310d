//! Tracing/logging setup shared by bookstore binaries.

/// Initialize process-wide tracing/logging from the environment.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{ENV_LOG_FORMAT, LogFormat, LogFormatError};
