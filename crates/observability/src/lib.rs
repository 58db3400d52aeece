//! Tracing/logging setup shared by the idgate binaries and tests.

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide logging from the environment.
///
/// `RUST_LOG` controls filtering (default `info`); `LOG_FORMAT=pretty`
/// switches from JSON lines to human-readable output. Safe to call multiple
/// times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    crate::tracing::init(format);
}
