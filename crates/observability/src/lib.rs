//! Tracing/logging setup shared by every shopkeep entry point.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide tracing with the given output format.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    crate::tracing::init(format);
}
