//! Process-wide tracing setup shared by fleetdeck binaries.

/// Initialize tracing for the process.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json);
}

/// Initialize tracing with human-readable output (interactive use).
pub fn init_pretty() {
    tracing::init(tracing::LogFormat::Pretty);
}

/// Subscriber configuration (filters, output format).
pub mod tracing;
