//! Process-wide tracing/logging setup shared by every binary.

pub mod subscriber;

pub use subscriber::LogFormat;

/// Initialize process-wide observability (tracing/logging).
///
/// Format comes from `LOG_FORMAT`, filtering from `RUST_LOG`. Safe to call
/// multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|raw| LogFormat::parse(&raw))
        .unwrap_or_default();
    subscriber::init(format);
}
