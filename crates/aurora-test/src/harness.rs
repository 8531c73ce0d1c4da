//! Small setup helpers every integration-style test otherwise repeats.

use std::sync::Once;

use aurora_audit::AuditSink;

static LOGGING_INIT: Once = Once::new();

/// Install a `tracing-subscriber` pretty-printer gated by `RUST_LOG`
/// (default `warn`), once per test binary. Safe to call from every
/// test; subsequent calls are no-ops.
pub fn init_test_logging() {
    LOGGING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Open an [`AuditSink`] backed by a fresh temporary directory.
///
/// Returns the sink alongside the [`tempfile::TempDir`] guard — keep
/// the guard alive for as long as the sink is in use, or its backing
/// directory is deleted out from under the writer task.
///
/// # Panics
///
/// Panics if the temporary directory or the sink's writer task cannot
/// be created. Acceptable in test setup; this is not production code.
pub async fn temp_audit_sink(subsystem: &str) -> (AuditSink, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir for audit sink");
    let sink = AuditSink::open(dir.path(), subsystem).await.expect("open audit sink");
    (sink, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn temp_audit_sink_is_usable() {
        let (sink, _dir) = temp_audit_sink("test").await;
        sink.emit(aurora_audit::AuditEvent::system("test.event", "hello"));
    }
}
