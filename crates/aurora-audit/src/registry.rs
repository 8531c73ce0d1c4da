//! Lazily-opened, shared set of per-subsystem audit sinks.
//!
//! Most components only know their own subsystem name (`"heartbeat"`,
//! `"cli_broker"`, `"router"`, ...) and want a sink without threading one
//! through every constructor. [`AuditRegistry`] opens one on first use
//! and hands out cheap clones afterward.

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use crate::error::AuditResult;
use crate::sink::AuditSink;

/// Owns the audit log directory and every subsystem sink opened from it.
#[derive(Debug)]
pub struct AuditRegistry {
    dir: PathBuf,
    sinks: DashMap<String, AuditSink>,
}

impl AuditRegistry {
    /// Root the registry at `dir` (created lazily per-subsystem, not
    /// eagerly here).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sinks: DashMap::new(),
        }
    }

    /// Get (opening if necessary) the sink for `subsystem`.
    ///
    /// # Errors
    ///
    /// Returns an error if the subsystem's log file cannot be opened for
    /// the first time.
    pub async fn sink(&self, subsystem: &str) -> AuditResult<AuditSink> {
        if let Some(existing) = self.sinks.get(subsystem) {
            return Ok(existing.clone());
        }
        let opened = AuditSink::open(&self.dir, subsystem).await?;
        self.sinks
            .insert(subsystem.to_string(), opened.clone());
        Ok(opened)
    }

    /// The directory every subsystem's `<name>.jsonl` file lives under.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reuses_the_same_sink_for_repeat_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let registry = AuditRegistry::new(dir.path());

        let a = registry.sink("heartbeat").await.unwrap();
        let b = registry.sink("heartbeat").await.unwrap();
        assert_eq!(a.subsystem(), b.subsystem());
    }
}
