//! Per-subsystem append-only JSONL writer.
//!
//! `emit` never blocks the caller on disk I/O: the event is handed to a
//! background task over an unbounded channel, and the task owns the open
//! file. A write failure is logged at `warn` and the event is dropped —
//! logging must never raise into the caller.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::{AuditError, AuditResult};
use crate::event::AuditEvent;

/// A handle to one subsystem's audit log file.
///
/// Cloning an `AuditSink` is cheap (it is a sender handle); all clones
/// feed the same background writer task and therefore the same file.
#[derive(Clone, Debug)]
pub struct AuditSink {
    subsystem: String,
    tx: mpsc::UnboundedSender<AuditEvent>,
}

impl AuditSink {
    /// Open (creating if necessary) `<dir>/<subsystem>.jsonl` and start
    /// its background writer task.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened for appending.
    pub async fn open(dir: impl AsRef<Path>, subsystem: impl Into<String>) -> AuditResult<Self> {
        let subsystem = subsystem.into();
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| AuditError::CreateDir {
                path: dir.display().to_string(),
                source,
            })?;

        let path: PathBuf = dir.join(format!("{subsystem}.jsonl"));
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| AuditError::OpenFile {
                path: path.display().to_string(),
                source,
            })?;

        let (tx, mut rx) = mpsc::unbounded_channel::<AuditEvent>();
        let writer_subsystem = subsystem.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let line = event.to_jsonl_line();
                if let Err(err) = file.write_all(line.as_bytes()).await {
                    warn!(subsystem = %writer_subsystem, %err, "audit write failed, event dropped");
                    continue;
                }
                if let Err(err) = file.flush().await {
                    warn!(subsystem = %writer_subsystem, %err, "audit flush failed");
                }
            }
        });

        Ok(Self { subsystem, tx })
    }

    /// The subsystem name this sink writes for.
    #[must_use]
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Queue `event` for writing. Never blocks and never fails the
    /// caller; if the writer task has gone away, the drop is logged at
    /// `warn` and the event is discarded.
    pub fn emit(&self, event: AuditEvent) {
        if self.tx.send(event).is_err() {
            warn!(subsystem = %self.subsystem, "audit writer task gone, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn writes_one_jsonl_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let sink = AuditSink::open(dir.path(), "heartbeat").await.unwrap();

        sink.emit(AuditEvent::system("heartbeat.tick", "ok"));
        sink.emit(AuditEvent::system("heartbeat.tick", "ok"));

        tokio::time::sleep(Duration::from_millis(50)).await;

        let contents = tokio::fs::read_to_string(dir.path().join("heartbeat.jsonl"))
            .await
            .unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: AuditEvent = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.action, "heartbeat.tick");
        }
    }

    #[tokio::test]
    async fn separate_subsystems_get_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = AuditSink::open(dir.path(), "broker").await.unwrap();
        let b = AuditSink::open(dir.path(), "router").await.unwrap();

        a.emit(AuditEvent::system("task.completed", "ok"));
        b.emit(AuditEvent::system("route.selected", "ok"));

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(dir.path().join("broker.jsonl").exists());
        assert!(dir.path().join("router.jsonl").exists());
    }
}
