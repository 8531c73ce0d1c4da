//! `aurora audit` — read JSONL audit logs from the data root.

use std::io::{BufRead, BufReader};

use anyhow::{Context, Result};
use aurora_audit::AuditEvent;
use aurora_config::AuroraConfig;
use clap::Subcommand;

use crate::theme::Theme;

/// `aurora audit <command>`.
#[derive(Subcommand)]
pub enum AuditCommand {
    /// List subsystem log files present under `logs/`.
    List,
    /// Print the last `limit` events from a subsystem's log, oldest
    /// first.
    Tail {
        /// Subsystem name (file stem under `logs/`, e.g. `kernel`).
        subsystem: String,
        /// Number of trailing events to show.
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

/// Run an [`AuditCommand`] against the logs directory named in
/// `config`.
pub fn dispatch(config: &AuroraConfig, command: AuditCommand) -> Result<()> {
    let logs_dir = config.paths.logs_path();
    match command {
        AuditCommand::List => list(&logs_dir),
        AuditCommand::Tail { subsystem, limit } => tail(&logs_dir, &subsystem, limit),
    }
}

fn list(logs_dir: &std::path::Path) -> Result<()> {
    if !logs_dir.exists() {
        println!("{}", Theme::warning(&format!("no logs directory at {}", logs_dir.display())));
        return Ok(());
    }
    let mut found = false;
    for entry in std::fs::read_dir(logs_dir).with_context(|| format!("reading {}", logs_dir.display()))? {
        let entry = entry?;
        if entry.path().extension().and_then(|e| e.to_str()) == Some("jsonl") {
            found = true;
            println!("{}", entry.path().file_stem().and_then(|s| s.to_str()).unwrap_or("?"));
        }
    }
    if !found {
        println!("{}", Theme::info("no subsystem logs yet"));
    }
    Ok(())
}

fn tail(logs_dir: &std::path::Path, subsystem: &str, limit: usize) -> Result<()> {
    let path = logs_dir.join(format!("{subsystem}.jsonl"));
    if !path.exists() {
        println!("{}", Theme::warning(&format!("no log file for subsystem `{subsystem}` at {}", path.display())));
        return Ok(());
    }

    let file = std::fs::File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        lines.push(line?);
    }

    let start = lines.len().saturating_sub(limit);
    for line in &lines[start..] {
        match serde_json::from_str::<AuditEvent>(line) {
            Ok(event) => println!(
                "{} [{}] {} — {}",
                event.timestamp, event.actor, event.action, event.message
            ),
            Err(_) => println!("{}", Theme::warning(&format!("unparsable line: {line}"))),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_audit::AuditSink;

    #[tokio::test]
    async fn tail_reads_back_written_events() {
        let dir = tempfile::tempdir().unwrap();
        let sink = AuditSink::open(dir.path(), "demo").await.unwrap();
        sink.emit(AuditEvent::system("demo.tick", "one"));
        sink.emit(AuditEvent::system("demo.tick", "two"));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        tail(dir.path(), "demo", 1).unwrap();
        list(dir.path()).unwrap();
    }
}
