//! The CLI Task Broker (C4): a per-agent, concurrency-1 queue that runs
//! external coding-agent CLIs (`claude`, `codex`, ...) as subprocesses.
//!
//! Grounded on the teacher's bash-tool subprocess idiom
//! (`tokio::process::Command`, timeout-wrapped, stdout/stderr captured)
//! generalized from a single synchronous call into a persistent
//! per-agent worker loop. A single-consumer `mpsc` channel per agent is
//! the idiomatic equivalent of a `Semaphore(1)`: only one task at a time
//! is ever being driven for a given agent, and later submissions simply
//! wait in the channel rather than racing on a permit.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use aurora_audit::{AuditEvent, AuditSink};
use aurora_core::{new_id, AgentTag, OperatorId, Timestamp};
use aurora_crypto::sha256_hex;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::error::{ToolsError, ToolsResult};

/// Default size of the in-memory LRU ring of recent tasks.
pub const DEFAULT_RING_CAPACITY: usize = 20;
/// Default per-task wall-clock timeout.
pub const DEFAULT_TIMEOUT_SEC: u64 = 300;
/// Bounded number of streamed lines retained per task.
const LOG_CAPACITY: usize = 500;
/// The one agent that gets a supplemental structured activity log.
const ACTIVITY_AGENT: AgentTag = AgentTag::Codex;

/// Lifecycle state of one CLI task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Submitted, waiting for its agent's worker to pick it up.
    Queued,
    /// The subprocess is running.
    Running,
    /// Exited zero; `result` holds stdout.
    Completed,
    /// Exited nonzero; `error` holds stderr.
    Error,
    /// Exceeded its wall-clock deadline and was killed.
    Timeout,
}

impl TaskStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }
}

struct CliTask {
    id: String,
    agent: AgentTag,
    operator: OperatorId,
    prompt: String,
    status: TaskStatus,
    log: VecDeque<String>,
    result: Option<String>,
    error: Option<String>,
    submitted_at: Timestamp,
    started_at: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    duration_ms: Option<u64>,
    timeout_sec: u64,
}

impl CliTask {
    fn push_log_line(&mut self, line: String) {
        if self.log.len() >= LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }
}

/// A point-in-time, caller-owned copy of a task's state.
#[derive(Debug, Clone)]
pub struct CliTaskSnapshot {
    /// Opaque task id.
    pub id: String,
    /// Which agent binary this task runs.
    pub agent: AgentTag,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Stdout, once `status == Completed`.
    pub result: Option<String>,
    /// Stderr, once `status` is `Error` or `Timeout`.
    pub error: Option<String>,
    /// Most recent streamed output lines, oldest first.
    pub log: Vec<String>,
    /// When the task was submitted.
    pub submitted_at: Timestamp,
    /// Wall-clock duration once terminal.
    pub duration_ms: Option<u64>,
}

impl From<&CliTask> for CliTaskSnapshot {
    fn from(task: &CliTask) -> Self {
        Self {
            id: task.id.clone(),
            agent: task.agent.clone(),
            status: task.status,
            result: task.result.clone(),
            error: task.error.clone(),
            log: task.log.iter().cloned().collect(),
            submitted_at: task.submitted_at,
            duration_ms: task.duration_ms,
        }
    }
}

/// Name of the environment variable the broker reads an agent's argv
/// template from, e.g. `AURORA_CLI_CODEX_CMD="codex exec"`.
#[must_use]
pub fn command_template_env_var(agent: &AgentTag) -> String {
    format!("AURORA_CLI_{}_CMD", agent.to_string().to_uppercase().replace('-', "_"))
}

/// Read each agent's command template from its environment variable,
/// skipping agents with none configured.
#[must_use]
pub fn load_command_templates_from_env(agents: &[AgentTag]) -> HashMap<AgentTag, String> {
    agents
        .iter()
        .filter_map(|agent| std::env::var(command_template_env_var(agent)).ok().map(|cmd| (agent.clone(), cmd)))
        .collect()
}

struct Ring {
    order: VecDeque<String>,
    tasks: HashMap<String, Arc<Mutex<CliTask>>>,
    capacity: usize,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self { order: VecDeque::new(), tasks: HashMap::new(), capacity }
    }

    fn insert(&mut self, id: String, task: Arc<Mutex<CliTask>>) {
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.tasks.remove(&oldest);
            }
        }
        self.order.push_back(id.clone());
        self.tasks.insert(id, task);
    }

    fn get(&self, id: &str) -> Option<Arc<Mutex<CliTask>>> {
        self.tasks.get(id).cloned()
    }
}

/// The CLI Task Broker.
pub struct CliTaskBroker {
    command_templates: HashMap<AgentTag, String>,
    senders: Mutex<HashMap<AgentTag, mpsc::UnboundedSender<Arc<Mutex<CliTask>>>>>,
    ring: Mutex<Ring>,
    audit: AuditSink,
    report_dir: PathBuf,
    default_timeout_sec: u64,
}

impl CliTaskBroker {
    /// Build a broker. `report_dir` is where per-task report files (and
    /// the codex activity log) are written.
    #[must_use]
    pub fn new(
        command_templates: HashMap<AgentTag, String>,
        audit: AuditSink,
        report_dir: PathBuf,
    ) -> Arc<Self> {
        Self::with_default_timeout_sec(command_templates, audit, report_dir, DEFAULT_TIMEOUT_SEC)
    }

    /// Build a broker whose per-task timeout default (used whenever
    /// [`Self::submit`] is called with `timeout_sec: None`) is
    /// `default_timeout_sec` rather than [`DEFAULT_TIMEOUT_SEC`] —
    /// the operator-configured `[timeouts] cli_task_secs`.
    #[must_use]
    pub fn with_default_timeout_sec(
        command_templates: HashMap<AgentTag, String>,
        audit: AuditSink,
        report_dir: PathBuf,
        default_timeout_sec: u64,
    ) -> Arc<Self> {
        Arc::new(Self {
            command_templates,
            senders: Mutex::new(HashMap::new()),
            ring: Mutex::new(Ring::new(DEFAULT_RING_CAPACITY)),
            audit,
            report_dir,
            default_timeout_sec,
        })
    }

    /// Queue a prompt for `agent` and return its task id immediately.
    /// The subprocess itself runs on that agent's background worker.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsError::AgentNotConfigured`] if no command template
    /// is registered for `agent`.
    pub async fn submit(
        self: &Arc<Self>,
        agent: AgentTag,
        operator: OperatorId,
        prompt: String,
        timeout_sec: Option<u64>,
    ) -> ToolsResult<String> {
        if !self.command_templates.contains_key(&agent) {
            return Err(ToolsError::AgentNotConfigured(agent.to_string()));
        }

        let id = new_id();
        let task = Arc::new(Mutex::new(CliTask {
            id: id.clone(),
            agent: agent.clone(),
            operator,
            prompt,
            status: TaskStatus::Queued,
            log: VecDeque::new(),
            result: None,
            error: None,
            submitted_at: Timestamp::now(),
            started_at: None,
            completed_at: None,
            duration_ms: None,
            timeout_sec: timeout_sec.unwrap_or(self.default_timeout_sec),
        }));

        self.ring.lock().await.insert(id.clone(), Arc::clone(&task));
        self.audit.emit(AuditEvent::system("cli_task.queued", format!("task {id} queued for {agent}")));

        let sender = self.worker_sender(agent).await;
        if sender.send(task).is_err() {
            warn!(task_id = %id, "broker worker gone, task left queued");
        }

        Ok(id)
    }

    async fn worker_sender(
        self: &Arc<Self>,
        agent: AgentTag,
    ) -> mpsc::UnboundedSender<Arc<Mutex<CliTask>>> {
        let mut senders = self.senders.lock().await;
        if let Some(existing) = senders.get(&agent) {
            return existing.clone();
        }

        let (tx, rx) = mpsc::unbounded_channel();
        senders.insert(agent.clone(), tx.clone());
        tokio::spawn(Arc::clone(self).run_worker(agent, rx));
        tx
    }

    async fn run_worker(
        self: Arc<Self>,
        _agent: AgentTag,
        mut rx: mpsc::UnboundedReceiver<Arc<Mutex<CliTask>>>,
    ) {
        while let Some(task) = rx.recv().await {
            self.run_task(task).await;
        }
    }

    async fn run_task(&self, task: Arc<Mutex<CliTask>>) {
        let (id, agent, prompt, timeout_sec) = {
            let mut guard = task.lock().await;
            guard.status = TaskStatus::Running;
            guard.started_at = Some(Timestamp::now());
            (guard.id.clone(), guard.agent.clone(), guard.prompt.clone(), guard.timeout_sec)
        };

        let prompt_hash = sha256_hex(prompt.as_bytes());
        self.audit.emit(
            AuditEvent::system("cli_task.started", format!("task {id} started on {agent}"))
                .with_meta("prompt_hash", prompt_hash.clone()),
        );

        let Some(template) = self.command_templates.get(&agent) else {
            self.finish(&task, TaskStatus::Error, None, Some("agent not configured".to_string())).await;
            return;
        };
        let mut parts = template.split_whitespace();
        let Some(program) = parts.next() else {
            self.finish(&task, TaskStatus::Error, None, Some("empty command template".to_string())).await;
            return;
        };
        let args: Vec<&str> = parts.collect();

        let spawned = Command::new(program)
            .args(&args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(source) => {
                self.finish(&task, TaskStatus::Error, None, Some(source.to_string())).await;
                return;
            },
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(source) = stdin.write_all(prompt.as_bytes()).await {
                warn!(task_id = %id, %source, "failed writing prompt to agent stdin");
            }
        }

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_task = stdout.map(|r| tokio::spawn(collect_lines(r, Arc::clone(&task))));
        let stderr_task = stderr.map(|r| tokio::spawn(collect_lines(r, Arc::clone(&task))));

        let deadline = Duration::from_secs(timeout_sec);
        let wait_result = tokio::time::timeout(deadline, child.wait()).await;

        let stdout_text = match stdout_task {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };
        let stderr_text = match stderr_task {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };

        match wait_result {
            Ok(Ok(status)) if status.success() => {
                self.finish(&task, TaskStatus::Completed, Some(stdout_text), None).await;
            },
            Ok(Ok(_status)) => {
                self.finish(&task, TaskStatus::Error, None, Some(stderr_text)).await;
            },
            Ok(Err(source)) => {
                self.finish(&task, TaskStatus::Error, None, Some(source.to_string())).await;
            },
            Err(_elapsed) => {
                let _ = child.kill().await;
                self.finish(&task, TaskStatus::Timeout, None, Some("wall-clock deadline exceeded".to_string()))
                    .await;
            },
        }
    }

    async fn finish(
        &self,
        task: &Arc<Mutex<CliTask>>,
        status: TaskStatus,
        result: Option<String>,
        error: Option<String>,
    ) {
        let (id, agent, operator, prompt, duration_ms, submitted_at, log) = {
            let mut guard = task.lock().await;
            guard.status = status;
            guard.result = result;
            guard.error = error;
            guard.completed_at = Some(Timestamp::now());
            #[allow(clippy::cast_sign_loss)]
            let duration_ms = guard
                .started_at
                .map(|started| (Timestamp::now().epoch_millis() - started.epoch_millis()).max(0) as u64)
                .unwrap_or(0);
            guard.duration_ms = Some(duration_ms);
            (
                guard.id.clone(),
                guard.agent.clone(),
                guard.operator.clone(),
                guard.prompt.clone(),
                duration_ms,
                guard.submitted_at,
                guard.log.iter().cloned().collect::<Vec<_>>(),
            )
        };

        let prompt_hash = sha256_hex(prompt.as_bytes());
        self.audit.emit(
            AuditEvent::system(
                format!("cli_task.{}", status.as_str()),
                format!("task {id} on {agent} finished as {}", status.as_str()),
            )
            .with_meta("prompt_hash", prompt_hash.clone())
            .with_meta("duration_ms", Value::from(duration_ms))
            .with_meta("operator", operator.to_string()),
        );

        if agent == ACTIVITY_AGENT {
            self.write_codex_activity(&id, &prompt, &prompt_hash, status, duration_ms, &operator, &log).await;
        }

        self.write_report(&id, &agent, &prompt, status, duration_ms, submitted_at, &log).await;
    }

    async fn write_codex_activity(
        &self,
        id: &str,
        prompt: &str,
        prompt_hash: &str,
        status: TaskStatus,
        duration_ms: u64,
        operator: &OperatorId,
        log: &[String],
    ) {
        let summary: String = prompt.split_whitespace().take(10).collect::<Vec<_>>().join(" ");
        let entry = serde_json::json!({
            "timestamp": Timestamp::now(),
            "task_id": id,
            "prompt_hash": prompt_hash,
            "status": status.as_str(),
            "duration_ms": duration_ms,
            "operator": operator.as_str(),
            "prompt_summary": summary,
            "line_count": log.len(),
        });

        if let Err(source) = self.append_jsonl("codex_activity.jsonl", &entry).await {
            warn!(%source, "failed writing codex activity entry");
        }
    }

    async fn append_jsonl(&self, filename: &str, entry: &Value) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.report_dir).await?;
        let mut line = serde_json::to_string(entry).unwrap_or_default();
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.report_dir.join(filename))
            .await?;
        file.write_all(line.as_bytes()).await
    }

    async fn write_report(
        &self,
        id: &str,
        agent: &AgentTag,
        prompt: &str,
        status: TaskStatus,
        duration_ms: u64,
        submitted_at: Timestamp,
        log: &[String],
    ) {
        let task_dir = self.report_dir.join(id);
        if let Err(source) = tokio::fs::create_dir_all(&task_dir).await {
            warn!(%source, task_id = %id, "failed creating task report directory");
            return;
        }

        let report = format!(
            "task {id}\nagent: {agent}\nsubmitted: {submitted_at}\nstatus: {}\nduration_ms: {duration_ms}\n\nprompt:\n{prompt}\n\noutput:\n{}\n",
            status.as_str(),
            log.join("\n"),
        );

        if let Err(source) = tokio::fs::write(task_dir.join("report.txt"), report).await {
            warn!(%source, task_id = %id, "failed writing task report");
        }
    }

    /// Look up a task's current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsError::UnknownTask`] if `id` has aged out of the
    /// in-memory ring or never existed.
    pub async fn status(&self, id: &str) -> ToolsResult<CliTaskSnapshot> {
        let task = self.ring.lock().await.get(id).ok_or(ToolsError::UnknownTask)?;
        let guard = task.lock().await;
        Ok(CliTaskSnapshot::from(&*guard))
    }
}

async fn collect_lines<R>(reader: R, task: Arc<Mutex<CliTask>>) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut full = String::new();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if !full.is_empty() {
                    full.push('\n');
                }
                full.push_str(&line);
                task.lock().await.push_log_line(line);
            },
            _ => break,
        }
    }
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn broker() -> Arc<CliTaskBroker> {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditSink::open(dir.path(), "cli_broker").await.unwrap();
        let mut templates = HashMap::new();
        templates.insert(AgentTag::Codex, "bash -c".to_string());
        CliTaskBroker::new(templates, audit, dir.path().join("reports"))
    }

    #[tokio::test]
    async fn unknown_task_reports_unknown() {
        let broker = broker().await;
        let result = broker.status("nonexistent").await;
        assert!(matches!(result, Err(ToolsError::UnknownTask)));
    }

    #[tokio::test]
    async fn submit_rejects_unconfigured_agent() {
        let broker = broker().await;
        let result = broker.submit(AgentTag::Claude, OperatorId::system(), "hi".into(), None).await;
        assert!(matches!(result, Err(ToolsError::AgentNotConfigured(_))));
    }

    #[tokio::test]
    async fn command_template_env_var_uppercases_and_prefixes() {
        assert_eq!(command_template_env_var(&AgentTag::Codex), "AURORA_CLI_CODEX_CMD");
    }

    #[tokio::test]
    async fn submitted_task_eventually_completes() {
        let broker = broker().await;
        let id = broker
            .submit(AgentTag::Codex, OperatorId::system(), "echo hello".into(), Some(5))
            .await
            .unwrap();

        for _ in 0..50 {
            let snapshot = broker.status(&id).await.unwrap();
            if snapshot.status != TaskStatus::Queued && snapshot.status != TaskStatus::Running {
                assert_eq!(snapshot.status, TaskStatus::Completed);
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("task never reached a terminal state");
    }

    #[tokio::test]
    async fn per_task_timeout_override_is_honored() {
        let broker = broker().await;
        // Default timeout is 300s; a 1s override must still time out a
        // command that sleeps far longer than that override.
        let id = broker
            .submit(AgentTag::Codex, OperatorId::system(), "sleep 30".into(), Some(1))
            .await
            .unwrap();

        for _ in 0..50 {
            let snapshot = broker.status(&id).await.unwrap();
            if snapshot.status != TaskStatus::Queued && snapshot.status != TaskStatus::Running {
                assert_eq!(snapshot.status, TaskStatus::Timeout);
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("task never reached a terminal state");
    }
}
