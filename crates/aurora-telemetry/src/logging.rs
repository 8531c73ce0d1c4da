//! Logging setup: `tracing` + `tracing-subscriber`, configured once at
//! binary startup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::error::{TelemetryError, TelemetryResult};

/// Output shape for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable (interactive terminal use).
    Pretty,
    /// Single-line, human-readable (default).
    Compact,
    /// One JSON object per line (ingestion by the external dashboards).
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone)]
pub enum LogTarget {
    /// The process's stderr.
    Stderr,
    /// A file path, opened in append mode.
    File(std::path::PathBuf),
}

/// Logging configuration built up with a fluent API before calling
/// [`setup_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    level: String,
    format: LogFormat,
    target: LogTarget,
    directives: Vec<String>,
}

impl LogConfig {
    /// Start from a base level (`"info"`, `"debug"`, ...).
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::Compact,
            target: LogTarget::Stderr,
            directives: Vec::new(),
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Redirect output to a file instead of stderr.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Add an extra `EnvFilter` directive (e.g. `"aurora_llm=trace"`),
    /// layered on top of the base level.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        let mut filter = EnvFilter::try_new(&self.level)
            .map_err(|e| TelemetryError::ConfigError(e.to_string()))?;
        for directive in &self.directives {
            filter = filter.add_directive(
                directive
                    .parse()
                    .map_err(|e: tracing_subscriber::filter::ParseError| {
                        TelemetryError::ConfigError(e.to_string())
                    })?,
            );
        }
        Ok(filter)
    }
}

/// Install a global `tracing` subscriber from `config`.
///
/// Safe to call once per process; a second call returns
/// [`TelemetryError::InitError`] rather than panicking, since test
/// binaries may construct more than one `LogConfig` across modules.
///
/// # Errors
///
/// Returns an error if `config`'s directives are malformed, the target
/// file cannot be opened, or a subscriber is already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;
    let registry = Registry::default().with(filter);

    let writer: Box<dyn Fn() -> Box<dyn std::io::Write + Send> + Send + Sync> = match &config.target
    {
        LogTarget::Stderr => Box::new(|| Box::new(std::io::stderr())),
        LogTarget::File(path) => {
            let path = path.clone();
            Box::new(move || {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .expect("audit log target file");
                Box::new(file)
            })
        }
    };

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(writer))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::InitError(e.to_string()))
}

/// `setup_logging` with the common default: compact output at `info`,
/// reading overrides from `RUST_LOG` via the base level string.
///
/// # Errors
///
/// See [`setup_logging`].
pub fn setup_default_logging() -> TelemetryResult<()> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    setup_logging(&LogConfig::new(level))
}
