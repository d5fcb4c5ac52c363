//! Diagnostics and structured logging for push decisions.
//!
//! Two separate outputs:
//! - `tracing` diagnostics on stderr, filtered by `PUSH_GUARD_LOG`
//!   (defaults to `warn`, or `debug` when verbose).
//! - An optional decision log file, one line per evaluated push, in text or
//!   JSON format.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::guard::{Decision, PushRequest};

/// Environment variable holding a `tracing` filter directive.
pub const ENV_LOG_FILTER: &str = "PUSH_GUARD_LOG";

/// Install the stderr `tracing` subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

// ============================================================================
// Configuration Types
// ============================================================================

/// Decision log configuration (`[logging]` section).
///
/// Every field is optional so that a later config layer can set any of them,
/// defaults included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether decision logging is enabled.
    pub enabled: Option<bool>,
    /// Path to log file. Supports ~ expansion.
    pub file: Option<String>,
    /// Output format: "text" or "json".
    pub format: Option<LogFormat>,
    /// Events to log.
    pub events: Option<LogEventFilter>,
}

impl LoggingConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    #[must_use]
    pub fn format(&self) -> LogFormat {
        self.format.unwrap_or_default()
    }

    #[must_use]
    pub fn events(&self) -> LogEventFilter {
        self.events.unwrap_or_default()
    }

    /// Merge a higher-priority layer into this one.
    pub fn merge(&mut self, other: Self) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.file.is_some() {
            self.file = other.file;
        }
        if other.format.is_some() {
            self.format = other.format;
        }
        if other.events.is_some() {
            self.events = other.events;
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Filter for which decisions to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEventFilter {
    pub block: bool,
    pub allow: bool,
}

impl Default for LogEventFilter {
    fn default() -> Self {
        Self {
            block: true,
            allow: false,
        }
    }
}

// ============================================================================
// Log Entry
// ============================================================================

/// A structured log entry for one push decision.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub decision: String,
    pub remote_name: String,
    pub remote_location: String,
    pub local_ref: String,
    pub remote_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LogEntry {
    #[must_use]
    pub fn new(request: &PushRequest, decision: &Decision) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            decision: decision.label().to_string(),
            remote_name: request.remote_name.clone(),
            remote_location: request.remote_location.clone(),
            local_ref: request.local_ref.clone(),
            remote_ref: request.remote_ref.clone(),
            reason: decision.reason().map(str::to_string),
        }
    }

    /// Format as text log line.
    #[must_use]
    pub fn format_text(&self) -> String {
        let mut line = format!(
            "[{}] {} {} ({}) {} -> {}",
            self.timestamp,
            self.decision.to_uppercase(),
            self.remote_name,
            self.remote_location,
            self.local_ref,
            self.remote_ref,
        );
        if let Some(ref reason) = self.reason {
            line.push_str(" -- ");
            line.push_str(reason);
        }
        line
    }

    /// Format as JSON line.
    #[must_use]
    pub fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// ============================================================================
// Logger
// ============================================================================

/// Appends push decisions to the configured log file.
pub struct DecisionLogger {
    format: LogFormat,
    events: LogEventFilter,
    file: File,
}

impl DecisionLogger {
    /// Create a logger, or `None` when logging is disabled, no file is
    /// configured, or the file cannot be opened.
    #[must_use]
    pub fn new(config: &LoggingConfig) -> Option<Self> {
        if !config.is_enabled() {
            return None;
        }
        let path = expand_tilde(config.file.as_deref()?);
        let file = match open_log_file(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot open decision log");
                return None;
            }
        };
        Some(Self {
            format: config.format(),
            events: config.events(),
            file,
        })
    }

    /// Log one decision. Write failures are ignored.
    pub fn log(&self, request: &PushRequest, decision: &Decision) {
        if !self.should_log(decision) {
            return;
        }
        let entry = LogEntry::new(request, decision);
        let line = match self.format {
            LogFormat::Text => entry.format_text(),
            LogFormat::Json => entry.format_json(),
        };
        // One write per line keeps appends from interleaving.
        let mut file = &self.file;
        let _ = file.write_all(format!("{line}\n").as_bytes());
    }

    const fn should_log(&self, decision: &Decision) -> bool {
        match decision {
            Decision::Allow => self.events.allow,
            Decision::Block { .. } => self.events.block,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(remote_ref: &str) -> PushRequest {
        PushRequest {
            remote_name: "origin".to_string(),
            remote_location: "git@github.com:yugabyte/yugabyte-db.git".to_string(),
            local_ref: "refs/heads/feature".to_string(),
            local_sha1: "aaaa".to_string(),
            remote_ref: remote_ref.to_string(),
            remote_sha1: "bbbb".to_string(),
        }
    }

    fn blocked() -> Decision {
        Decision::Block {
            reason: "Cannot push to yugabyte repo".to_string(),
        }
    }

    #[test]
    fn text_format_includes_refs_and_reason() {
        let entry = LogEntry::new(&request("refs/heads/feature"), &blocked());
        let line = entry.format_text();
        assert!(line.contains("BLOCK origin"));
        assert!(line.contains("refs/heads/feature -> refs/heads/feature"));
        assert!(line.ends_with("-- Cannot push to yugabyte repo"));
    }

    #[test]
    fn json_format_omits_reason_on_allow() {
        let entry = LogEntry::new(&request("refs/heads/master"), &Decision::Allow);
        let value: serde_json::Value = serde_json::from_str(&entry.format_json()).unwrap();
        assert_eq!(value["decision"], "allow");
        assert_eq!(value["remote_ref"], "refs/heads/master");
        assert!(value.get("reason").is_none());
    }

    #[test]
    fn logger_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.log");
        let config = LoggingConfig {
            enabled: Some(true),
            file: Some(path.to_string_lossy().to_string()),
            ..LoggingConfig::default()
        };
        for _ in 0..2 {
            let logger = DecisionLogger::new(&config).unwrap();
            logger.log(&request("refs/heads/feature"), &blocked());
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().all(|l| l.contains(" BLOCK origin ")));
    }

    #[test]
    fn disabled_logger_is_none() {
        let config = LoggingConfig {
            file: Some("/tmp/never-used.log".to_string()),
            ..LoggingConfig::default()
        };
        assert!(DecisionLogger::new(&config).is_none());
    }

    #[test]
    fn logger_writes_only_filtered_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("decisions.log");
        let config = LoggingConfig {
            enabled: Some(true),
            file: Some(path.to_string_lossy().to_string()),
            format: Some(LogFormat::Json),
            events: None,
        };
        let logger = DecisionLogger::new(&config).unwrap();

        logger.log(&request("refs/heads/master"), &Decision::Allow);
        logger.log(&request("refs/heads/feature"), &blocked());

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["decision"], "block");
        assert_eq!(value["reason"], "Cannot push to yugabyte repo");
    }

    #[test]
    fn merge_keeps_lower_layer_file_when_unset() {
        let mut base = LoggingConfig {
            enabled: Some(true),
            file: Some("/var/log/push-guard.log".to_string()),
            ..LoggingConfig::default()
        };
        base.merge(LoggingConfig {
            format: Some(LogFormat::Json),
            ..LoggingConfig::default()
        });
        assert!(base.is_enabled());
        assert_eq!(base.file.as_deref(), Some("/var/log/push-guard.log"));
        assert_eq!(base.format(), LogFormat::Json);
    }

    #[test]
    fn merge_can_disable_logging_again() {
        let mut base = LoggingConfig {
            enabled: Some(true),
            format: Some(LogFormat::Json),
            ..LoggingConfig::default()
        };
        base.merge(LoggingConfig {
            enabled: Some(false),
            format: Some(LogFormat::Text),
            ..LoggingConfig::default()
        });
        assert!(!base.is_enabled());
        assert_eq!(base.format(), LogFormat::Text);
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/tmp/x.log"), PathBuf::from("/tmp/x.log"));
    }
}
