//! Configuration system for push-guard.
//!
//! Supports layered configuration from multiple sources:
//! 1. Environment variables (highest priority, presentation only)
//! 2. Explicit config file (`--config`)
//! 3. Project config (.push-guard.toml in repo root)
//! 4. User config (~/.config/push-guard/config.toml)
//! 5. System config (/etc/push-guard/config.toml)
//! 6. Compiled defaults (lowest priority)
//!
//! An explicit config file replaces layers 3-5 rather than merging with them.
//! Only an explicit file may set `[protected]`; the implicit layers are
//! controlled by whoever owns the machine or the repository being pushed, so
//! their `[protected]` section is dropped with a warning. Unreadable or
//! invalid files are skipped with a warning.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::guard::{DEFAULT_PROTECTED_BRANCH, DEFAULT_PROTECTED_NAME, DEFAULT_PROTECTED_REMOTE};
use crate::hook::DEFAULT_MAX_INPUT_BYTES;
use crate::logging::LoggingConfig;

/// Environment variable prefix for all config options.
pub const ENV_PREFIX: &str = "PUSH_GUARD";

/// Default config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Project-level config file name.
const PROJECT_CONFIG_NAME: &str = ".push-guard.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    /// The protected remote and branch.
    pub protected: ProtectedConfig,

    /// Decision log settings.
    pub logging: LoggingConfig,
}

/// General configuration options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Color output mode: "auto", "always", "never".
    pub color: Option<String>,

    /// Upper bound on stdin size (bytes).
    pub max_input_bytes: Option<usize>,
}

impl GeneralConfig {
    #[must_use]
    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or("auto")
    }

    #[must_use]
    pub fn max_input_bytes(&self) -> usize {
        self.max_input_bytes.unwrap_or(DEFAULT_MAX_INPUT_BYTES)
    }
}

/// Which repository is protected, and which branch it accepts.
///
/// Unset fields fall back to the compiled defaults, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectedConfig {
    /// Remote location (URL or path), compared case-insensitively.
    pub remote: Option<String>,
    /// Full ref name accepted on the protected remote.
    pub branch: Option<String>,
    /// Repository name shown in the block message.
    pub name: Option<String>,
}

impl ProtectedConfig {
    #[must_use]
    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or(DEFAULT_PROTECTED_REMOTE)
    }

    #[must_use]
    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_PROTECTED_BRANCH)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_PROTECTED_NAME)
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.remote.is_some() || self.branch.is_some() || self.name.is_some()
    }
}

impl Config {
    /// Load configuration from all sources, merging them in priority order.
    #[must_use]
    pub fn load(explicit: Option<&Path>) -> Self {
        let mut config = Self::default();

        if let Some(path) = explicit {
            if let Some(file_config) = Self::load_from_file(path) {
                config.merge(file_config);
            }
        } else {
            let project = env::current_dir()
                .ok()
                .and_then(|cwd| find_project_config(&cwd));
            let implicit = [system_config_path(), user_config_path(), project];
            for path in implicit.iter().flatten() {
                if let Some(layer) = Self::load_from_file(path) {
                    config.merge(layer.without_protected(path));
                }
            }
        }

        config.apply_env_overrides(|key| env::var(key).ok());
        config
    }

    /// Load configuration from a specific file.
    ///
    /// Missing files are silent; unreadable or malformed ones are logged.
    #[must_use]
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config file");
                return None;
            }
        };
        match toml::from_str(&content) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config file");
                Some(config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Drop `[protected]` from an implicit layer, warning if it was set.
    #[must_use]
    pub fn without_protected(mut self, path: &Path) -> Self {
        if self.protected.is_set() {
            warn!(
                path = %path.display(),
                "ignoring [protected] outside --config; the built-in protected remote stays in force"
            );
            self.protected = ProtectedConfig::default();
        }
        self
    }

    /// Merge another config into this one. Every field the other layer sets
    /// wins, including values equal to the defaults.
    pub fn merge(&mut self, other: Self) {
        if other.general.color.is_some() {
            self.general.color = other.general.color;
        }
        if other.general.max_input_bytes.is_some() {
            self.general.max_input_bytes = other.general.max_input_bytes;
        }

        if other.protected.remote.is_some() {
            self.protected.remote = other.protected.remote;
        }
        if other.protected.branch.is_some() {
            self.protected.branch = other.protected.branch;
        }
        if other.protected.name.is_some() {
            self.protected.name = other.protected.name;
        }

        self.logging.merge(other.logging);
    }

    /// Apply environment variable overrides.
    ///
    /// Only presentation settings are read from the environment; nothing
    /// here can change a decision.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // PUSH_GUARD_COLOR=never
        if let Some(color) = lookup(&format!("{ENV_PREFIX}_COLOR")) {
            self.general.color = Some(color);
        }
    }
}

fn system_config_path() -> Option<PathBuf> {
    Some(PathBuf::from("/etc/push-guard").join(CONFIG_FILE_NAME))
}

fn user_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("push-guard").join(CONFIG_FILE_NAME))
}

/// Walk up from `start` looking for `.push-guard.toml`, stopping at the
/// repository root (the first directory containing `.git`).
#[must_use]
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let config_path = current.join(PROJECT_CONFIG_NAME);
        if config_path.is_file() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}
