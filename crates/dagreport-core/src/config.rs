use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReportError, Result};

/// Environment variable consulted when `server_url` is not configured.
pub const SERVER_URL_ENV: &str = "SERVER_URL";

/// Process-wide reporter configuration, owned by the host application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Base URL of the web UI, used to build history links.
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub ntfy: Option<NtfyConfig>,
    #[serde(default)]
    pub mail: Option<MailSpoolConfig>,
}

/// ntfy-compatible push server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NtfyConfig {
    /// Endpoint that accepts JSON publishes (e.g., "https://ntfy.sh").
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Local hand-off directory picked up by the host's mail transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSpoolConfig {
    #[serde(default = "default_spool_dir")]
    pub spool_dir: String,
}

impl Default for MailSpoolConfig {
    fn default() -> Self {
        Self {
            spool_dir: default_spool_dir(),
        }
    }
}

fn default_spool_dir() -> String { "~/.dagreport/outbox".to_string() }

impl ReporterConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ReportError::ConfigNotFound(path.display().to_string()))?;

        // Expand ${ENV_VAR} references
        let expanded = expand_env_vars(&content);

        let mut config: Self =
            toml::from_str(&expanded).map_err(|e| ReportError::Config(e.to_string()))?;
        config.server_url = config.resolve_server_url();
        Ok(config)
    }

    /// Configured base URL, or `$SERVER_URL` when unset. Trailing slashes are dropped.
    pub fn resolve_server_url(&self) -> String {
        let url = if self.server_url.is_empty() {
            debug!("server_url not configured, falling back to {}", SERVER_URL_ENV);
            std::env::var(SERVER_URL_ENV).unwrap_or_default()
        } else {
            self.server_url.clone()
        };
        url.trim_end_matches('/').to_string()
    }

    /// Resolve the mail spool directory (expand ~).
    pub fn spool_dir(&self) -> Option<PathBuf> {
        let dir = &self.mail.as_ref()?.spool_dir;
        if let Some(rest) = dir.strip_prefix("~/") {
            if let Some(home) = dirs_home() {
                return Some(home.join(rest));
            }
        }
        Some(PathBuf::from(dir))
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    // Keep original if env var not set
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
