use crate::models::permission::PermissionLevel;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub permissions: PermissionsConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub logging: LoggingConfig,
    pub bootstrap: Option<BootstrapConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionsConfig {
    /// Highest action an unauthenticated visitor may perform
    #[serde(default)]
    pub anon_permission: PermissionLevel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    #[serde(default = "default_locale")]
    pub default: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Sessions untouched for this long are dropped
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Append JSON logs to this file instead of stdout
    pub path: Option<PathBuf>,
    #[serde(default = "default_console")]
    pub console: bool,
}

/// Initial administrator, created only while the users table is empty
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: default_locale(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            idle_timeout: default_idle_timeout(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_cookie_name() -> String {
    "calendar_session".to_string()
}

fn default_idle_timeout() -> u64 {
    86400
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.database.path.as_os_str().is_empty() {
            bail!("database path must not be empty");
        }

        if self.locale.default.is_empty() {
            bail!("default locale must not be empty");
        }

        let cookie = &self.session.cookie_name;
        if cookie.is_empty()
            || !cookie
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            bail!(
                "Invalid session cookie name '{}'. Use letters, digits, '_' or '-'",
                cookie
            );
        }

        if self.session.idle_timeout == 0 {
            bail!("session idle_timeout must be greater than 0");
        }

        if self.session.sweep_interval == 0 {
            bail!("session sweep_interval must be greater than 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        if let Some(bootstrap) = &self.bootstrap {
            if bootstrap.admin_username.is_empty() {
                bail!("bootstrap admin_username must not be empty");
            }
            if bootstrap.admin_password.len() < 8 {
                bail!("bootstrap admin_password must be at least 8 characters");
            }
        }

        Ok(())
    }
}
