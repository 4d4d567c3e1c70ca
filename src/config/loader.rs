//! Configuration file loading with precedence handling.

use crate::state::pagination::PaginationConfig;
use crate::state::session::ListOptions;
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CHATLIST_CONFIG";
/// Environment variable overriding `page_limit`.
pub const PAGE_LIMIT_ENV: &str = "CHATLIST_PAGE_LIMIT";
/// Environment variable overriding `utc_offset_minutes`.
pub const UTC_OFFSET_ENV: &str = "CHATLIST_UTC_OFFSET";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A value parsed but is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/chatlist/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Newest message at the bottom (slot 0).
    #[serde(default)]
    pub reverse: Option<bool>,

    /// Messages per pagination request.
    #[serde(default)]
    pub page_limit: Option<usize>,

    /// Slots before a loader that already trigger pagination.
    #[serde(default)]
    pub pagination_lookahead: Option<usize>,

    /// Viewport fraction left in front of a jump target.
    #[serde(default)]
    pub jump_leading_edge: Option<f64>,

    /// Viewer's UTC offset in minutes, used for date dividers.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Newest message at slot 0.
    pub reverse: bool,
    /// Messages per pagination request, at least 1.
    pub page_limit: usize,
    /// Slots before a loader that already trigger pagination.
    pub pagination_lookahead: usize,
    /// Viewport fraction left in front of a jump target, in `(0, 1)`.
    pub jump_leading_edge: f64,
    /// Viewer's UTC offset in minutes.
    pub utc_offset_minutes: i32,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let pagination = PaginationConfig::default();
        Self {
            reverse: true,
            page_limit: pagination.page_limit,
            pagination_lookahead: pagination.lookahead,
            jump_leading_edge: 0.1,
            utc_offset_minutes: 0,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Check ranges and build the options a session runs with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero page limit, a jump
    /// leading edge outside `(0, 1)` or a UTC offset of a day or more.
    pub fn list_options(&self) -> Result<ListOptions, ConfigError> {
        if self.page_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.jump_leading_edge > 0.0 && self.jump_leading_edge < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "jump_leading_edge",
                reason: format!("{} is outside (0, 1)", self.jump_leading_edge),
            });
        }
        let time_zone = FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "utc_offset_minutes",
                reason: format!("{} is not a valid offset", self.utc_offset_minutes),
            })?;

        Ok(ListOptions {
            reverse: self.reverse,
            pagination: PaginationConfig {
                page_limit: self.page_limit,
                lookahead: self.pagination_lookahead,
            },
            jump_leading_edge: self.jump_leading_edge,
            time_zone,
        })
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/chatlist/chatlist.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("chatlist").join("chatlist.log")
    } else {
        PathBuf::from("chatlist.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/chatlist/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatlist").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CHATLIST_CONFIG` environment variable
/// 3. Default path `~/.config/chatlist/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CHATLIST_PAGE_LIMIT`: Override page limit
/// - `CHATLIST_UTC_OFFSET`: Override UTC offset in minutes
///
/// Unparseable values are logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(PAGE_LIMIT_ENV) {
        match raw.trim().parse() {
            Ok(limit) => config.page_limit = limit,
            Err(_) => tracing::warn!(var = PAGE_LIMIT_ENV, value = %raw, "ignoring invalid value"),
        }
    }

    if let Ok(raw) = std::env::var(UTC_OFFSET_ENV) {
        match raw.trim().parse() {
            Ok(offset) => config.utc_offset_minutes = offset,
            Err(_) => tracing::warn!(var = UTC_OFFSET_ENV, value = %raw, "ignoring invalid value"),
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        reverse: config.reverse.unwrap_or(defaults.reverse),
        page_limit: config.page_limit.unwrap_or(defaults.page_limit),
        pagination_lookahead: config
            .pagination_lookahead
            .unwrap_or(defaults.pagination_lookahead),
        jump_leading_edge: config.jump_leading_edge.unwrap_or(defaults.jump_leading_edge),
        utc_offset_minutes: config
            .utc_offset_minutes
            .unwrap_or(defaults.utc_offset_minutes),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    reverse_override: Option<bool>,
    page_limit_override: Option<usize>,
) -> ResolvedConfig {
    if let Some(reverse) = reverse_override {
        config.reverse = reverse;
    }

    if let Some(limit) = page_limit_override {
        config.page_limit = limit;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
