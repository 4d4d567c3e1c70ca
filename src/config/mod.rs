//! Configuration module.
//!
//! Settings resolve in layers: built-in defaults, then the TOML config
//! file, then `CHATLIST_*` environment variables, then CLI flags.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};

/// Resolve the full configuration from every layer.
///
/// # Errors
///
/// Returns `ConfigError` if a config file exists but cannot be read or parsed.
pub fn resolve(
    config_path: Option<std::path::PathBuf>,
    reverse_override: Option<bool>,
    page_limit_override: Option<usize>,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let merged = merge_config(file);
    let with_env = apply_env_overrides(merged);
    Ok(apply_cli_overrides(
        with_env,
        reverse_override,
        page_limit_override,
    ))
}
