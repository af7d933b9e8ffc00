//! Connection settings resolution
//!
//! Settings come from an optional TOML file first, then from the environment
//! and the command line (clap merges those two, flags winning over variables).

use anyhow::{bail, Context, Result};
use record_import_client::{ClientConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::cli::ConnectionArgs;

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub api_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("record-import").join("config.toml"))
}

/// Load the settings file. An explicitly named file must exist; the default
/// location is skipped silently when absent.
pub async fn load_file_settings(explicit: Option<&Path>) -> Result<FileSettings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileSettings::default()),
        },
    };

    log::debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_file_settings(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

pub fn parse_file_settings(content: &str) -> Result<FileSettings> {
    Ok(toml::from_str(content)?)
}

pub fn resolve(file: FileSettings, args: &ConnectionArgs) -> Result<ClientConfig> {
    let api_url = match args.api_url.clone().or(file.api_url) {
        Some(url) if !url.trim().is_empty() => url,
        _ => bail!("API URL is not defined. Use --api-url, RECORD_IMPORT_API_URL or api_url in config.toml"),
    };

    Ok(ClientConfig {
        api_url,
        username: args.api_username.clone().or(file.username),
        password: args.api_password.clone().or(file.password),
        user_agent: args
            .user_agent
            .clone()
            .or(file.user_agent)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        timeout_secs: args
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    })
}
