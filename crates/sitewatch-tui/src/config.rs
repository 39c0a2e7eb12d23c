//! Configuration loading: TOML file + `SITEWATCH_*` environment variables,
//! with CLI flags applied on top by `main`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Resolved configuration for the TUI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL (e.g. `http://127.0.0.1:8080`). Required — there
    /// is no sensible default host.
    pub url: Option<String>,

    /// HTTP request timeout in seconds. This is the client-side limit on
    /// whole requests, distinct from the backend's per-probe timeout.
    pub timeout_secs: u64,

    /// Log file path. Logs never go to stdout — that would corrupt the
    /// terminal UI.
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 30,
            log_file: PathBuf::from("/tmp/sitewatch-tui.log"),
        }
    }
}

/// Default config file location: `<config dir>/sitewatch/config.toml`.
fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sitewatch").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration: defaults, then the TOML file (explicit path or the
/// platform default location), then `SITEWATCH_*` environment variables.
pub fn load(config_file: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    match config_file {
        Some(path) => figment = figment.merge(Toml::file(path)),
        None => {
            if let Some(path) = default_config_file() {
                figment = figment.merge(Toml::file(path));
            }
        }
    }

    Ok(figment.merge(Env::prefixed("SITEWATCH_")).extract()?)
}
