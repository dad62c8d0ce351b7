//! Configuration and default paths

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default maximum number of lines kept by the log pane.
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

/// Default cap on nested views.
pub const DEFAULT_MAX_VIEW_DEPTH: usize = 64;

/// File name of the token store inside the data directory.
const TOKENS_FILE_NAME: &str = "tokens.json";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthSettings,
    pub ui: UiSettings,
}

/// Windows Live endpoints and client parameters used by the login manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// OAuth2 client ID (public client)
    pub client_id: String,
    /// Authorization endpoint (required by the OAuth2 client, not visited)
    pub authorize_url: String,
    /// Token endpoint for password and refresh grants
    pub token_url: String,
    /// Scope requested on every grant
    pub scope: String,
    /// Endpoint asked to deliver a one-time code for a two-factor method
    pub otc_url: String,
    /// Endpoint that completes a two-factor challenge
    pub verify_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            client_id: "0000000048093EE3".to_string(),
            authorize_url: "https://login.live.com/oauth20_authorize.srf".to_string(),
            token_url: "https://login.live.com/oauth20_token.srf".to_string(),
            scope: "service::user.auth.xboxlive.com::MBI_SSL".to_string(),
            otc_url: "https://login.live.com/pp1600/GetOneTimeCode.srf".to_string(),
            verify_url: "https://login.live.com/ppsecure/post.srf".to_string(),
        }
    }
}

/// Terminal UI limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Maximum number of entries retained by the log pane
    pub log_capacity: usize,
    /// Maximum depth of the view stack
    pub max_view_depth: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            max_view_depth: DEFAULT_MAX_VIEW_DEPTH,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "xbox-webapi", "xbox-webapi")
}

/// Default token file location: `<data dir>/tokens.json`, or `tokens.json`
/// in the working directory when no home directory can be determined.
pub fn default_tokens_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(TOKENS_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(TOKENS_FILE_NAME))
}

impl Config {
    /// Get config file path, if a home directory is known
    fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_or_default(Self::config_path().as_deref())
    }

    /// Defaults when there is no config location at all.
    fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                tracing::debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }
}
