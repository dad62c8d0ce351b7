//! Token storage and management

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Windows Live does not report a lifetime for refresh tokens; they are
/// treated as valid for this long after issue.
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 14;

/// Stored token with an optional expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn new(token: String, expires_in_secs: Option<u64>) -> Self {
        let expires_at = expires_in_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Self { token, expires_at }
    }

    /// Refresh token issued now, valid for [`REFRESH_TOKEN_LIFETIME_DAYS`].
    pub fn refresh(token: String) -> Self {
        Self {
            token,
            expires_at: Some(Utc::now() + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS)),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            // Consider expired if less than 5 minutes remaining
            Some(exp) => Utc::now() + Duration::minutes(5) >= exp,
            None => false,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.token.is_empty() && !self.is_expired()
    }
}

/// Access/refresh token pair produced by a grant or a two-factor handshake
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPair {
    pub access_token: StoredToken,
    pub refresh_token: StoredToken,
}

/// On-disk token file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenState {
    pub access_token: Option<StoredToken>,
    pub refresh_token: Option<StoredToken>,
    /// Account identifier reported by the last grant
    pub user_id: Option<String>,
}

impl TokenState {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse token file")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("Failed to create token directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize tokens")?;
        fs::write(path, content).context("Failed to write token file")?;

        // Set restrictive permissions on token file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, perms).context("Failed to set token file permissions")?;
        }

        Ok(())
    }

    pub fn has_valid_refresh_token(&self) -> bool {
        self.refresh_token.as_ref().is_some_and(StoredToken::is_valid)
    }

    pub fn install(&mut self, pair: TokenPair) {
        self.access_token = Some(pair.access_token);
        self.refresh_token = Some(pair.refresh_token);
    }
}
