//! Authentication seams for the Xbox Live login flow
//!
//! The UI only talks to an [`AuthManager`]: it asks it to authenticate and
//! receives an [`AuthOutcome`]. When the service demands a second factor the
//! outcome carries a [`TwoFactorChallenge`], from which the manager builds a
//! [`TwoFactorHandshake`] that collects the user's proof and one-time code.

pub mod error;
pub mod live;
pub mod tokens;
pub mod two_factor;

use std::fmt;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

pub use error::AuthError;
pub use live::LiveAuthManager;
pub use tokens::{StoredToken, TokenPair, TokenState};
pub use two_factor::LiveTwoFactor;

/// Email address and password entered in the login form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of an authenticate call.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Success,
    TwoFactorRequired(TwoFactorChallenge),
    Failed(String),
}

/// Verification method kinds offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u8")]
pub enum TwoFactorMethod {
    Unknown,
    Email,
    Sms,
    Voice,
    TotpAuthenticator,
    TotpAuthenticatorV2,
}

impl From<u8> for TwoFactorMethod {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Email,
            2 => Self::Sms,
            3 => Self::Voice,
            10 => Self::TotpAuthenticator,
            14 => Self::TotpAuthenticatorV2,
            _ => Self::Unknown,
        }
    }
}

impl TwoFactorMethod {
    /// Prompt asking the user to confirm the destination a code is sent to.
    /// Authenticator apps need no such proof.
    pub fn verification_prompt(&self, display: &str) -> Option<String> {
        match self {
            Self::Email => Some(format!(
                "Enter the full email address ({}) to receive a code",
                display
            )),
            Self::Sms | Self::Voice => Some(format!(
                "Enter the last four digits of the phone number ({})",
                display
            )),
            Self::TotpAuthenticator | Self::TotpAuthenticatorV2 | Self::Unknown => None,
        }
    }

    /// Whether the service delivers a code out-of-band for this method.
    pub fn delivers_code(&self) -> bool {
        matches!(self, Self::Email | Self::Sms | Self::Voice)
    }

    /// Whether the user has to type a one-time code. The V2 authenticator
    /// completes by approval in the app.
    pub fn needs_otc(&self) -> bool {
        self.delivers_code() || *self == Self::TotpAuthenticator
    }
}

impl fmt::Display for TwoFactorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "Unknown",
            Self::Email => "Email",
            Self::Sms => "SMS",
            Self::Voice => "Voice",
            Self::TotpAuthenticator => "TOTPAuthenticator",
            Self::TotpAuthenticatorV2 => "TOTPAuthenticatorV2",
        };
        f.write_str(name)
    }
}

/// One verification strategy from a two-factor challenge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthStrategy {
    #[serde(rename = "type", default = "unknown_method")]
    pub kind: TwoFactorMethod,
    #[serde(default)]
    pub display: String,
    /// Opaque server data echoed back when the strategy is used.
    #[serde(default)]
    pub data: String,
}

fn unknown_method() -> TwoFactorMethod {
    TwoFactorMethod::Unknown
}

impl AuthStrategy {
    /// Label shown in the method choice list.
    pub fn label(&self) -> String {
        format!("{}, Name: {}", self.kind, self.display)
    }
}

/// Server challenge returned when a second factor is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TwoFactorChallenge {
    #[serde(rename = "flowToken", default)]
    pub flow_token: String,
    #[serde(default)]
    pub strategies: Vec<AuthStrategy>,
}

/// The login manager: token state, persistence and the authenticate call.
#[async_trait]
pub trait AuthManager: Send {
    /// Replace in-memory token state with the contents of `path`.
    fn load(&mut self, path: &Path) -> Result<()>;

    /// Persist token state to `path`.
    fn save(&self, path: &Path) -> Result<()>;

    fn has_valid_refresh_token(&self) -> bool;

    fn is_authenticated(&self) -> bool;

    /// Install tokens obtained outside the authenticate call.
    fn install_tokens(&mut self, tokens: TokenPair);

    /// Authenticate with `credentials`, or silently from stored tokens when
    /// `None`. `do_refresh` prefers refreshing a valid refresh token.
    async fn authenticate(
        &mut self,
        credentials: Option<Credentials>,
        do_refresh: bool,
    ) -> AuthOutcome;

    fn begin_two_factor(&self, challenge: TwoFactorChallenge) -> Box<dyn TwoFactorHandshake>;
}

/// Per-challenge second-factor exchange.
#[async_trait]
pub trait TwoFactorHandshake: Send {
    fn verification_prompt(&self, index: usize) -> Option<String>;

    /// Submit `proof` for the chosen method and report whether a one-time
    /// code must be entered next.
    async fn check_otc(&mut self, index: usize, proof: Option<&str>) -> Result<bool, AuthError>;

    async fn authenticate(
        &mut self,
        index: usize,
        proof: Option<&str>,
        otc: Option<&str>,
    ) -> Result<TokenPair, AuthError>;
}

/// Load stored tokens and decide whether a full interactive login is needed.
///
/// Load errors are logged at debug level and treated as "no tokens".
pub fn load_stored_tokens(manager: &mut dyn AuthManager, path: &Path) -> bool {
    if let Err(e) = manager.load(path) {
        tracing::debug!("Tokens failed to load from file, Error: {:#}", e);
    }
    !manager.has_valid_refresh_token()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;

    #[test]
    fn test_strategy_labels_keep_input_order() {
        let challenge: TwoFactorChallenge = serde_json::from_str(
            r#"{"flowToken":"f","strategies":[{"type":1,"display":"Email"},{"type":2,"display":"Phone"}]}"#,
        )
        .unwrap();

        let labels: Vec<String> = challenge.strategies.iter().map(AuthStrategy::label).collect();
        assert_eq!(labels, vec!["Email, Name: Email", "SMS, Name: Phone"]);
    }

    #[test]
    fn test_unknown_method_kind() {
        let strategy: AuthStrategy = serde_json::from_str(r#"{"type":42,"display":"x"}"#).unwrap();
        assert_eq!(strategy.kind, TwoFactorMethod::Unknown);
        assert_eq!(strategy.label(), "Unknown, Name: x");

        let strategy: AuthStrategy = serde_json::from_str(r#"{"display":"y"}"#).unwrap();
        assert_eq!(strategy.kind, TwoFactorMethod::Unknown);
    }

    #[test]
    fn test_method_requirements() {
        assert!(TwoFactorMethod::Email.verification_prompt("a***@b.c").is_some());
        assert!(TwoFactorMethod::Sms.needs_otc());
        assert!(TwoFactorMethod::TotpAuthenticator.verification_prompt("app").is_none());
        assert!(TwoFactorMethod::TotpAuthenticator.needs_otc());
        assert!(!TwoFactorMethod::TotpAuthenticator.delivers_code());
        assert!(!TwoFactorMethod::TotpAuthenticatorV2.needs_otc());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("me@example.com", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_valid_stored_refresh_token_skips_full_auth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let mut state = TokenState::default();
        state.install(testing::pair("stored"));
        state.save(&path).unwrap();

        let mut manager = LiveAuthManager::new(AuthSettings::default());
        assert!(!load_stored_tokens(&mut manager, &path));
    }

    #[test]
    fn test_unreadable_token_file_falls_back_to_full_auth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{ broken").unwrap();

        let mut manager = LiveAuthManager::new(AuthSettings::default());
        assert!(load_stored_tokens(&mut manager, &path));

        let mut manager = LiveAuthManager::new(AuthSettings::default());
        assert!(load_stored_tokens(&mut manager, &dir.path().join("missing.json")));
    }
}
