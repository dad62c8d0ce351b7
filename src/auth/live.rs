//! Windows Live login manager
//!
//! Refreshes through the `oauth2` refresh grant and signs in with a plain
//! password-grant form POST, whose error body may carry a two-factor
//! challenge. Token state lives in a [`TokenState`] persisted as JSON.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use oauth2::basic::{BasicClient, BasicRequestTokenError};
use oauth2::{AuthUrl, ClientId, RefreshToken, RequestTokenError, Scope, TokenResponse, TokenUrl};
use serde::Deserialize;

use super::two_factor::LiveTwoFactor;
use super::{
    AuthError, AuthManager, AuthOutcome, Credentials, StoredToken, TokenPair, TokenState,
    TwoFactorChallenge, TwoFactorHandshake,
};
use crate::config::AuthSettings;

/// Successful grant body from the Live token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct LiveTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub user_id: Option<String>,
}

impl LiveTokenResponse {
    pub(crate) fn into_pair(self) -> Result<TokenPair, AuthError> {
        let refresh_token = self
            .refresh_token
            .ok_or(AuthError::MissingField("refresh_token"))?;
        Ok(TokenPair {
            access_token: StoredToken::new(self.access_token, self.expires_in),
            refresh_token: StoredToken::refresh(refresh_token),
        })
    }
}

/// Human-readable message from a Live error body.
pub(crate) fn error_message(body: &serde_json::Value, status: reqwest::StatusCode) -> String {
    body.get("error_description")
        .or_else(|| body.get("error"))
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn describe_token_error<RE: std::error::Error + 'static>(err: &BasicRequestTokenError<RE>) -> String {
    match err {
        RequestTokenError::ServerResponse(response) => response
            .error_description()
            .cloned()
            .unwrap_or_else(|| response.to_string()),
        other => other.to_string(),
    }
}

pub struct LiveAuthManager {
    http: reqwest::Client,
    settings: AuthSettings,
    tokens: TokenState,
}

impl LiveAuthManager {
    pub fn new(settings: AuthSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            tokens: TokenState::default(),
        }
    }

    pub fn tokens(&self) -> &TokenState {
        &self.tokens
    }

    /// Build the OAuth2 client for the refresh grant
    fn build_client(&self) -> Result<BasicClient, AuthError> {
        let auth_url = AuthUrl::new(self.settings.authorize_url.clone())
            .map_err(|e| AuthError::FailedLogin(format!("invalid authorize URL: {}", e)))?;
        let token_url = TokenUrl::new(self.settings.token_url.clone())
            .map_err(|e| AuthError::FailedLogin(format!("invalid token URL: {}", e)))?;

        Ok(BasicClient::new(
            ClientId::new(self.settings.client_id.clone()),
            None,
            auth_url,
            Some(token_url),
        ))
    }

    async fn refresh(&mut self) -> Result<(), AuthError> {
        let refresh_token = self
            .tokens
            .refresh_token
            .as_ref()
            .map(|t| t.token.clone())
            .ok_or(AuthError::MissingField("refresh_token"))?;

        tracing::info!("Refreshing Windows Live tokens...");

        let token_response = self
            .build_client()?
            .exchange_refresh_token(&RefreshToken::new(refresh_token))
            .add_scope(Scope::new(self.settings.scope.clone()))
            .request_async(oauth2::reqwest::async_http_client)
            .await
            .map_err(|e| AuthError::RefreshRejected(describe_token_error(&e)))?;

        self.tokens.access_token = Some(StoredToken::new(
            token_response.access_token().secret().to_string(),
            token_response.expires_in().map(|d| d.as_secs()),
        ));

        // Live does not always rotate the refresh token
        if let Some(new_rt) = token_response.refresh_token() {
            self.tokens.refresh_token = Some(StoredToken::refresh(new_rt.secret().to_string()));
        }

        tracing::info!("Token refresh complete");
        Ok(())
    }

    async fn password_grant(&mut self, credentials: Credentials) -> Result<AuthOutcome, AuthError> {
        tracing::debug!("Password grant for {}", credentials.email);

        let params = [
            ("grant_type", "password"),
            ("client_id", self.settings.client_id.as_str()),
            ("scope", self.settings.scope.as_str()),
            ("username", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let resp = self
            .http
            .post(&self.settings.token_url)
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;

        if status.is_success() {
            let grant: LiveTokenResponse = serde_json::from_value(body)?;
            let user_id = grant.user_id.clone();
            self.tokens.install(grant.into_pair()?);
            self.tokens.user_id = user_id;
            return Ok(AuthOutcome::Success);
        }

        if body
            .get("strategies")
            .and_then(|s| s.as_array())
            .is_some_and(|s| !s.is_empty())
        {
            let challenge: TwoFactorChallenge = serde_json::from_value(body)?;
            tracing::info!(
                "Two-factor authentication required ({} methods)",
                challenge.strategies.len()
            );
            return Ok(AuthOutcome::TwoFactorRequired(challenge));
        }

        Err(AuthError::FailedLogin(error_message(&body, status)))
    }
}

#[async_trait]
impl AuthManager for LiveAuthManager {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.tokens = TokenState::load(path)?;
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.tokens.save(path)
    }

    fn has_valid_refresh_token(&self) -> bool {
        self.tokens.has_valid_refresh_token()
    }

    fn is_authenticated(&self) -> bool {
        self.tokens
            .access_token
            .as_ref()
            .is_some_and(StoredToken::is_valid)
    }

    fn install_tokens(&mut self, tokens: TokenPair) {
        self.tokens.install(tokens);
    }

    async fn authenticate(
        &mut self,
        credentials: Option<Credentials>,
        do_refresh: bool,
    ) -> AuthOutcome {
        if do_refresh && self.has_valid_refresh_token() {
            match self.refresh().await {
                Ok(()) => return AuthOutcome::Success,
                Err(e) if credentials.is_none() => return AuthOutcome::Failed(e.to_string()),
                Err(e) => tracing::warn!("Refresh failed, falling back to credentials: {}", e),
            }
        } else if credentials.is_none() && self.is_authenticated() {
            return AuthOutcome::Success;
        }

        let Some(credentials) = credentials else {
            return AuthOutcome::Failed(
                "No credentials supplied and no valid refresh token stored".to_string(),
            );
        };

        match self.password_grant(credentials).await {
            Ok(outcome) => outcome,
            Err(e) => AuthOutcome::Failed(e.to_string()),
        }
    }

    fn begin_two_factor(&self, challenge: TwoFactorChallenge) -> Box<dyn TwoFactorHandshake> {
        Box::new(LiveTwoFactor::new(
            self.http.clone(),
            self.settings.clone(),
            challenge,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> AuthSettings {
        AuthSettings {
            token_url: format!("{}/oauth20_token.srf", server.uri()),
            otc_url: format!("{}/otc", server.uri()),
            verify_url: format!("{}/verify", server.uri()),
            ..AuthSettings::default()
        }
    }

    #[tokio::test]
    async fn test_password_grant_success_installs_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth20_token.srf"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at",
                "refresh_token": "rt",
                "expires_in": 3600,
                "token_type": "bearer",
                "user_id": "abc123"
            })))
            .mount(&server)
            .await;

        let mut manager = LiveAuthManager::new(settings_for(&server));
        let outcome = manager
            .authenticate(Some(Credentials::new("me@example.com", "pw")), true)
            .await;

        assert_eq!(outcome, AuthOutcome::Success);
        assert!(manager.is_authenticated());
        assert!(manager.has_valid_refresh_token());
        assert_eq!(manager.tokens().user_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_password_grant_challenge_requires_two_factor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth20_token.srf"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "interaction_required",
                "flowToken": "flow-1",
                "strategies": [
                    {"type": 1, "display": "m***@example.com", "data": "e1"},
                    {"type": 2, "display": "*******12", "data": "p1"}
                ]
            })))
            .mount(&server)
            .await;

        let mut manager = LiveAuthManager::new(settings_for(&server));
        let outcome = manager
            .authenticate(Some(Credentials::new("me@example.com", "pw")), true)
            .await;

        match outcome {
            AuthOutcome::TwoFactorRequired(challenge) => {
                assert_eq!(challenge.flow_token, "flow-1");
                assert_eq!(challenge.strategies.len(), 2);
                assert_eq!(challenge.strategies[1].label(), "SMS, Name: *******12");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_password_grant_rejection_carries_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth20_token.srf"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "The user name or password is incorrect."
            })))
            .mount(&server)
            .await;

        let mut manager = LiveAuthManager::new(settings_for(&server));
        let outcome = manager
            .authenticate(Some(Credentials::new("me@example.com", "bad")), true)
            .await;

        match outcome {
            AuthOutcome::Failed(reason) => {
                assert!(reason.contains("The user name or password is incorrect."))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_silent_refresh_uses_refresh_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth20_token.srf"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=stored-rt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-at",
                "token_type": "bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut manager = LiveAuthManager::new(settings_for(&server));
        manager.tokens.refresh_token = Some(StoredToken::refresh("stored-rt".to_string()));

        let outcome = manager.authenticate(None, true).await;

        assert_eq!(outcome, AuthOutcome::Success);
        let tokens = manager.tokens();
        assert_eq!(tokens.access_token.as_ref().unwrap().token, "fresh-at");
        // Not rotated by the server, so the stored one is kept.
        assert_eq!(tokens.refresh_token.as_ref().unwrap().token, "stored-rt");
    }

    #[tokio::test]
    async fn test_silent_refresh_failure_without_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth20_token.srf"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "refresh token revoked"
            })))
            .mount(&server)
            .await;

        let mut manager = LiveAuthManager::new(settings_for(&server));
        manager.tokens.refresh_token = Some(StoredToken::refresh("stored-rt".to_string()));

        match manager.authenticate(None, true).await {
            AuthOutcome::Failed(reason) => assert!(reason.contains("refresh token revoked")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_credentials_and_no_tokens_fails() {
        let mut manager = LiveAuthManager::new(AuthSettings::default());
        assert!(matches!(
            manager.authenticate(None, true).await,
            AuthOutcome::Failed(_)
        ));
    }
}
