//! Second-factor exchange against the Live verification endpoints

use async_trait::async_trait;

use super::live::{error_message, LiveTokenResponse};
use super::{AuthError, AuthStrategy, TokenPair, TwoFactorChallenge, TwoFactorHandshake};
use crate::config::AuthSettings;

pub struct LiveTwoFactor {
    http: reqwest::Client,
    settings: AuthSettings,
    challenge: TwoFactorChallenge,
}

impl LiveTwoFactor {
    pub fn new(http: reqwest::Client, settings: AuthSettings, challenge: TwoFactorChallenge) -> Self {
        Self {
            http,
            settings,
            challenge,
        }
    }

    fn strategy(&self, index: usize) -> Result<&AuthStrategy, AuthError> {
        self.challenge
            .strategies
            .get(index)
            .ok_or(AuthError::UnknownStrategy(index))
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
    ) -> Result<serde_json::Value, AuthError> {
        let resp = self.http.post(url).form(form).send().await?;
        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;

        if !status.is_success() {
            return Err(AuthError::ApiError {
                code: status.as_u16(),
                message: error_message(&body, status),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl TwoFactorHandshake for LiveTwoFactor {
    fn verification_prompt(&self, index: usize) -> Option<String> {
        let strategy = self.challenge.strategies.get(index)?;
        strategy.kind.verification_prompt(&strategy.display)
    }

    async fn check_otc(&mut self, index: usize, proof: Option<&str>) -> Result<bool, AuthError> {
        let strategy = self.strategy(index)?;
        let needs_otc = strategy.kind.needs_otc();

        if strategy.kind.delivers_code() {
            tracing::debug!("Requesting one-time code via {}", strategy.kind);
            let mut form = vec![
                ("flowToken", self.challenge.flow_token.clone()),
                ("channel", strategy.kind.to_string()),
                ("data", strategy.data.clone()),
            ];
            if let Some(proof) = proof {
                form.push(("proof", proof.to_string()));
            }
            self.post_form(&self.settings.otc_url, &form).await?;
        }

        Ok(needs_otc)
    }

    async fn authenticate(
        &mut self,
        index: usize,
        proof: Option<&str>,
        otc: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        let strategy = self.strategy(index)?;
        tracing::info!("Completing two-factor authentication via {}", strategy.kind);

        let mut form = vec![
            ("flowToken", self.challenge.flow_token.clone()),
            ("data", strategy.data.clone()),
            ("client_id", self.settings.client_id.clone()),
            ("scope", self.settings.scope.clone()),
        ];
        if let Some(proof) = proof {
            form.push(("proof", proof.to_string()));
        }
        if let Some(otc) = otc {
            form.push(("otc", otc.to_string()));
        }

        let body = self
            .post_form(&self.settings.verify_url, &form)
            .await
            .map_err(|e| AuthError::TwoFactorFailed(e.to_string()))?;
        let grant: LiveTokenResponse = serde_json::from_value(body)?;
        grant.into_pair()
    }
}
