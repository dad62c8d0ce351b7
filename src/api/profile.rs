//! Profile lookups by XUID or gamertag
//!
//! The `build_*` functions only describe requests; [`ProfileProvider`] sends
//! them through an [`XblClient`] and decodes the reply.

use anyhow::{Context, Result};
use reqwest::Method;

use super::client::XblClient;
use super::request::{ApiRequest, CONTRACT_VERSION_HEADER};
use crate::models::{ProfileResponse, ProfileSettings};

pub const PROFILE_URL: &str = "https://profile.xboxlive.com";

const SEPARATOR: &str = ",";

/// Settings requested by the batch lookup, in request order.
pub const BATCH_SETTINGS: [ProfileSettings; 14] = [
    ProfileSettings::GameDisplayName,
    ProfileSettings::AppDisplayName,
    ProfileSettings::AppDisplayPicRaw,
    ProfileSettings::Gamerscore,
    ProfileSettings::Gamertag,
    ProfileSettings::GameDisplayPicRaw,
    ProfileSettings::AccountTier,
    ProfileSettings::TenureLevel,
    ProfileSettings::XboxOneRep,
    ProfileSettings::PreferredColor,
    ProfileSettings::Location,
    ProfileSettings::Biography,
    ProfileSettings::Watermarks,
    ProfileSettings::RealName,
];

/// Settings requested by single-profile lookups, in request order.
pub const SINGLE_SETTINGS: [ProfileSettings; 5] = [
    ProfileSettings::AppDisplayName,
    ProfileSettings::Gamerscore,
    ProfileSettings::Gamertag,
    ProfileSettings::PublicGamerpic,
    ProfileSettings::XboxOneRep,
];

fn single_settings_query() -> String {
    SINGLE_SETTINGS
        .iter()
        .map(ProfileSettings::as_str)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn single_lookup(path: String) -> ApiRequest {
    ApiRequest {
        method: Method::GET,
        host: PROFILE_URL.to_string(),
        path,
        headers: vec![CONTRACT_VERSION_HEADER],
        query: vec![("settings", single_settings_query())],
        body: None,
    }
}

/// `POST /users/batch/profile/settings` for a list of XUIDs.
pub fn build_batch(xuids: &[u64]) -> ApiRequest {
    let settings: Vec<&str> = BATCH_SETTINGS.iter().map(ProfileSettings::as_str).collect();

    ApiRequest {
        method: Method::POST,
        host: PROFILE_URL.to_string(),
        path: "/users/batch/profile/settings".to_string(),
        headers: vec![CONTRACT_VERSION_HEADER],
        query: Vec::new(),
        body: Some(serde_json::json!({
            "settings": settings,
            "userIds": xuids,
        })),
    }
}

/// `GET /users/xuid({xuid})/profile/settings`
pub fn build_single_by_xuid(xuid: u64) -> ApiRequest {
    single_lookup(format!("/users/xuid({})/profile/settings", xuid))
}

/// Percent-encode one path segment. Spaces become `%20`, not `+`.
fn encode_segment(segment: &str) -> String {
    // byte_serialize escapes a literal '+' as %2B, so any '+' left was a space
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// `GET /users/gt({gamertag})/profile/settings`, with the gamertag percent-encoded
pub fn build_single_by_gamertag(gamertag: &str) -> ApiRequest {
    single_lookup(format!(
        "/users/gt({})/profile/settings",
        encode_segment(gamertag)
    ))
}

/// Sends profile lookups and decodes [`ProfileResponse`] bodies.
pub struct ProfileProvider<'a> {
    client: &'a XblClient,
    host: String,
}

impl<'a> ProfileProvider<'a> {
    pub fn new(client: &'a XblClient) -> Self {
        Self {
            client,
            host: PROFILE_URL.to_string(),
        }
    }

    pub fn with_host(client: &'a XblClient, host: impl Into<String>) -> Self {
        Self {
            client,
            host: host.into(),
        }
    }

    async fn fetch(&self, request: ApiRequest) -> Result<ProfileResponse> {
        let request = request.with_host(self.host.clone());
        let resp = self.client.send(&request).await?;
        resp.json()
            .await
            .context("Failed to parse profile response")
    }

    /// Profile info for a list of XUIDs
    pub async fn get_profiles(&self, xuids: &[u64]) -> Result<ProfileResponse> {
        self.fetch(build_batch(xuids)).await
    }

    pub async fn get_profile_by_xuid(&self, xuid: u64) -> Result<ProfileResponse> {
        self.fetch(build_single_by_xuid(xuid)).await
    }

    pub async fn get_profile_by_gamertag(&self, gamertag: &str) -> Result<ProfileResponse> {
        self.fetch(build_single_by_gamertag(gamertag)).await
    }
}
