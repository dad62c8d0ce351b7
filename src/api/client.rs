//! Authenticated HTTP client for Xbox Live APIs
//!
//! Wraps reqwest::Client with the caller-supplied authorization header.

use anyhow::{bail, Context, Result};

use super::request::ApiRequest;

pub struct XblClient {
    http: reqwest::Client,
    authorization: String,
}

impl XblClient {
    /// `authorization` is sent verbatim, e.g. `XBL3.0 x=<userhash>;<token>`.
    pub fn new(authorization: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), authorization)
    }

    pub fn with_http(http: reqwest::Client, authorization: impl Into<String>) -> Self {
        Self {
            http,
            authorization: authorization.into(),
        }
    }

    /// Send a built request and return the response if the status is a success.
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let url = request.url().context("Invalid request URL")?;
        tracing::debug!("XBL {} {}", request.method, url);

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .header(reqwest::header::AUTHORIZATION, &self.authorization);
        for (name, value) in &request.headers {
            builder = builder.header(*name, *value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .with_context(|| format!("XBL {} {} failed", request.method, url))?;

        check_response(resp, url.as_str()).await
    }
}

/// Check HTTP response status code and return a clear error on failure.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        bail!(
            "401 Unauthorized for {}. Token may be invalid -- authenticate again.",
            url
        );
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("HTTP {} for {}: {}", status.as_u16(), url, body);
    }
    Ok(resp)
}
