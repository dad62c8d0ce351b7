//! Plain description of an HTTP request, built without a client

use reqwest::Method;
use url::Url;

/// Header signalling which profile API contract the request is written against.
pub const CONTRACT_VERSION_HEADER: (&str, &str) = ("x-xbl-contract-version", "2");

/// Method, target, headers and payload of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub host: String,
    pub path: String,
    pub headers: Vec<(&'static str, &'static str)>,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Full URL including the query string.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let base = format!("{}{}", self.host, self.path);
        if self.query.is_empty() {
            Url::parse(&base)
        } else {
            Url::parse_with_params(&base, self.query.iter().map(|(k, v)| (*k, v.as_str())))
        }
    }

    /// Same request aimed at another host (e.g. a test server).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&'static str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }
}
