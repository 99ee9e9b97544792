//! Client configuration for the Harvest v2 API.
//!
//! # Design
//! `Config` is assembled once, before a client is built, and is read-only
//! afterwards. The `with_*` methods consume and return `self` so every
//! adjustment happens at construction time.

/// Host serving the Harvest API.
pub const HARVEST_DOMAIN: &str = "api.harvestapp.com";

/// API version segment appended to the host.
pub const HARVEST_API_VERSION: &str = "v2";

/// Value sent in the `User-Agent` header of every request.
pub const USER_AGENT: &str = concat!("harvest-core/", env!("CARGO_PKG_VERSION"));

/// Credentials and endpoint for a single Harvest account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub account_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl Config {
    pub fn new(account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            account_id: account_id.into(),
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    /// Record a refresh token alongside the access token. The client never
    /// uses it; it is kept for callers that run the OAuth flow themselves.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Point the client at another endpoint, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

fn default_base_url() -> String {
    format!("https://{HARVEST_DOMAIN}/{HARVEST_API_VERSION}")
}
