//! Reqwest-based HTTP client for the license server.
//!
//! One lookup is a `GET <server_url>/<license key>`. Non-200 statuses are
//! classified into distinct errors; 200 bodies are parsed into a
//! [`LicenseRecord`].

use crate::config::LicenseGuardConfig;
use crate::protocol::models::{parse_lookup_response, LicenseRecord};
use crate::LicenseGuardError;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// Anything that can fetch the current record for a license key.
///
/// The validator only depends on this trait, so hosts and tests can swap in
/// their own lookup.
pub trait LicenseSource: Send + Sync {
    /// Fetch the authority's current record for `license_key`.
    fn fetch(&self, license_key: &str) -> Result<LicenseRecord, LicenseGuardError>;
}

/// Blocking HTTP client for the license server.
pub struct LicenseServerClient {
    client: Client,
    user_agent: String,
    server_url: Url,
    timeout: Duration,
}

impl LicenseServerClient {
    /// Create a new client from config.
    pub fn new(config: &LicenseGuardConfig) -> Result<Self, LicenseGuardError> {
        let server_url = Url::parse(&config.server_url).map_err(|e| {
            LicenseGuardError::ConfigError(format!("Invalid server_url {}: {}", config.server_url, e))
        })?;
        if server_url.cannot_be_a_base() {
            return Err(LicenseGuardError::ConfigError(format!(
                "server_url cannot carry a path: {}",
                config.server_url
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LicenseGuardError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: build_user_agent(config),
            server_url,
            timeout: config.request_timeout,
        })
    }

    /// URL of the lookup for `license_key`.
    ///
    /// The key is pushed as a single path segment, so reserved characters are
    /// percent-encoded instead of altering the path.
    pub fn lookup_url(&self, license_key: &str) -> Result<Url, LicenseGuardError> {
        let mut url = self.server_url.clone();
        url.path_segments_mut()
            .map_err(|_| LicenseGuardError::ConfigError("server_url cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(license_key);
        Ok(url)
    }

    /// Get the configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the configured server URL.
    pub fn server_url(&self) -> &str {
        self.server_url.as_str()
    }
}

impl LicenseSource for LicenseServerClient {
    fn fetch(&self, license_key: &str) -> Result<LicenseRecord, LicenseGuardError> {
        let url = self.lookup_url(license_key)?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| LicenseGuardError::Transport(format!("Request failed: {}", e)))?;

        if let Some(err) = classify_status(response.status()) {
            return Err(err);
        }

        let body = response
            .bytes()
            .map_err(|e| LicenseGuardError::Transport(format!("Failed to read body: {}", e)))?;

        parse_lookup_response(&body)
    }
}

/// Map a response status to its classified failure, or `None` for 200.
pub fn classify_status(status: StatusCode) -> Option<LicenseGuardError> {
    match status.as_u16() {
        200 => None,
        403 => Some(LicenseGuardError::LicenseInactive),
        401 => Some(LicenseGuardError::LicenseBlocked),
        406 => Some(LicenseGuardError::LicenseExpired),
        404 => Some(LicenseGuardError::LicenseNotFound),
        other => Some(LicenseGuardError::ServerUnavailable { status: other }),
    }
}

/// Build a User-Agent string from config.
///
/// Format: `<product>/licenseguard-<version> <app>`
pub fn build_user_agent(config: &LicenseGuardConfig) -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        "{}/licenseguard-{} {}",
        config.user_agent_product, version, config.app_name
    )
}
