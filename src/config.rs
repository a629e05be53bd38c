//! licenseguard configuration.

use std::time::Duration;

/// Default license server endpoint. The license key is appended as the final path segment.
pub const DEFAULT_SERVER_URL: &str = "https://backend.cerberus-labs.tech/api/v1/license";

/// Default bound on a single license lookup.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cadence of background rechecks.
pub const DEFAULT_RECHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Shortest accepted recheck interval.
pub const MIN_RECHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Longest accepted recheck interval. Rechecks further apart than this stop
/// meaning anything.
pub const MAX_RECHECK_INTERVAL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Configuration for license checks.
///
/// The identity being checked is supplied separately as a
/// [`LocalIdentity`](crate::identity::LocalIdentity).
#[derive(Debug, Clone)]
pub struct LicenseGuardConfig {
    /// Application name (e.g., "myapp/1.2.0"), sent in the User-Agent.
    pub app_name: &'static str,

    /// User-Agent product identifier (e.g., "myapp-pro").
    pub user_agent_product: &'static str,

    /// Base URL of the license lookup endpoint.
    pub server_url: String,

    /// Timeout applied to each lookup request.
    pub request_timeout: Duration,

    /// Interval between background rechecks.
    pub recheck_interval: Duration,
}

impl Default for LicenseGuardConfig {
    fn default() -> Self {
        Self {
            app_name: "licenseguard",
            user_agent_product: "licenseguard",
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            recheck_interval: DEFAULT_RECHECK_INTERVAL,
        }
    }
}

impl LicenseGuardConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), crate::LicenseGuardError> {
        if self.server_url.is_empty() {
            return Err(crate::LicenseGuardError::ConfigError(
                "server_url cannot be empty".to_string(),
            ));
        }
        if !(self.server_url.starts_with("https://") || self.server_url.starts_with("http://")) {
            return Err(crate::LicenseGuardError::ConfigError(format!(
                "server_url must be an http(s) URL, got {}",
                self.server_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(crate::LicenseGuardError::ConfigError(
                "request_timeout must be non-zero".to_string(),
            ));
        }
        if self.recheck_interval < MIN_RECHECK_INTERVAL {
            return Err(crate::LicenseGuardError::ConfigError(format!(
                "recheck_interval too short: {:?} < {:?}",
                self.recheck_interval, MIN_RECHECK_INTERVAL
            )));
        }
        if self.recheck_interval > MAX_RECHECK_INTERVAL {
            return Err(crate::LicenseGuardError::ConfigError(format!(
                "recheck_interval too long: {:?} > {:?}",
                self.recheck_interval, MAX_RECHECK_INTERVAL
            )));
        }
        Ok(())
    }
}
