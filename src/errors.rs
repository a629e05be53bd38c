//! licenseguard error types.

use crate::policy::rules::RuleViolation;
use thiserror::Error;

/// Errors that can occur while loading an identity or checking a license.
#[derive(Debug, Error)]
pub enum LicenseGuardError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Identity file could not be read.
    #[error("Identity I/O error: {0}")]
    IdentityIO(String),

    /// Background recheck thread could not be started.
    #[error("Failed to start license checker: {0}")]
    SchedulerSpawn(String),

    /// HTTP transport error communicating with the license server.
    #[error("License server transport error: {0}")]
    Transport(String),

    /// Server answered 403.
    #[error("The license is inactive")]
    LicenseInactive,

    /// Server answered 401.
    #[error("The license is blocked")]
    LicenseBlocked,

    /// Server answered 406.
    #[error("The license is expired")]
    LicenseExpired,

    /// Server answered 404.
    #[error("The license was not found")]
    LicenseNotFound,

    /// Server answered with any other non-200 status.
    #[error("License server unavailable (HTTP {status})")]
    ServerUnavailable {
        /// HTTP status code returned by the server.
        status: u16,
    },

    /// Response body could not be parsed.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Response body parsed but reported `success: false`.
    #[error("License lookup was not successful")]
    LookupUnsuccessful,

    /// Record was fetched but fails the authorization rules.
    #[error("License rejected: {0}")]
    RuleViolation(#[from] RuleViolation),
}

/// Coarse classification of a [`LicenseGuardError`], used for diagnostics.
///
/// Every evaluation-time kind produces the same `Invalid` outcome; the kind
/// only changes what gets logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network unreachable, timeout, unreadable body.
    Transport,
    /// Non-200 status from the license server.
    Protocol,
    /// Malformed body or `success: false`.
    Payload,
    /// Well-formed record that fails the rule set.
    Rule,
    /// Bad configuration or identity input.
    Setup,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Protocol => write!(f, "protocol"),
            FailureKind::Payload => write!(f, "payload"),
            FailureKind::Rule => write!(f, "rule"),
            FailureKind::Setup => write!(f, "setup"),
        }
    }
}

impl LicenseGuardError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            LicenseGuardError::ConfigError(_)
            | LicenseGuardError::IdentityIO(_)
            | LicenseGuardError::SchedulerSpawn(_) => FailureKind::Setup,
            LicenseGuardError::Transport(_) => FailureKind::Transport,
            LicenseGuardError::LicenseInactive
            | LicenseGuardError::LicenseBlocked
            | LicenseGuardError::LicenseExpired
            | LicenseGuardError::LicenseNotFound
            | LicenseGuardError::ServerUnavailable { .. } => FailureKind::Protocol,
            LicenseGuardError::ProtocolError(_) | LicenseGuardError::LookupUnsuccessful => {
                FailureKind::Payload
            }
            LicenseGuardError::RuleViolation(_) => FailureKind::Rule,
        }
    }
}
