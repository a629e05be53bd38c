//! License Manager - the main public API for licenseguard.
//!
//! The `LicenseManager` ties the pieces together:
//! - one blocking validation at startup
//! - exactly one startup callback plus the summary banner
//! - hourly background rechecks that report every invalid result

use crate::client::http::{LicenseServerClient, LicenseSource};
use crate::clock::{Clock, SystemClock};
use crate::config::LicenseGuardConfig;
use crate::identity::LocalIdentity;
use crate::notifier::{report_lines, BannerSink, LogBanner, Notifier};
use crate::scheduler::{CancellationToken, RecheckHandle, RecheckScheduler};
use crate::state::StatusReader;
use crate::validator::Validator;
use crate::LicenseGuardError;
use std::sync::Arc;
use tracing::info;

/// Main license manager.
///
/// Create one per process. [`validate`](Self::validate) consumes it and hands
/// the validator to the background recheck loop.
pub struct LicenseManager {
    config: LicenseGuardConfig,
    identity: LocalIdentity,
    validator: Validator,
    banner: Arc<dyn BannerSink>,
}

impl LicenseManager {
    /// Create a license manager that checks against the configured server.
    ///
    /// Uses the system clock for expiry checks.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The identity has an empty license key
    /// - HTTP client creation fails
    pub fn new(config: LicenseGuardConfig, identity: LocalIdentity) -> Result<Self, LicenseGuardError> {
        config.validate()?;
        let client = LicenseServerClient::new(&config)?;
        Self::with_parts(config, identity, Arc::new(client), Arc::new(SystemClock))
    }

    /// Create a license manager over a custom [`LicenseSource`].
    pub fn with_source(
        config: LicenseGuardConfig,
        identity: LocalIdentity,
        source: Arc<dyn LicenseSource>,
    ) -> Result<Self, LicenseGuardError> {
        config.validate()?;
        Self::with_parts(config, identity, source, Arc::new(SystemClock))
    }

    /// Create a license manager with a custom source and clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        config: LicenseGuardConfig,
        identity: LocalIdentity,
        source: Arc<dyn LicenseSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LicenseGuardError> {
        config.validate()?;
        Self::with_parts(config, identity, source, clock)
    }

    fn with_parts(
        config: LicenseGuardConfig,
        identity: LocalIdentity,
        source: Arc<dyn LicenseSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LicenseGuardError> {
        if identity.license_key().is_empty() {
            return Err(LicenseGuardError::ConfigError(
                "license key cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            config,
            identity,
            validator: Validator::new(source, clock),
            banner: Arc::new(LogBanner),
        })
    }

    /// Replace the banner sink (defaults to [`LogBanner`]).
    pub fn with_banner(mut self, banner: Arc<dyn BannerSink>) -> Self {
        self.banner = banner;
        self
    }

    /// Validate now, report, then keep rechecking in the background.
    ///
    /// This:
    /// 1. Evaluates the license once, blocking the caller
    /// 2. Invokes exactly one of `on_valid` / `on_invalid`
    /// 3. Renders the summary lines through the banner sink
    /// 4. Starts the recheck loop, which invokes `on_invalid` on every
    ///    invalid tick
    ///
    /// The loop runs until process exit unless cancelled through the
    /// returned handle.
    ///
    /// # Errors
    /// `SchedulerSpawn` if the background thread cannot be started. The
    /// startup callback has already run in that case.
    pub fn validate<V, I>(self, on_valid: V, on_invalid: I) -> Result<RecheckHandle, LicenseGuardError>
    where
        V: Fn() + Send + Sync + 'static,
        I: Fn() + Send + Sync + 'static,
    {
        self.validate_with_token(on_valid, on_invalid, CancellationToken::new())
    }

    /// Like [`validate`](Self::validate), with a caller-owned cancellation token.
    pub fn validate_with_token<V, I>(
        self,
        on_valid: V,
        on_invalid: I,
        token: CancellationToken,
    ) -> Result<RecheckHandle, LicenseGuardError>
    where
        V: Fn() + Send + Sync + 'static,
        I: Fn() + Send + Sync + 'static,
    {
        let notifier = Notifier::new(on_valid, on_invalid);

        let evaluation = self.validator.evaluate(&self.identity);
        notifier.notify_startup(evaluation.outcome);

        let lines = report_lines(&self.identity, evaluation.outcome, evaluation.record.as_ref());
        self.banner.render(&lines);

        info!(
            key = %self.identity.fingerprint(),
            product_id = self.identity.product_id(),
            valid = evaluation.outcome.is_valid(),
            "Startup license check complete"
        );

        RecheckScheduler::new(self.config.recheck_interval).start(
            self.validator,
            self.identity,
            notifier,
            token,
        )
    }

    /// Observe the status snapshots published by every check.
    pub fn status(&self) -> StatusReader {
        self.validator.subscribe()
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LicenseGuardConfig {
        &self.config
    }

    /// Get the identity being checked.
    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }
}
