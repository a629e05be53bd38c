//! Current license status, shared between the checking thread and readers.
//!
//! The validator is the only writer. It publishes immutable
//! [`LicenseStatus`] snapshots through a `tokio::sync::watch` channel and
//! any number of [`StatusReader`]s observe the latest one.

use crate::errors::FailureKind;
use crate::protocol::models::LicenseRecord;
use crate::LicenseGuardError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

/// Validity as last observed.
///
/// Starts at `Unvalidated`; once the first evaluation lands it moves between
/// `Valid` and `Invalid` and never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityState {
    /// No evaluation has completed yet.
    Unvalidated,
    /// Last evaluation authorized the identity.
    Valid,
    /// Last evaluation did not.
    Invalid,
}

impl std::fmt::Display for ValidityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidityState::Unvalidated => write!(f, "Unvalidated"),
            ValidityState::Valid => write!(f, "Valid"),
            ValidityState::Invalid => write!(f, "Invalid"),
        }
    }
}

/// Immutable snapshot of the most recent evaluation.
#[derive(Debug, Clone)]
pub struct LicenseStatus {
    /// Current validity.
    pub state: ValidityState,

    /// Record from the most recent pass, absent if that fetch failed.
    pub record: Option<LicenseRecord>,

    /// When the most recent pass finished.
    pub checked_at: Option<DateTime<Utc>>,

    /// Classification of the most recent failure, if the pass was invalid.
    pub failure_kind: Option<FailureKind>,

    /// Rendered message of the most recent failure.
    pub failure: Option<String>,

    /// Number of completed passes.
    pub passes: u64,
}

impl LicenseStatus {
    /// Snapshot before any evaluation.
    pub fn unvalidated() -> Self {
        Self {
            state: ValidityState::Unvalidated,
            record: None,
            checked_at: None,
            failure_kind: None,
            failure: None,
            passes: 0,
        }
    }

    /// Whether the last evaluation was valid.
    pub fn is_valid(&self) -> bool {
        self.state == ValidityState::Valid
    }
}

/// Write side of the status channel. Held by the validator.
#[derive(Debug)]
pub(crate) struct StatusPublisher {
    tx: watch::Sender<Arc<LicenseStatus>>,
}

impl StatusPublisher {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(LicenseStatus::unvalidated()));
        Self { tx }
    }

    /// Replace the current snapshot with the outcome of a finished pass.
    pub(crate) fn publish(
        &self,
        state: ValidityState,
        record: Option<LicenseRecord>,
        failure: Option<&LicenseGuardError>,
        checked_at: DateTime<Utc>,
    ) {
        let passes = self.tx.borrow().passes + 1;
        self.tx.send_replace(Arc::new(LicenseStatus {
            state,
            record,
            checked_at: Some(checked_at),
            failure_kind: failure.map(LicenseGuardError::kind),
            failure: failure.map(ToString::to_string),
            passes,
        }));
    }

    pub(crate) fn subscribe(&self) -> StatusReader {
        StatusReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side of the status channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StatusReader {
    rx: watch::Receiver<Arc<LicenseStatus>>,
}

impl StatusReader {
    /// The latest snapshot.
    pub fn current(&self) -> Arc<LicenseStatus> {
        self.rx.borrow().clone()
    }

    /// The latest validity.
    pub fn state(&self) -> ValidityState {
        self.rx.borrow().state
    }

    /// Whether a snapshot newer than the last one seen via [`latest`](Self::latest) exists.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// The latest snapshot, marking it as seen.
    pub fn latest(&mut self) -> Arc<LicenseStatus> {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next published snapshot.
    ///
    /// # Errors
    /// `ConfigError` if the validator has been dropped and no further
    /// snapshots can arrive.
    pub async fn changed(&mut self) -> Result<Arc<LicenseStatus>, LicenseGuardError> {
        self.rx.changed().await.map_err(|_| {
            LicenseGuardError::ConfigError("license checker is no longer running".to_string())
        })?;
        Ok(self.rx.borrow_and_update().clone())
    }
}
