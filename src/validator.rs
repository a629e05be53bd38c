//! Runs one validation pass: fetch the record, apply the rules, publish.

use crate::client::http::LicenseSource;
use crate::clock::Clock;
use crate::identity::LocalIdentity;
use crate::policy::rules::check_record;
use crate::protocol::models::LicenseRecord;
use crate::state::{StatusPublisher, StatusReader, ValidityState};
use crate::LicenseGuardError;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of one validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The record authorizes the identity.
    Valid,
    /// Fetch failed or a rule was violated.
    Invalid,
}

impl Outcome {
    /// Whether this is `Valid`.
    pub fn is_valid(self) -> bool {
        self == Outcome::Valid
    }
}

impl From<Outcome> for ValidityState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Valid => ValidityState::Valid,
            Outcome::Invalid => ValidityState::Invalid,
        }
    }
}

/// Everything one pass produced.
#[derive(Debug)]
pub struct Evaluation {
    /// Valid or invalid.
    pub outcome: Outcome,

    /// The fetched record, absent when the fetch failed.
    pub record: Option<LicenseRecord>,

    /// Why the pass was invalid.
    pub failure: Option<LicenseGuardError>,
}

/// Applies the authorization rules to freshly fetched records.
///
/// Every pass goes to the source; nothing is reused between passes except
/// the published status snapshot, which each pass overwrites.
pub struct Validator {
    source: Arc<dyn LicenseSource>,
    clock: Arc<dyn Clock>,
    status: StatusPublisher,
}

impl Validator {
    /// Create a validator over a source and clock.
    pub fn new(source: Arc<dyn LicenseSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            status: StatusPublisher::new(),
        }
    }

    /// Observe the snapshots this validator publishes.
    pub fn subscribe(&self) -> StatusReader {
        self.status.subscribe()
    }

    /// Fetch the current record for `identity` and decide validity.
    ///
    /// Fails closed: any fetch error is `Invalid` with no record. The
    /// outcome and record are published before returning.
    #[instrument(skip(self, identity), fields(key = %identity.fingerprint()))]
    pub fn evaluate(&self, identity: &LocalIdentity) -> Evaluation {
        let evaluation = match self.source.fetch(identity.license_key()) {
            Ok(record) => {
                let now = self.clock.now_utc_seconds();
                match check_record(&record, identity, now) {
                    Ok(()) => Evaluation {
                        outcome: Outcome::Valid,
                        record: Some(record),
                        failure: None,
                    },
                    Err(violation) => Evaluation {
                        outcome: Outcome::Invalid,
                        record: Some(record),
                        failure: Some(violation.into()),
                    },
                }
            }
            Err(err) => Evaluation {
                outcome: Outcome::Invalid,
                record: None,
                failure: Some(err),
            },
        };

        match &evaluation.failure {
            None => info!(
                product_id = identity.product_id(),
                user_id = identity.user_id(),
                "License is valid"
            ),
            Some(err) => warn!(
                product_id = identity.product_id(),
                user_id = identity.user_id(),
                kind = %err.kind(),
                error = %err,
                "License is invalid"
            ),
        }

        self.status.publish(
            evaluation.outcome.into(),
            evaluation.record.clone(),
            evaluation.failure.as_ref(),
            self.clock.now_utc(),
        );

        evaluation
    }
}
