//! Authorization rules applied to a fetched record.
//!
//! A record authorizes the local identity when:
//! - the product matches
//! - the user matches
//! - the license is active
//! - the license is permanent, or expires strictly after now

use crate::identity::LocalIdentity;
use crate::protocol::models::LicenseRecord;
use crate::protocol::timestamp::Timestamp;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// The first rule a record failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// Record is for another product.
    #[error("product mismatch (expected {expected}, got {actual})")]
    ProductMismatch {
        /// Locally configured product id.
        expected: i64,
        /// Product id on the record.
        actual: i64,
    },

    /// Record is for another user.
    #[error("user mismatch (expected {expected}, got {actual})")]
    UserMismatch {
        /// Locally configured user id.
        expected: i64,
        /// User id on the record.
        actual: i64,
    },

    /// Record is marked inactive.
    #[error("license is not active")]
    Inactive,

    /// Non-permanent record whose expiry is not after now.
    #[error("license expired at {expires_at}")]
    Expired {
        /// The record's expiry.
        expires_at: Timestamp,
    },

    /// Non-permanent record without an expiry.
    #[error("license has no expiry and is not permanent")]
    MissingExpiry,
}

/// Check a record against the local identity at time `now`.
///
/// # Returns
/// * `Ok(())` - Record authorizes the identity
/// * `Err(violation)` - The first failed rule, in product, user, active, expiry order
pub fn check_record(
    record: &LicenseRecord,
    identity: &LocalIdentity,
    now: DateTime<Utc>,
) -> Result<(), RuleViolation> {
    if record.product_id != identity.product_id() {
        return Err(RuleViolation::ProductMismatch {
            expected: identity.product_id(),
            actual: record.product_id,
        });
    }

    if record.user_id != identity.user_id() {
        return Err(RuleViolation::UserMismatch {
            expected: identity.user_id(),
            actual: record.user_id,
        });
    }

    if !record.active {
        return Err(RuleViolation::Inactive);
    }

    if record.permanent {
        return Ok(());
    }

    match record.expires_at {
        // Strict: expiring exactly now is already expired.
        Some(expires_at) if expires_at.as_datetime() > now => Ok(()),
        Some(expires_at) => Err(RuleViolation::Expired { expires_at }),
        None => Err(RuleViolation::MissingExpiry),
    }
}
