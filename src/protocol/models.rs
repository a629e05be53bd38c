//! License server response structs.

use crate::protocol::timestamp::Timestamp;
use crate::LicenseGuardError;
use serde::{Deserialize, Serialize};

/// The license server's current statement about a license.
///
/// Every member is optional on the wire. Missing flags read as `false` and
/// missing ids as `0`, which the validity rules then reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    /// Product the license is for.
    #[serde(default)]
    pub product_id: i64,

    /// User the license is issued to.
    #[serde(default)]
    pub user_id: i64,

    /// Display name of the licensee.
    #[serde(default)]
    pub username: String,

    /// License key as known to the server.
    #[serde(rename = "license", default)]
    pub license_key: String,

    /// IP addresses bound to the license, in server order.
    #[serde(default)]
    pub bound_ips: Vec<String>,

    /// Whether the license is sponsored.
    #[serde(default)]
    pub sponsored: bool,

    /// Whether the license is currently active.
    #[serde(default)]
    pub active: bool,

    /// Permanent licenses never expire.
    #[serde(default)]
    pub permanent: bool,

    /// Raw `expires` timestamp as sent by the server.
    #[serde(default)]
    pub expires: Option<Timestamp>,

    /// Expiry instant used by the validity rules.
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
}

/// Envelope wrapping every successful lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    /// The record, absent on some failure payloads.
    #[serde(default)]
    pub data: Option<LicenseRecord>,

    /// Server-side success flag.
    #[serde(default)]
    pub success: bool,
}

/// Parse a 200 response body into a license record.
///
/// `success: false` or a missing `data` member is a failed lookup.
pub fn parse_lookup_response(body: &[u8]) -> Result<LicenseRecord, LicenseGuardError> {
    let response: LookupResponse = serde_json::from_slice(body).map_err(|e| {
        LicenseGuardError::ProtocolError(format!("Failed to parse lookup response: {}", e))
    })?;

    if !response.success {
        return Err(LicenseGuardError::LookupUnsuccessful);
    }

    response.data.ok_or(LicenseGuardError::LookupUnsuccessful)
}
