//! The locally configured identity a running instance claims.

use crate::LicenseGuardError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name used under the per-namespace config directory.
pub const IDENTITY_FILE_NAME: &str = "license.json";

/// Product/user/key tuple loaded once at startup and never mutated.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalIdentity {
    license_key: String,
    product_id: i64,
    user_id: i64,
}

impl LocalIdentity {
    /// Build an identity from its parts.
    pub fn new(license_key: impl Into<String>, product_id: i64, user_id: i64) -> Self {
        Self {
            license_key: license_key.into(),
            product_id,
            user_id,
        }
    }

    /// Parse an identity from JSON (`licenseKey`, `productId`, `userId`).
    pub fn from_json_str(json: &str) -> Result<Self, LicenseGuardError> {
        let identity: Self = serde_json::from_str(json)
            .map_err(|e| LicenseGuardError::ConfigError(format!("Invalid identity JSON: {}", e)))?;
        if identity.license_key.is_empty() {
            return Err(LicenseGuardError::ConfigError(
                "licenseKey cannot be empty".to_string(),
            ));
        }
        Ok(identity)
    }

    /// Load an identity from a JSON file.
    pub fn load(path: &Path) -> Result<Self, LicenseGuardError> {
        let json = fs::read_to_string(path).map_err(|e| {
            LicenseGuardError::IdentityIO(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Default identity file location: `dirs::config_dir()/<namespace>/license.json`.
    pub fn default_path(namespace: &str) -> Result<PathBuf, LicenseGuardError> {
        let base_dir = dirs::config_dir().ok_or_else(|| {
            LicenseGuardError::IdentityIO("Could not find config directory".to_string())
        })?;
        Ok(base_dir.join(namespace).join(IDENTITY_FILE_NAME))
    }

    /// The opaque license key.
    pub fn license_key(&self) -> &str {
        &self.license_key
    }

    /// Product this instance claims to be.
    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    /// User this instance claims to be licensed to.
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Short, stable identifier for the key that is safe to log.
    pub fn fingerprint(&self) -> String {
        fingerprint_license_key(&self.license_key)
    }
}

impl std::fmt::Debug for LocalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fingerprint = self.fingerprint();
        f.debug_struct("LocalIdentity")
            .field("license_key", &format_args!("<{}>", fingerprint))
            .field("product_id", &self.product_id)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// First 16 hex chars of the SHA-256 of a license key.
pub fn fingerprint_license_key(license_key: &str) -> String {
    use sha2::{Digest, Sha256};
    let hash = hex::encode(Sha256::digest(license_key.as_bytes()));
    hash[..16].to_string()
}
