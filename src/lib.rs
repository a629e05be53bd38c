//! # licenseguard
//!
//! **Startup and periodic license checks against a remote license server.**
//!
//! licenseguard confirms that the identity a program is configured with
//! (license key, product id, user id) is authorized by the license server's
//! current record, once at startup and then every hour for the life of the
//! process.
//!
//! ## Features
//!
//! - **Fail-closed** — any network, status or payload failure counts as invalid
//! - **Four-clause rule** — product, user, active flag, and permanent-or-unexpired
//! - **Repeated alerts** — the failure callback fires on every invalid recheck
//! - **Race-free status** — checks publish immutable snapshots through a watch channel
//! - **Cancellable** — the recheck loop runs forever by default but can be stopped
//!
//! ## Quickstart
//!
//! ```no_run
//! use licenseguard::{LicenseGuardConfig, LicenseManager, LocalIdentity};
//!
//! fn main() -> Result<(), licenseguard::LicenseGuardError> {
//!     let identity = LocalIdentity::new("LICENSE-KEY-HERE", 5, 9);
//!     let manager = LicenseManager::new(LicenseGuardConfig::default(), identity)?;
//!
//!     let _handle = manager.validate(
//!         || println!("License valid"),
//!         || eprintln!("License invalid"),
//!     )?;
//!
//!     // ... run the application; rechecks happen in the background.
//!     Ok(())
//! }
//! ```
//!
//! ## Rules
//!
//! A fetched record is valid for the local identity iff:
//! - `productId` matches
//! - `userId` matches
//! - `active` is true
//! - `permanent` is true, or `expiresAt` is strictly after now (second precision)
//!
//! ## Threat Model
//!
//! licenseguard trusts the transport to the license server. It does not
//! prevent binary patching or code modification.

#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;
pub mod identity;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Policy layer
pub mod policy;

// Validation engine
pub mod notifier;
pub mod scheduler;
pub mod state;
pub mod validator;

// Manager (main public API)
pub mod manager;

// Re-exports for public API
pub use client::http::{LicenseServerClient, LicenseSource};
pub use clock::{Clock, SystemClock};
pub use config::LicenseGuardConfig;
pub use errors::{FailureKind, LicenseGuardError};
pub use identity::LocalIdentity;
pub use manager::LicenseManager;
pub use notifier::{BannerSink, LogBanner, Notifier};
pub use policy::rules::RuleViolation;
pub use protocol::models::LicenseRecord;
pub use protocol::timestamp::Timestamp;
pub use scheduler::{CancellationToken, RecheckHandle, RecheckScheduler};
pub use state::{LicenseStatus, StatusReader, ValidityState};
pub use validator::{Evaluation, Outcome, Validator};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
