//! Basic license validation example.
//!
//! Loads the identity from a JSON file, validates once at startup, then keeps
//! rechecking in the background while the "application" runs.
//!
//! # Running
//!
//! ```bash
//! echo '{"licenseKey": "your-key", "productId": 5, "userId": 9}' > license.json
//! LICENSE_FILE=license.json RUST_LOG=info cargo run --example basic_validation
//! ```

use licenseguard::{LicenseGuardConfig, LicenseManager, LocalIdentity};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = match std::env::var("LICENSE_FILE") {
        Ok(path) => PathBuf::from(path),
        Err(_) => match LocalIdentity::default_path("example-app") {
            Ok(path) => path,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
    };

    let identity = match LocalIdentity::load(&path) {
        Ok(identity) => identity,
        Err(e) => {
            eprintln!("Could not load identity from {}: {}", path.display(), e);
            process::exit(1);
        }
    };

    let config = LicenseGuardConfig {
        app_name: "example-app/0.1.0",
        user_agent_product: "example-app",
        ..Default::default()
    };

    let manager = match LicenseManager::new(config, identity) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let status = manager.status();

    // The startup check blocks here; afterwards rechecks run hourly and the
    // failure callback fires on every invalid one.
    let handle = match manager.validate(
        || println!("✓ License valid"),
        || {
            eprintln!("✗ License invalid, shutting down");
            process::exit(2);
        },
    ) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Could not start license checker: {}", e);
            process::exit(1);
        }
    };

    if let Some(record) = status.current().record.as_ref() {
        println!("  Licensed to: {}", record.username);
        match record.expires_at {
            Some(expires_at) if !record.permanent => println!("  Expires: {}", expires_at),
            _ => println!("  Permanent license"),
        }
    }

    // Stand-in for the real application.
    thread::sleep(Duration::from_secs(10));
    handle.stop();
}
