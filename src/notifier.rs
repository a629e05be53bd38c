//! Dispatches validation outcomes to the host's callbacks and produces the
//! startup summary lines.

use crate::identity::LocalIdentity;
use crate::protocol::models::LicenseRecord;
use crate::validator::Outcome;
use std::sync::Arc;
use tracing::info;

/// A host-supplied callback.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Invokes `on_valid` / `on_invalid` according to evaluation outcomes.
#[derive(Clone)]
pub struct Notifier {
    on_valid: Callback,
    on_invalid: Callback,
}

impl Notifier {
    /// Wrap the host's callbacks.
    pub fn new<V, I>(on_valid: V, on_invalid: I) -> Self
    where
        V: Fn() + Send + Sync + 'static,
        I: Fn() + Send + Sync + 'static,
    {
        Self {
            on_valid: Arc::new(on_valid),
            on_invalid: Arc::new(on_invalid),
        }
    }

    /// Report the first evaluation. Exactly one callback runs.
    pub fn notify_startup(&self, outcome: Outcome) {
        match outcome {
            Outcome::Valid => (self.on_valid)(),
            Outcome::Invalid => (self.on_invalid)(),
        }
    }

    /// Report a background recheck. Only invalid outcomes are reported, and
    /// every one of them is, including repeats.
    pub fn notify_tick(&self, outcome: Outcome) {
        if outcome == Outcome::Invalid {
            (self.on_invalid)();
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}

/// Summary lines for the startup banner: product, licensee, validity.
///
/// The licensee is the record's username when valid, otherwise the locally
/// configured user id.
pub fn report_lines(
    identity: &LocalIdentity,
    outcome: Outcome,
    record: Option<&LicenseRecord>,
) -> Vec<String> {
    let licensed_to = match (outcome, record) {
        (Outcome::Valid, Some(record)) => record.username.clone(),
        _ => identity.user_id().to_string(),
    };
    let validity = match outcome {
        Outcome::Valid => "Valid",
        Outcome::Invalid => "Invalid",
    };

    vec![
        format!("Product ID: {}", identity.product_id()),
        format!("Licensed to: {}", licensed_to),
        format!("License is: {}", validity),
    ]
}

/// Receives the startup summary lines for display.
pub trait BannerSink: Send + Sync {
    /// Display the lines, in order.
    fn render(&self, lines: &[String]);
}

/// Default sink: one `info` event per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBanner;

impl BannerSink for LogBanner {
    fn render(&self, lines: &[String]) {
        for line in lines {
            info!(target: "licenseguard::banner", "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (Notifier, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let valid = Arc::new(AtomicUsize::new(0));
        let invalid = Arc::new(AtomicUsize::new(0));
        let (v, i) = (valid.clone(), invalid.clone());
        let notifier = Notifier::new(
            move || {
                v.fetch_add(1, Ordering::SeqCst);
            },
            move || {
                i.fetch_add(1, Ordering::SeqCst);
            },
        );
        (notifier, valid, invalid)
    }

    fn record() -> LicenseRecord {
        LicenseRecord {
            product_id: 5,
            user_id: 9,
            username: "kelvin".to_string(),
            license_key: "KEY".to_string(),
            bound_ips: vec![],
            sponsored: false,
            active: true,
            permanent: true,
            expires: None,
            expires_at: None,
        }
    }

    #[test]
    fn startup_runs_exactly_one_callback() {
        let (notifier, valid, invalid) = counting();
        notifier.notify_startup(Outcome::Valid);
        assert_eq!(valid.load(Ordering::SeqCst), 1);
        assert_eq!(invalid.load(Ordering::SeqCst), 0);

        let (notifier, valid, invalid) = counting();
        notifier.notify_startup(Outcome::Invalid);
        assert_eq!(valid.load(Ordering::SeqCst), 0);
        assert_eq!(invalid.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ticks_never_report_success() {
        let (notifier, valid, invalid) = counting();
        notifier.notify_tick(Outcome::Valid);
        notifier.notify_tick(Outcome::Valid);
        assert_eq!(valid.load(Ordering::SeqCst), 0);
        assert_eq!(invalid.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn every_invalid_tick_is_reported() {
        let (notifier, _, invalid) = counting();
        notifier.notify_tick(Outcome::Invalid);
        notifier.notify_tick(Outcome::Invalid);
        notifier.notify_tick(Outcome::Valid);
        notifier.notify_tick(Outcome::Invalid);
        assert_eq!(invalid.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn valid_lines_name_the_licensee() {
        let identity = LocalIdentity::new("KEY", 5, 9);
        let lines = report_lines(&identity, Outcome::Valid, Some(&record()));
        assert_eq!(
            lines,
            vec!["Product ID: 5", "Licensed to: kelvin", "License is: Valid"]
        );
    }

    #[test]
    fn invalid_lines_fall_back_to_local_user() {
        let identity = LocalIdentity::new("KEY", 5, 9);
        let lines = report_lines(&identity, Outcome::Invalid, Some(&record()));
        assert_eq!(
            lines,
            vec!["Product ID: 5", "Licensed to: 9", "License is: Invalid"]
        );

        let lines = report_lines(&identity, Outcome::Invalid, None);
        assert_eq!(lines[1], "Licensed to: 9");
    }
}
