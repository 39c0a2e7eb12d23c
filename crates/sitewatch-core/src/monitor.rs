// ── Check orchestration ──
//
// Owns the site roster, the single-flight `checking` flag, and the
// last-check timestamp. Every state mutation bumps a watch channel so
// the renderer redraws synchronously with the change.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use sitewatch_api::{ApiClient, CheckResult, Site};

use crate::error::CoreError;

/// Per-probe timeout sent with every batch check, in seconds. A policy
/// constant of the orchestrator, not configurable at call time.
pub const CHECK_TIMEOUT_SECS: u64 = 10;

/// Maximum concurrent probes the backend may run for one batch check.
pub const MAX_CONCURRENT_PROBES: usize = 5;

/// Outcome of a [`Monitor::check_all`] call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The batch check ran; `merged` results were matched back into the
    /// roster by identity.
    Completed { merged: usize },
    /// A check was already in flight — the call was a no-op and no
    /// request was sent.
    AlreadyChecking,
    /// Every roster site has checks disabled (or the roster is empty);
    /// nothing was sent and the checking flag was never set.
    NoEnabledSites,
}

/// The check orchestrator.
///
/// Cheaply cloneable via `Arc`; clones share the roster and flags.
/// The roster, checking flag, and last-check timestamp are mutated only
/// here — the renderer reads them through the accessors.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    api: ApiClient,
    roster: RwLock<Vec<Site>>,
    /// Single-flight guard for `check_all`. Reset on every exit path.
    checking: AtomicBool,
    last_check: RwLock<Option<DateTime<Utc>>>,
    /// Version counter, bumped on every state mutation. Subscribers
    /// redraw on change.
    version: watch::Sender<u64>,
}

impl Monitor {
    pub fn new(api: ApiClient) -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            inner: Arc::new(MonitorInner {
                api,
                roster: RwLock::new(Vec::new()),
                checking: AtomicBool::new(false),
                last_check: RwLock::new(None),
                version,
            }),
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Load the site roster from the backend, replacing it wholesale.
    ///
    /// On failure the roster is cleared to empty and the error is
    /// returned to the caller — startup skips the automatic first check
    /// when the roster is empty. No retry.
    pub async fn load_roster(&self) -> Result<Vec<Site>, CoreError> {
        match self.inner.api.list_sites().await {
            Ok(sites) => {
                info!(count = sites.len(), "loaded site roster");
                *self.write_roster() = sites.clone();
                self.bump();
                Ok(sites)
            }
            Err(e) => {
                warn!(error = %e, "roster load failed, clearing roster");
                self.write_roster().clear();
                self.bump();
                Err(CoreError::RosterLoad(e))
            }
        }
    }

    /// Run one batch availability check over the enabled roster sites.
    ///
    /// Single-flight guarded: a call while a check is in flight is a
    /// no-op that performs zero network calls. On total failure the
    /// roster is left in its pre-call state — there is no partial
    /// merge. The checking flag is released on every exit path of the
    /// fallible section, followed by a final change notification.
    pub async fn check_all(&self) -> Result<CheckOutcome, CoreError> {
        if self.inner.checking.load(Ordering::Acquire) {
            debug!("check already in flight, ignoring duplicate request");
            return Ok(CheckOutcome::AlreadyChecking);
        }

        let enabled: Vec<Site> = self
            .roster()
            .into_iter()
            .filter(|site| site.enable_check)
            .collect();

        if enabled.is_empty() {
            debug!("no enabled sites, skipping check");
            return Ok(CheckOutcome::NoEnabledSites);
        }

        if self
            .inner
            .checking
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(CheckOutcome::AlreadyChecking);
        }
        self.bump();

        info!(sites = enabled.len(), "starting availability check");
        let outcome = self.run_check(&enabled).await;

        // Guaranteed release, success or failure, then one final redraw.
        self.inner.checking.store(false, Ordering::Release);
        self.bump();

        outcome
    }

    /// The fallible section of `check_all`: request, merge, timestamp.
    async fn run_check(&self, enabled: &[Site]) -> Result<CheckOutcome, CoreError> {
        let results = self
            .inner
            .api
            .check_sites(enabled, CHECK_TIMEOUT_SECS, MAX_CONCURRENT_PROBES)
            .await
            .map_err(CoreError::CheckRequest)?;

        info!(results = results.len(), "received check results");

        let merged = merge_results(&mut self.write_roster(), &results);
        *self
            .inner
            .last_check
            .write()
            .expect("last_check lock poisoned") = Some(Utc::now());

        Ok(CheckOutcome::Completed { merged })
    }

    // ── Read accessors ───────────────────────────────────────────────

    /// Snapshot of the current roster.
    pub fn roster(&self) -> Vec<Site> {
        self.inner
            .roster
            .read()
            .expect("roster lock poisoned")
            .clone()
    }

    /// Whether a batch check is currently in flight.
    pub fn is_checking(&self) -> bool {
        self.inner.checking.load(Ordering::Acquire)
    }

    /// When the last successful check completed, if any.
    pub fn last_check(&self) -> Option<DateTime<Utc>> {
        *self
            .inner
            .last_check
            .read()
            .expect("last_check lock poisoned")
    }

    /// Subscribe to state-change notifications.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn write_roster(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Site>> {
        self.inner.roster.write().expect("roster lock poisoned")
    }

    fn bump(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.inner.version.send_modify(|v| *v += 1);
    }
}

/// Merge check results into the roster by `(service, name)` identity.
///
/// Matched sites have their dynamic state replaced wholesale; sites with
/// no matching result keep their previous state untouched. Returns the
/// number of results applied.
fn merge_results(roster: &mut [Site], results: &[CheckResult]) -> usize {
    let mut merged = 0;
    for site in &mut *roster {
        if let Some(result) = results.iter().find(|r| site.matches(r)) {
            site.apply_result(result);
            merged += 1;
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn roster_sites() -> Vec<Site> {
        serde_json::from_value(json!([
            { "service": "claude", "name": "A", "base_url": "https://a.example" },
            { "service": "claude", "name": "B", "base_url": "https://b.example" },
        ]))
        .unwrap()
    }

    #[test]
    fn merge_replaces_matched_and_leaves_unmatched_untouched() {
        let mut roster = roster_sites();
        let before_b = roster[1].clone();

        let results: Vec<CheckResult> = serde_json::from_value(json!([
            { "service": "claude", "name": "A", "available": true,
              "response_time_ms": 120.0 }
        ]))
        .unwrap();

        let merged = merge_results(&mut roster, &results);

        assert_eq!(merged, 1);
        assert_eq!(roster[0].available, Some(true));
        assert_eq!(roster[0].response_time_ms, Some(120.0));
        // B is identical to its pre-call value.
        assert_eq!(roster[1], before_b);
    }

    #[test]
    fn merge_is_keyed_by_both_service_and_name() {
        let mut roster = roster_sites();

        // Same name, different service family — must not match.
        let results: Vec<CheckResult> = serde_json::from_value(json!([
            { "service": "codex", "name": "A", "available": false }
        ]))
        .unwrap();

        assert_eq!(merge_results(&mut roster, &results), 0);
        assert_eq!(roster[0].available, None);
    }

    #[test]
    fn merge_clears_stale_error_fields() {
        let mut roster: Vec<Site> = serde_json::from_value(json!([
            { "service": "claude", "name": "A", "base_url": "https://a.example",
              "available": false, "error": "timeout", "error_type": "network_error" }
        ]))
        .unwrap();

        let results: Vec<CheckResult> = serde_json::from_value(json!([
            { "service": "claude", "name": "A", "available": true,
              "response_time_ms": 80.0, "checked_at": "2025-06-01T10:00:00Z" }
        ]))
        .unwrap();

        merge_results(&mut roster, &results);

        // Replacement is wholesale over the merge set: absent result
        // fields clear the stale values.
        assert_eq!(roster[0].available, Some(true));
        assert_eq!(roster[0].error, None);
        assert_eq!(roster[0].error_type, None);
        assert!(roster[0].checked_at.is_some());
    }
}
