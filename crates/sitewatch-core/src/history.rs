// ── Per-site history cache ──
//
// Lazy fetch-once cache of historical check records, keyed by site
// identity. A populated entry is authoritative for the rest of the
// session — there is no invalidation or refresh. A failed fetch leaves
// the entry unpopulated so a later call can retry.
//
// There is deliberately no in-flight de-duplication: two concurrent
// `get` calls for the same identity issue two fetches, and the second
// response wins. The UI drives this from single-threaded toggle events,
// where that race cannot occur.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use sitewatch_api::{ApiClient, HistoryRecord};

use crate::error::CoreError;
use crate::model::SiteKey;

/// Lazy per-site cache of historical check records.
///
/// Cheaply cloneable; clones share the same storage and API client.
#[derive(Clone)]
pub struct HistoryCache {
    inner: Arc<HistoryCacheInner>,
}

struct HistoryCacheInner {
    api: ApiClient,
    /// Identity -> records, in server-returned order. No entry means
    /// "not yet requested" (or a fetch is still outstanding).
    records: DashMap<SiteKey, Arc<Vec<HistoryRecord>>>,
}

impl HistoryCache {
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(HistoryCacheInner {
                api,
                records: DashMap::new(),
            }),
        }
    }

    /// Return the cached records for `key`, fetching them on first use.
    ///
    /// A cache hit returns immediately with no network access. On fetch
    /// failure this returns an empty sequence and does NOT populate the
    /// cache, so a later expand can retry — unlike the batch check,
    /// which never auto-retries.
    pub async fn get(&self, key: &SiteKey) -> Arc<Vec<HistoryRecord>> {
        if let Some(entry) = self.inner.records.get(key) {
            return Arc::clone(entry.value());
        }

        match self.inner.api.history(&key.service, &key.name).await {
            Ok(records) => {
                debug!(site = %key, count = records.len(), "loaded check history");
                let records = Arc::new(records);
                self.inner
                    .records
                    .insert(key.clone(), Arc::clone(&records));
                records
            }
            Err(source) => {
                // Recovered locally: empty history, entry left unpopulated.
                let err = CoreError::HistoryLoad {
                    service: key.service.clone(),
                    name: key.name.clone(),
                    source,
                };
                warn!(error = %err, "substituting empty history");
                Arc::new(Vec::new())
            }
        }
    }

    /// Look up a cached entry without fetching. `None` while the entry
    /// is not yet requested or a fetch is still outstanding — the
    /// renderer shows the loading presentation in that window.
    pub fn peek(&self, key: &SiteKey) -> Option<Arc<Vec<HistoryRecord>>> {
        self.inner
            .records
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
    }
}

// ── Derived statistics ───────────────────────────────────────────────

/// Availability rate over a record sequence: `100 × available / total`,
/// rounded to one decimal place. `None` for an empty sequence, in which
/// case the renderer shows the empty-history presentation instead.
pub fn availability_rate(records: &[HistoryRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let available = records.iter().filter(|r| r.available).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = 100.0 * available as f64 / records.len() as f64;
    Some((rate * 10.0).round() / 10.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(available: bool) -> HistoryRecord {
        HistoryRecord {
            available,
            response_time_ms: available.then_some(100.0),
            error: (!available).then(|| "timeout".into()),
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn three_of_four_available_is_75_point_0() {
        let records = vec![record(true), record(true), record(false), record(true)];
        let rate = availability_rate(&records).unwrap();
        assert_eq!(format!("{rate:.1}"), "75.0");
    }

    #[test]
    fn rate_rounds_to_one_decimal() {
        // 2/3 = 66.666... -> 66.7
        let records = vec![record(true), record(true), record(false)];
        assert_eq!(availability_rate(&records), Some(66.7));
    }

    #[test]
    fn empty_sequence_has_no_rate() {
        assert_eq!(availability_rate(&[]), None);
    }
}
