// Wire types for the site-availability backend
//
// Field names are part of the wire contract and must match the backend
// exactly. Dynamic fields use `#[serde(default)]` because a site that has
// never been checked carries none of them, and older backends omit the
// three-tier `status` entirely (only the boolean `available`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Status tiers ─────────────────────────────────────────────────────

/// Three-tier availability status, serialized as a bare integer.
///
/// `0` = unavailable, `1` = available, `2` = degraded (slow or
/// rate-limited). Legacy backends never set this and report only the
/// boolean `available` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StatusTier {
    Unavailable,
    Available,
    Degraded,
}

impl TryFrom<u8> for StatusTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unavailable),
            1 => Ok(Self::Available),
            2 => Ok(Self::Degraded),
            other => Err(format!("invalid status tier: {other}")),
        }
    }
}

impl From<StatusTier> for u8 {
    fn from(tier: StatusTier) -> Self {
        match tier {
            StatusTier::Unavailable => 0,
            StatusTier::Available => 1,
            StatusTier::Degraded => 2,
        }
    }
}

// ── Site ─────────────────────────────────────────────────────────────

/// One monitored upstream endpoint.
///
/// Identity is the `(service, name)` pair — that pair is the sole key
/// used for result matching, history caching, and expansion tracking.
/// Everything past `enable_check` is dynamic state, absent until the
/// site is first checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub service: String,
    pub name: String,
    #[serde(default)]
    pub base_url: String,
    /// Whether the backend should probe this site. Defaults to true
    /// when the roster omits it.
    #[serde(default = "default_enable_check")]
    pub enable_check: bool,

    // ── Dynamic state (absent until first checked) ──
    /// Legacy two-value status; consulted only when `status` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusTier>,
    /// Fine-grained reason code; meaningful only for unavailable or
    /// degraded sites. `"none"` and unknown values render no badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

fn default_enable_check() -> bool {
    true
}

impl Site {
    /// Replace this site's dynamic state with a check result's values.
    ///
    /// Copies exactly `available`, `status_code`, `response_time_ms`,
    /// `error`, `error_type`, and `checked_at` — the result's
    /// `status`/`sub_status` are wire-only and deliberately not merged,
    /// matching the backend's established merge set. Identity and static
    /// attributes are never touched.
    pub fn apply_result(&mut self, result: &CheckResult) {
        self.available = Some(result.available);
        self.status_code = result.status_code;
        self.response_time_ms = result.response_time_ms;
        self.error = result.error.clone();
        self.error_type = result.error_type.clone();
        self.checked_at = result.checked_at;
    }

    /// Whether a check result belongs to this site.
    pub fn matches(&self, result: &CheckResult) -> bool {
        self.service == result.service && self.name == result.name
    }
}

// ── CheckResult ──────────────────────────────────────────────────────

/// One probe outcome from a batch check, matched back to exactly one
/// site by `(service, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub service: String,
    pub name: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

// ── HistoryRecord ────────────────────────────────────────────────────

/// One past check outcome for a single site. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub available: bool,
    #[serde(default)]
    pub response_time_ms: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

// ── Request / response bodies ────────────────────────────────────────

/// Body of `POST /api/site-availability/check`.
#[derive(Debug, Serialize)]
pub struct CheckRequest<'a> {
    pub sites: &'a [Site],
    /// Per-probe timeout in seconds, enforced server-side.
    pub timeout: u64,
    /// Maximum concurrent probes on the backend.
    pub max_concurrent: usize,
}

/// Response of `GET /api/site-availability/sites`. An omitted list is
/// treated as empty.
#[derive(Debug, Deserialize)]
pub struct SitesResponse {
    #[serde(default)]
    pub sites: Vec<Site>,
}

/// Response of `POST /api/site-availability/check`.
#[derive(Debug, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub results: Vec<CheckResult>,
}

/// Response of `GET /api/site-availability/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub records: Vec<HistoryRecord>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn site_defaults_enable_check_to_true() {
        let site: Site =
            serde_json::from_str(r#"{"service":"claude","name":"A","base_url":"https://a"}"#)
                .unwrap();
        assert!(site.enable_check);
        assert!(site.status.is_none());
        assert!(site.available.is_none());
    }

    #[test]
    fn status_tier_round_trips_as_integer() {
        let site: Site = serde_json::from_str(
            r#"{"service":"claude","name":"A","base_url":"https://a","status":2}"#,
        )
        .unwrap();
        assert_eq!(site.status, Some(StatusTier::Degraded));

        let json = serde_json::to_value(&site).unwrap();
        assert_eq!(json["status"], 2);
    }

    #[test]
    fn status_tier_rejects_out_of_range() {
        let result = serde_json::from_str::<Site>(
            r#"{"service":"claude","name":"A","base_url":"https://a","status":7}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn apply_result_replaces_only_the_merge_set() {
        let mut site: Site = serde_json::from_str(
            r#"{"service":"claude","name":"A","base_url":"https://a","status":1,"sub_status":"none"}"#,
        )
        .unwrap();
        let result: CheckResult = serde_json::from_str(
            r#"{"service":"claude","name":"A","available":false,"status":0,
                "sub_status":"server_error","status_code":503,
                "response_time_ms":41.5,"error":"server error (5xx)",
                "error_type":"server_error","checked_at":"2025-06-01T10:00:00Z"}"#,
        )
        .unwrap();

        site.apply_result(&result);

        assert_eq!(site.available, Some(false));
        assert_eq!(site.status_code, Some(503));
        assert_eq!(site.error.as_deref(), Some("server error (5xx)"));
        assert_eq!(site.error_type.as_deref(), Some("server_error"));
        // status/sub_status come from the roster, not the merge.
        assert_eq!(site.status, Some(StatusTier::Available));
        assert_eq!(site.sub_status.as_deref(), Some("none"));
    }
}
