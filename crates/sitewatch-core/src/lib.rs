//! State and derivation layer between `sitewatch-api` and UI consumers.
//!
//! This crate owns the business logic of the availability monitor:
//!
//! - **[`Monitor`]** — Check orchestrator. Owns the site roster, the
//!   single-flight `checking` flag, and the last-check timestamp.
//!   [`load_roster()`](Monitor::load_roster) replaces the roster wholesale;
//!   [`check_all()`](Monitor::check_all) runs one guarded batch check and
//!   merges results back by `(service, name)` identity. A
//!   `tokio::sync::watch` version counter notifies the renderer of every
//!   state change.
//!
//! - **[`classify`]** — Pure status classifier: maps a site's raw fields
//!   (three-tier `status`, legacy boolean `available`, sub-status reason
//!   codes) to a display presentation using a fixed 8-rule precedence.
//!
//! - **[`HistoryCache`]** — Lazy fetch-once cache of per-site historical
//!   check records, keyed by [`SiteKey`]. Failed fetches substitute an
//!   empty sequence without populating the cache.
//!
//! - **[`ExpansionState`]** — The set of site identities whose history
//!   section is open in the UI.
//!
//! The actual probing of upstream sites happens server-side; this crate
//! only talks to the backend's three endpoints through
//! [`ApiClient`](sitewatch_api::ApiClient).

pub mod classify;
pub mod error;
pub mod expand;
pub mod history;
pub mod model;
pub mod monitor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classify::{Badge, BadgeKind, StatusKind, StatusPresentation, SubStatus, classify};
pub use error::CoreError;
pub use expand::ExpansionState;
pub use history::{HistoryCache, availability_rate};
pub use model::SiteKey;
pub use monitor::{CHECK_TIMEOUT_SECS, CheckOutcome, MAX_CONCURRENT_PROBES, Monitor};

// Re-export the wire types consumers render from.
pub use sitewatch_api::{ApiClient, CheckResult, HistoryRecord, Site, StatusTier};
