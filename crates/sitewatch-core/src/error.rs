// ── Core error types ──
//
// One variant per backend operation, matching the propagation policy:
// roster failures reach the initialization caller, check failures become
// a user-facing notice, history failures are recovered silently inside
// the cache and never surface here.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Roster fetch failed or returned non-2xx. The roster has been
    /// reset to empty.
    #[error("failed to load site roster: {0}")]
    RosterLoad(#[source] sitewatch_api::Error),

    /// Batch-check request failed or returned non-2xx. The roster is
    /// unchanged from before the call.
    #[error("site availability check failed: {0}")]
    CheckRequest(#[source] sitewatch_api::Error),

    /// History fetch failed. Only constructed for logging — the cache
    /// substitutes an empty record sequence and recovers.
    #[error("failed to load check history for {service}/{name}: {source}")]
    HistoryLoad {
        service: String,
        name: String,
        #[source]
        source: sitewatch_api::Error,
    },
}

impl CoreError {
    /// Whether the underlying failure is transient (timeout, connection
    /// refused, 5xx). Transient failures warrant a softer user notice —
    /// the next manual check may simply succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RosterLoad(source)
            | Self::CheckRequest(source)
            | Self::HistoryLoad { source, .. } => source.is_transient(),
        }
    }
}
