// ── Status classification ──
//
// Pure projection of a site's raw fields into a display status. The rule
// order is absolute: first match wins. Rules 3-5 read the three-tier
// `status`; rules 6-7 are the back-compat path for backends that only set
// the boolean `available`. Legacy results carry no sub-status, so rule 7
// attaches no badge.

use sitewatch_api::{Site, StatusTier};

// ── Sub-status ───────────────────────────────────────────────────────

/// Closed enumeration of fine-grained reason codes.
///
/// Values outside the known set parse to [`SubStatus::Unknown`], which
/// renders no badge — fail open, not an error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubStatus {
    None,
    SlowLatency,
    RateLimit,
    AuthError,
    InvalidRequest,
    ServerError,
    ContentMismatch,
    NetworkError,
    ClientError,
    Unknown,
}

impl SubStatus {
    /// Parse a wire sub-status string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "none" => Self::None,
            "slow_latency" => Self::SlowLatency,
            "rate_limit" => Self::RateLimit,
            "auth_error" => Self::AuthError,
            "invalid_request" => Self::InvalidRequest,
            "server_error" => Self::ServerError,
            "content_mismatch" => Self::ContentMismatch,
            "network_error" => Self::NetworkError,
            "client_error" => Self::ClientError,
            _ => Self::Unknown,
        }
    }

    /// The badge this sub-status renders, if any.
    pub fn badge(self) -> Option<Badge> {
        let (label, kind) = match self {
            Self::SlowLatency => ("slow", BadgeKind::Slow),
            Self::RateLimit => ("rate limited", BadgeKind::Error),
            Self::AuthError => ("auth failed", BadgeKind::Error),
            Self::InvalidRequest => ("bad request", BadgeKind::Error),
            Self::ServerError => ("server error", BadgeKind::Error),
            Self::ContentMismatch => ("content mismatch", BadgeKind::Error),
            Self::NetworkError => ("network error", BadgeKind::Error),
            Self::ClientError => ("client error", BadgeKind::Error),
            Self::None | Self::Unknown => return None,
        };
        Some(Badge { label, kind })
    }
}

/// Visual severity of a sub-status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Slow,
    Error,
}

/// A rendered sub-status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub kind: BadgeKind,
}

// ── Classification output ────────────────────────────────────────────

/// Coarse display status, in classification precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Disabled,
    Checking,
    Available,
    Degraded,
    Unavailable,
    Unchecked,
}

/// What the renderer shows for one site: icon glyph, status text, coarse
/// kind (drives color), and an optional sub-status badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPresentation {
    pub icon: &'static str,
    pub text: String,
    pub kind: StatusKind,
    pub badge: Option<Badge>,
}

// ── Classifier ───────────────────────────────────────────────────────

/// Classify one site for display. `checking` is the orchestrator's
/// in-flight flag — while a batch check runs, every enabled site shows
/// the transient checking presentation, overriding stale prior results.
pub fn classify(site: &Site, checking: bool) -> StatusPresentation {
    // Rule 1: disabled sites ignore every other field.
    if !site.enable_check {
        return StatusPresentation {
            icon: "◉",
            text: "checks disabled".into(),
            kind: StatusKind::Disabled,
            badge: None,
        };
    }

    // Rule 2: a check in flight overrides prior results.
    if checking {
        return StatusPresentation {
            icon: "◌",
            text: "checking...".into(),
            kind: StatusKind::Checking,
            badge: None,
        };
    }

    let sub_status = site.sub_status.as_deref().map(SubStatus::parse);

    match site.status {
        // Rule 3: available, text is the rounded response time.
        Some(StatusTier::Available) => available_presentation(site.response_time_ms),

        // Rule 4: degraded, with a special slow-latency text.
        Some(StatusTier::Degraded) => {
            let text = if sub_status == Some(SubStatus::SlowLatency) {
                match site.response_time_ms {
                    Some(ms) => format!("slow {}ms", round_ms(ms)),
                    None => "slow".into(),
                }
            } else {
                "degraded".into()
            };
            StatusPresentation {
                icon: "◐",
                text,
                kind: StatusKind::Degraded,
                badge: sub_status.and_then(SubStatus::badge),
            }
        }

        // Rule 5: unavailable, text is the error if the backend sent one.
        Some(StatusTier::Unavailable) => StatusPresentation {
            icon: "○",
            text: site.error.clone().unwrap_or_else(|| "unavailable".into()),
            kind: StatusKind::Unavailable,
            badge: sub_status.and_then(SubStatus::badge),
        },

        None => match site.available {
            // Rule 6: legacy boolean path, same rendering as rule 3.
            Some(true) => available_presentation(site.response_time_ms),

            // Rule 7: legacy unavailable — no badge, legacy responses
            // carry no sub-status.
            Some(false) => StatusPresentation {
                icon: "○",
                text: site.error.clone().unwrap_or_else(|| "unavailable".into()),
                kind: StatusKind::Unavailable,
                badge: None,
            },

            // Rule 8: never checked.
            None => StatusPresentation {
                icon: "·",
                text: "not checked yet".into(),
                kind: StatusKind::Unchecked,
                badge: None,
            },
        },
    }
}

fn available_presentation(response_time_ms: Option<f64>) -> StatusPresentation {
    let text = match response_time_ms {
        Some(ms) => format!("{}ms", round_ms(ms)),
        None => "available".into(),
    };
    StatusPresentation {
        icon: "●",
        text,
        kind: StatusKind::Available,
        badge: None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_ms(ms: f64) -> u64 {
    ms.round().max(0.0) as u64
}
