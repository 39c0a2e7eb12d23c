// ── Site identity ──
//
// The `(service, name)` pair is the sole key used for result matching,
// history caching, and expansion tracking. A site's identity never
// changes across a check cycle.

use std::fmt;

use sitewatch_api::Site;

/// Identity of one monitored site: the `(service, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteKey {
    pub service: String,
    pub name: String,
}

impl SiteKey {
    pub fn new(service: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            name: name.into(),
        }
    }
}

impl From<&Site> for SiteKey {
    fn from(site: &Site) -> Self {
        Self::new(site.service.clone(), site.name.clone())
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.name)
    }
}
