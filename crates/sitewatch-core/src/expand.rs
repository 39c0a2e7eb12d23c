// ── Card expansion state ──
//
// Purely presentational: the set of site identities whose history
// section is currently open. Collapsing never evicts the history cache
// entry — re-expanding is instant.

use std::collections::HashSet;

use crate::model::SiteKey;

/// Set of currently expanded site identities.
#[derive(Debug, Default)]
pub struct ExpansionState {
    expanded: HashSet<SiteKey>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle one identity. Returns `true` if the identity is now
    /// expanded. Idempotent per identity: absent → present → absent.
    pub fn toggle(&mut self, key: &SiteKey) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.clone());
            true
        }
    }

    pub fn is_expanded(&self, key: &SiteKey) -> bool {
        self.expanded.contains(key)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trips() {
        let mut state = ExpansionState::new();
        let key = SiteKey::new("claude", "primary");

        assert!(!state.is_expanded(&key));
        assert!(state.toggle(&key));
        assert!(state.is_expanded(&key));
        assert!(!state.toggle(&key));
        assert!(!state.is_expanded(&key));
    }

    #[test]
    fn identities_toggle_independently() {
        let mut state = ExpansionState::new();
        let a = SiteKey::new("claude", "a");
        let b = SiteKey::new("claude", "b");

        state.toggle(&a);
        assert!(state.is_expanded(&a));
        assert!(!state.is_expanded(&b));
        assert_eq!(state.len(), 1);
    }
}
