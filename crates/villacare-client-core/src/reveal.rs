use std::collections::BTreeSet;

/// Position of an observed element in the reveal target list.
pub type RevealKey = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed,
}

/// Tracks which scroll-reveal targets have entered the viewport.
///
/// `Hidden -> Revealed` is the only transition; scrolling an element back
/// out of view never hides it again.
#[derive(Debug, Clone, Default)]
pub struct RevealTracker {
    revealed: BTreeSet<RevealKey>,
}

impl RevealTracker {
    #[must_use]
    pub fn state(&self, key: RevealKey) -> RevealState {
        if self.revealed.contains(&key) {
            RevealState::Revealed
        } else {
            RevealState::Hidden
        }
    }

    /// Feeds one intersection entry. Returns `true` when `key` was revealed
    /// by this entry.
    pub fn observe(&mut self, key: RevealKey, is_intersecting: bool) -> bool {
        if !is_intersecting {
            return false;
        }
        self.revealed.insert(key)
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }
}
