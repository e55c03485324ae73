use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Handle for one on-screen word instance, assigned by the layout side. Two
/// occurrences of the same text get different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(pub u64);

impl std::fmt::Display for WordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the gaze mapping layer reports when a word gains focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTarget {
    pub id: WordId,
    pub text: String,
}

impl WordTarget {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id: WordId(id),
            text: text.into(),
        }
    }
}

/// Focus accumulator for one word instance.
#[derive(Debug)]
pub struct WordFocusState {
    pub word: String,
    /// Sustained focus in ms; grows while focused, decays while not, never
    /// below zero.
    pub accumulated_ms: u64,
    /// Visits, counting a return after the reentry threshold as a new one.
    pub entries: u32,
    pub last_sample: Instant,
    pub focus_recorded: bool,
    pub focus_count: u32,
    pub syllabified: bool,
    pub highlighted: bool,
    pub pronounced: bool,
    /// Pending revert of a temporary syllabification.
    pub(crate) revert: Option<CancellationToken>,
}

impl WordFocusState {
    pub fn new(word: impl Into<String>, now: Instant) -> Self {
        Self {
            word: word.into(),
            accumulated_ms: 0,
            entries: 1,
            last_sample: now,
            focus_recorded: false,
            focus_count: 0,
            syllabified: false,
            highlighted: false,
            pronounced: false,
            revert: None,
        }
    }

    /// Adds `sample_ms` when focused, removes it otherwise.
    pub fn accumulate(&mut self, focused: bool, sample_ms: u64) {
        self.accumulated_ms = if focused {
            self.accumulated_ms.saturating_add(sample_ms)
        } else {
            self.accumulated_ms.saturating_sub(sample_ms)
        };
    }

    pub(crate) fn cancel_revert(&mut self) {
        if let Some(token) = self.revert.take() {
            token.cancel();
        }
    }

    pub fn snapshot(&self, id: WordId) -> WordFocusSnapshot {
        WordFocusSnapshot {
            id,
            word: self.word.clone(),
            accumulated_ms: self.accumulated_ms,
            entries: self.entries,
            focus_count: self.focus_count,
            syllabified: self.syllabified,
            highlighted: self.highlighted,
            pronounced: self.pronounced,
        }
    }
}

/// Serializable view of a word's focus state, for statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordFocusSnapshot {
    pub id: WordId,
    pub word: String,
    pub accumulated_ms: u64,
    pub entries: u32,
    pub focus_count: u32,
    pub syllabified: bool,
    pub highlighted: bool,
    pub pronounced: bool,
}

/// Session-scoped arena of focus states, kept in first-focus order.
#[derive(Debug, Default)]
pub struct WordRegistry {
    slots: Vec<(WordId, WordFocusState)>,
    index: HashMap<WordId, usize>,
}

impl WordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: WordId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: WordId) -> Option<&WordFocusState> {
        self.index.get(&id).map(|&slot| &self.slots[slot].1)
    }

    pub fn get_mut(&mut self, id: WordId) -> Option<&mut WordFocusState> {
        self.index.get(&id).map(|&slot| &mut self.slots[slot].1)
    }

    /// Stores `state` under `id`, replacing an earlier one in place.
    pub fn insert(&mut self, id: WordId, state: WordFocusState) -> &mut WordFocusState {
        let slot = match self.index.get(&id) {
            Some(&slot) => {
                self.slots[slot].1 = state;
                slot
            }
            None => {
                self.slots.push((id, state));
                let slot = self.slots.len() - 1;
                self.index.insert(id, slot);
                slot
            }
        };
        &mut self.slots[slot].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, &WordFocusState)> {
        self.slots.iter().map(|(id, state)| (*id, state))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (WordId, &mut WordFocusState)> {
        self.slots.iter_mut().map(|(id, state)| (*id, state))
    }

    /// Drops every state, cancelling pending reverts first.
    pub fn clear(&mut self) {
        for (_, state) in self.slots.iter_mut() {
            state.cancel_revert();
        }
        self.slots.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_is_clamped_at_zero() {
        let mut state = WordFocusState::new("kala", Instant::now());
        state.accumulate(true, 30);
        state.accumulate(false, 30);
        state.accumulate(false, 30);
        assert_eq!(state.accumulated_ms, 0);

        state.accumulate(true, 30);
        state.accumulate(true, 30);
        assert_eq!(state.accumulated_ms, 60);
    }

    #[test]
    fn test_registry_keeps_first_focus_order() {
        let now = Instant::now();
        let mut registry = WordRegistry::new();
        registry.insert(WordId(9), WordFocusState::new("yhdeksän", now));
        registry.insert(WordId(2), WordFocusState::new("kaksi", now));
        registry.insert(WordId(5), WordFocusState::new("viisi", now));

        let ids: Vec<_> = registry.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![9, 2, 5]);
        assert_eq!(registry.get(WordId(2)).unwrap().word, "kaksi");
    }

    #[test]
    fn test_clear_cancels_reverts() {
        let mut registry = WordRegistry::new();
        let token = CancellationToken::new();
        let state = registry.insert(WordId(1), WordFocusState::new("talo", Instant::now()));
        state.revert = Some(token.clone());

        registry.clear();
        assert!(token.is_cancelled());
        assert!(registry.is_empty());
        assert!(!registry.contains(WordId(1)));
    }
}
