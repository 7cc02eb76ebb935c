use crate::Suggestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    Rendered,
    /// Suggestions already on screen; the new payload was dropped.
    Discarded,
    /// Nothing to show.
    Empty,
}

/// Suggestions currently rendered near the compose editor. Non-empty means
/// "has unexpired suggestions".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionArea {
    suggestions: Vec<Suggestion>,
}

impl SuggestionArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_unexpired(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// First-arrived suggestions win until the area is cleared.
    pub fn offer(&mut self, suggestions: Vec<Suggestion>) -> OfferOutcome {
        if self.has_unexpired() {
            return OfferOutcome::Discarded;
        }
        if suggestions.is_empty() {
            return OfferOutcome::Empty;
        }
        self.suggestions = suggestions;
        OfferOutcome::Rendered
    }

    pub fn get(&self, index: usize) -> Option<&Suggestion> {
        self.suggestions.get(index)
    }

    /// Remove one suggestion. Returns whether anything was removed.
    pub fn dismiss(&mut self, index: usize) -> bool {
        if index < self.suggestions.len() {
            self.suggestions.remove(index);
            true
        } else {
            false
        }
    }

    /// Drop everything. Returns whether the area held suggestions.
    pub fn clear(&mut self) -> bool {
        let had = self.has_unexpired();
        self.suggestions.clear();
        had
    }
}
