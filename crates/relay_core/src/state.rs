use crate::view_model::PageViewModel;
use crate::{
    detect_platform, AvailabilityWatcher, Platform, RelayGate, SelectorSet, SuggestionArea,
};

/// Everything one page context owns: resolved platform, its selectors, the
/// availability watcher, relay gate and suggestion area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    platform: Platform,
    selectors: Option<&'static SelectorSet>,
    pub(crate) watcher: AvailabilityWatcher,
    pub(crate) gate: RelayGate,
    pub(crate) area: SuggestionArea,
    pub(crate) last_error: Option<String>,
    dirty: bool,
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new(Platform::Unknown)
    }
}

impl PageContext {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            selectors: SelectorSet::for_platform(platform),
            watcher: AvailabilityWatcher::new(),
            gate: RelayGate::new(),
            area: SuggestionArea::new(),
            last_error: None,
            dirty: false,
        }
    }

    /// Build the context for the page at `location` (host or URL).
    pub fn for_location(location: &str) -> Self {
        Self::new(detect_platform(location))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// `None` when the platform is unknown; the context is then inert.
    pub fn selectors(&self) -> Option<&'static SelectorSet> {
        self.selectors
    }

    pub fn watcher(&self) -> &AvailabilityWatcher {
        &self.watcher
    }

    pub fn area(&self) -> &SuggestionArea {
        &self.area
    }

    pub fn view(&self) -> PageViewModel {
        PageViewModel {
            platform: self.platform,
            watcher: self.watcher.phase(),
            request_in_flight: self.gate.is_in_flight(),
            suggestions: self
                .area
                .suggestions()
                .iter()
                .map(|s| s.text.clone())
                .collect(),
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the view changed since the last call, and resets it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
