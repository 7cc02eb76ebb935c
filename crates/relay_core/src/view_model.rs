use crate::{Platform, WatcherPhase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageViewModel {
    pub platform: Platform,
    pub watcher: WatcherPhase,
    pub request_in_flight: bool,
    pub suggestions: Vec<String>,
    pub last_error: Option<String>,
    pub dirty: bool,
}
