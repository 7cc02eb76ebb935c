use crate::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherPhase {
    /// Probing for the conversation container on a fixed interval.
    Waiting,
    /// Observer bound to the container; no polling.
    Attached,
}

/// Two-state availability machine. Polling and the observer are never both
/// live: the `polling` flag only exists in the waiting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityWatcher {
    state: WatcherState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatcherState {
    Waiting { polling: bool },
    Attached,
}

impl Default for AvailabilityWatcher {
    fn default() -> Self {
        Self {
            state: WatcherState::Waiting { polling: false },
        }
    }
}

impl AvailabilityWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WatcherPhase {
        match self.state {
            WatcherState::Waiting { .. } => WatcherPhase::Waiting,
            WatcherState::Attached => WatcherPhase::Attached,
        }
    }

    pub fn is_polling(&self) -> bool {
        matches!(self.state, WatcherState::Waiting { polling: true })
    }

    pub fn is_attached(&self) -> bool {
        self.state == WatcherState::Attached
    }

    /// Page context started: begin polling if not already doing so.
    pub fn start(&mut self) -> Vec<Effect> {
        match self.state {
            WatcherState::Waiting { polling: false } => {
                self.state = WatcherState::Waiting { polling: true };
                vec![Effect::StartPolling]
            }
            _ => Vec::new(),
        }
    }

    /// Result of one polling probe.
    pub fn probed(&mut self, container_present: bool) -> Vec<Effect> {
        match self.state {
            WatcherState::Waiting { polling: true } if container_present => {
                self.state = WatcherState::Attached;
                vec![Effect::StopPolling, Effect::AttachObserver]
            }
            _ => Vec::new(),
        }
    }

    /// The bound container left the document.
    pub fn detached(&mut self) -> Vec<Effect> {
        match self.state {
            WatcherState::Attached => {
                self.state = WatcherState::Waiting { polling: true };
                vec![Effect::DetachObserver, Effect::StartPolling]
            }
            WatcherState::Waiting { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AvailabilityWatcher, WatcherPhase};
    use crate::Effect;

    #[test]
    fn probe_before_start_is_ignored() {
        let mut watcher = AvailabilityWatcher::new();
        assert!(watcher.probed(true).is_empty());
        assert_eq!(watcher.phase(), WatcherPhase::Waiting);
    }

    #[test]
    fn start_is_idempotent() {
        let mut watcher = AvailabilityWatcher::new();
        assert_eq!(watcher.start(), vec![Effect::StartPolling]);
        assert!(watcher.start().is_empty());
    }

    #[test]
    fn attach_then_detach_round_trip() {
        let mut watcher = AvailabilityWatcher::new();
        watcher.start();
        assert!(watcher.probed(false).is_empty());
        assert_eq!(
            watcher.probed(true),
            vec![Effect::StopPolling, Effect::AttachObserver]
        );
        assert!(watcher.is_attached() && !watcher.is_polling());
        assert!(watcher.probed(true).is_empty());
        assert_eq!(
            watcher.detached(),
            vec![Effect::DetachObserver, Effect::StartPolling]
        );
        assert!(watcher.is_polling() && !watcher.is_attached());
        assert!(watcher.detached().is_empty());
    }
}
