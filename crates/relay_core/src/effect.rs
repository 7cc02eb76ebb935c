use crate::{RelayRequest, Suggestion};

/// Side effects requested by `update`; executed by the page runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start probing for the conversation container on the poll interval.
    StartPolling,
    /// Cancel the probe timer. Safe to repeat.
    StopPolling,
    /// Bind a mutation observer to the conversation container.
    AttachObserver,
    /// Disconnect the observer. Safe to repeat.
    DetachObserver,
    /// Post a request on the relay channel.
    PostRelay(RelayRequest),
    /// Render the given set into the suggestion anchor, replacing what is there.
    RenderSuggestions(Vec<Suggestion>),
    ClearSuggestions,
    /// Replace the compose editor's text.
    InsertCompose { text: String },
    /// Synthetic click that makes the host page notice inserted text.
    ActivateEditor,
}
