use crate::{Conversation, RelayResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page context finished starting up.
    PageLoaded,
    /// Polling tick probed the document for the conversation container.
    PollTick { container_present: bool },
    /// The observed container is no longer in the document.
    ContainerDetached,
    /// Observer delivered a batch; carries the re-extracted conversation.
    MutationBatch(Conversation),
    /// External on-demand trigger; carries a fresh extraction.
    TriggerRequested(Conversation),
    /// Inbound relay frame.
    RelayReceived(RelayResponse),
    /// Operator clicked a rendered suggestion.
    SuggestionClicked(usize),
    /// Operator dismissed one rendered suggestion.
    SuggestionDismissed(usize),
    /// Operator dismissed the whole suggestion area.
    SuggestionsDismissed,
    /// Operator clicked the host page's own send control.
    SendClicked,
}
