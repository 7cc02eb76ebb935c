use relay_logging::{relay_debug, relay_info};

use crate::{
    propose_relay, Conversation, EditorActivation, Effect, GateDecision, Msg, OfferOutcome,
    PageContext, RelayResponse, ReplyDisposition,
};

/// Pure update function: applies a message to the page context and returns
/// any effects. On an unknown platform every message is a no-op.
pub fn update(mut state: PageContext, msg: Msg) -> (PageContext, Vec<Effect>) {
    let Some(selectors) = state.selectors() else {
        return (state, Vec::new());
    };

    let effects = match msg {
        Msg::PageLoaded => {
            let effects = state.watcher.start();
            if !effects.is_empty() {
                relay_info!("Waiting for conversation on {}", state.platform());
                state.mark_dirty();
            }
            effects
        }
        Msg::PollTick { container_present } => {
            let effects = state.watcher.probed(container_present);
            if !effects.is_empty() {
                relay_info!("Conversation container found; observer attached");
                state.mark_dirty();
            }
            effects
        }
        Msg::ContainerDetached => {
            let effects = state.watcher.detached();
            if !effects.is_empty() {
                relay_info!("Conversation container left the page; polling again");
                state.mark_dirty();
            }
            effects
        }
        Msg::MutationBatch(conversation) => {
            if !state.watcher.is_attached() {
                relay_debug!("Ignoring mutation batch while not attached");
                return (state, Vec::new());
            }
            relay_for(&mut state, &conversation, false)
        }
        Msg::TriggerRequested(conversation) => relay_for(&mut state, &conversation, true),
        Msg::RelayReceived(response) => {
            if state.gate.complete() == ReplyDisposition::Superseded {
                relay_debug!("Dropping reply to a superseded request");
                return (state, Vec::new());
            }
            state.mark_dirty();
            match response {
                RelayResponse::Suggestions { suggestions } => {
                    state.last_error = None;
                    match state.area.offer(suggestions) {
                        OfferOutcome::Rendered => {
                            vec![Effect::RenderSuggestions(state.area.suggestions().to_vec())]
                        }
                        OfferOutcome::Discarded => {
                            relay_debug!("Suggestions already shown; discarding new payload");
                            Vec::new()
                        }
                        OfferOutcome::Empty => Vec::new(),
                    }
                }
                RelayResponse::Error { error } => {
                    relay_info!("Suggestion lookup failed: {}", error);
                    state.last_error = Some(error);
                    Vec::new()
                }
            }
        }
        Msg::SuggestionClicked(index) => match state.area.get(index) {
            Some(suggestion) => {
                let mut effects = vec![Effect::InsertCompose {
                    text: suggestion.text.clone(),
                }];
                if selectors.editor_activation == EditorActivation::ClickContainer {
                    effects.push(Effect::ActivateEditor);
                }
                effects
            }
            None => Vec::new(),
        },
        Msg::SuggestionDismissed(index) => {
            if state.area.dismiss(index) {
                state.mark_dirty();
                if state.area.has_unexpired() {
                    vec![Effect::RenderSuggestions(state.area.suggestions().to_vec())]
                } else {
                    vec![Effect::ClearSuggestions]
                }
            } else {
                Vec::new()
            }
        }
        Msg::SuggestionsDismissed | Msg::SendClicked => {
            if state.area.clear() {
                state.mark_dirty();
                vec![Effect::ClearSuggestions]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

fn relay_for(state: &mut PageContext, conversation: &Conversation, force: bool) -> Vec<Effect> {
    let Some(selectors) = state.selectors() else {
        return Vec::new();
    };
    let Some(trigger) = propose_relay(conversation, selectors.settle_mode, state.platform()) else {
        return Vec::new();
    };
    match state.gate.admit(trigger, force) {
        GateDecision::Send(request) => {
            state.mark_dirty();
            vec![Effect::PostRelay(request)]
        }
        GateDecision::Supersede(request) => {
            relay_debug!("Newer trigger replaces the request in flight");
            vec![Effect::PostRelay(request)]
        }
        GateDecision::SuppressedDuplicate => Vec::new(),
    }
}
