use std::sync::Once;

use pretty_assertions::assert_eq;
use relay_core::{
    update, Conversation, Effect, Msg, PageContext, Platform, RelayRequest, RelayResponse,
    SenderType, Suggestion, WatcherPhase,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(relay_logging::initialize_for_tests);
}

fn conversation(entries: &[(SenderType, &str)]) -> Conversation {
    entries
        .iter()
        .map(|(sender, text)| (*sender, text.to_string()))
        .collect()
}

fn attached() -> PageContext {
    let state = PageContext::for_location("https://app.intercom.io/a/inbox");
    let (state, _) = update(state, Msg::PageLoaded);
    let (state, _) = update(
        state,
        Msg::PollTick {
            container_present: true,
        },
    );
    state
}

fn late_order_request() -> RelayRequest {
    RelayRequest {
        query_text: "My order is late".into(),
        platform: Platform::Intercom,
    }
}

#[test]
fn page_load_starts_polling_and_probe_attaches() {
    init_logging();
    let state = PageContext::for_location("app.intercom.io");
    let (state, effects) = update(state, Msg::PageLoaded);
    assert_eq!(effects, vec![Effect::StartPolling]);
    assert_eq!(state.view().watcher, WatcherPhase::Waiting);

    let (state, effects) = update(
        state,
        Msg::PollTick {
            container_present: false,
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::PollTick {
            container_present: true,
        },
    );
    assert_eq!(effects, vec![Effect::StopPolling, Effect::AttachObserver]);
    assert_eq!(state.view().watcher, WatcherPhase::Attached);

    let (state, effects) = update(state, Msg::ContainerDetached);
    assert_eq!(effects, vec![Effect::DetachObserver, Effect::StartPolling]);
    assert_eq!(state.view().watcher, WatcherPhase::Waiting);
}

#[test]
fn request_fires_only_once_the_trailing_message_is_from_the_user() {
    init_logging();
    let state = attached();

    let (state, effects) = update(
        state,
        Msg::MutationBatch(conversation(&[(SenderType::Admin, "Hello, how can we help?")])),
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::MutationBatch(conversation(&[
            (SenderType::Admin, "Hello, how can we help?"),
            (SenderType::User, "My order is late"),
        ])),
    );
    assert_eq!(effects, vec![Effect::PostRelay(late_order_request())]);
    assert!(state.view().request_in_flight);

    let (state, effects) = update(state, Msg::RelayReceived(RelayResponse::suggestions(["x"])));
    assert_eq!(effects, vec![Effect::RenderSuggestions(vec![Suggestion::new("x")])]);

    let (_state, effects) = update(
        state,
        Msg::MutationBatch(conversation(&[
            (SenderType::Admin, "Hello, how can we help?"),
            (SenderType::User, "My order is late"),
            (SenderType::Admin, "Looking into it"),
        ])),
    );
    assert!(effects.is_empty());
}

#[test]
fn repeated_batches_with_the_same_trailing_message_send_once() {
    init_logging();
    let batch = conversation(&[(SenderType::User, "My order is late")]);
    let (state, first) = update(attached(), Msg::MutationBatch(batch.clone()));
    assert_eq!(first.len(), 1);

    // Still in flight.
    let (state, second) = update(state, Msg::MutationBatch(batch.clone()));
    assert!(second.is_empty());

    // Answered; same trigger is not re-sent.
    let (state, _) = update(state, Msg::RelayReceived(RelayResponse::error("503")));
    let (state, third) = update(state, Msg::MutationBatch(batch.clone()));
    assert!(third.is_empty());

    // On-demand trigger re-sends it.
    let (_state, forced) = update(state, Msg::TriggerRequested(batch));
    assert_eq!(forced, vec![Effect::PostRelay(late_order_request())]);
}

#[test]
fn new_user_message_while_in_flight_replaces_the_pending_request() {
    init_logging();
    let (state, _) = update(
        attached(),
        Msg::MutationBatch(conversation(&[(SenderType::User, "My order is late")])),
    );
    let (state, effects) = update(
        state,
        Msg::MutationBatch(conversation(&[
            (SenderType::User, "My order is late"),
            (SenderType::User, "Order 42"),
        ])),
    );
    assert_eq!(
        effects,
        vec![Effect::PostRelay(RelayRequest {
            query_text: "Order 42".into(),
            platform: Platform::Intercom,
        })]
    );
    assert!(state.view().request_in_flight);

    // The reply to the first request is stale and dropped.
    let (state, effects) = update(
        state,
        Msg::RelayReceived(RelayResponse::suggestions(["about the delay"])),
    );
    assert!(effects.is_empty());
    assert!(state.view().request_in_flight);
    assert!(state.view().suggestions.is_empty());

    let (state, effects) = update(
        state,
        Msg::RelayReceived(RelayResponse::suggestions(["about order 42"])),
    );
    assert_eq!(
        effects,
        vec![Effect::RenderSuggestions(vec![Suggestion::new("about order 42")])]
    );
    assert!(!state.view().request_in_flight);
}

#[test]
fn on_demand_trigger_recovers_from_an_unanswered_request() {
    init_logging();
    let batch = conversation(&[(SenderType::User, "My order is late")]);
    let (state, _) = update(attached(), Msg::MutationBatch(batch.clone()));

    // No reply ever comes; the forced trigger goes out regardless.
    let (state, effects) = update(state, Msg::TriggerRequested(batch));
    assert_eq!(effects, vec![Effect::PostRelay(late_order_request())]);

    let (state, _) = update(state, Msg::RelayReceived(RelayResponse::error("superseded")));
    assert_eq!(state.view().last_error, None);
    let (state, _) = update(state, Msg::RelayReceived(RelayResponse::suggestions(["sorry"])));
    assert_eq!(state.view().suggestions, vec!["sorry"]);
}

#[test]
fn mutation_batches_while_waiting_are_ignored() {
    init_logging();
    let (state, _) = update(PageContext::for_location("app.intercom.io"), Msg::PageLoaded);
    let (_state, effects) = update(
        state,
        Msg::MutationBatch(conversation(&[(SenderType::User, "hi")])),
    );
    assert!(effects.is_empty());
}

#[test]
fn second_payload_is_discarded_while_suggestions_are_visible() {
    init_logging();
    let (state, _) = update(
        attached(),
        Msg::MutationBatch(conversation(&[(SenderType::User, "My order is late")])),
    );
    let (state, effects) = update(
        state,
        Msg::RelayReceived(RelayResponse::suggestions([
            "We'll refund you",
            "Can you share the order ID?",
        ])),
    );
    assert_eq!(effects.len(), 1);

    let (state, _) = update(
        state,
        Msg::MutationBatch(conversation(&[
            (SenderType::User, "My order is late"),
            (SenderType::User, "Order 42"),
        ])),
    );
    let (state, effects) = update(
        state,
        Msg::RelayReceived(RelayResponse::suggestions(["Thanks!"])),
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().suggestions,
        vec!["We'll refund you", "Can you share the order ID?"]
    );
}

#[test]
fn clicking_a_suggestion_inserts_text_and_activates_the_editor() {
    init_logging();
    let (state, _) = update(
        attached(),
        Msg::RelayReceived(RelayResponse::suggestions(["a", "b"])),
    );
    let (state, effects) = update(state, Msg::SuggestionClicked(1));
    assert_eq!(
        effects,
        vec![
            Effect::InsertCompose { text: "b".into() },
            Effect::ActivateEditor
        ]
    );
    assert!(state.area().has_unexpired());

    let (_state, effects) = update(state, Msg::SuggestionClicked(9));
    assert!(effects.is_empty());
}

#[test]
fn send_clears_the_area_with_or_without_a_click() {
    init_logging();
    for click_first in [false, true] {
        let (mut state, _) = update(
            attached(),
            Msg::RelayReceived(RelayResponse::suggestions(["a"])),
        );
        if click_first {
            state = update(state, Msg::SuggestionClicked(0)).0;
        }
        let (state, effects) = update(state, Msg::SendClicked);
        assert_eq!(effects, vec![Effect::ClearSuggestions]);
        assert!(!state.area().has_unexpired());

        let (_state, effects) = update(state, Msg::SendClicked);
        assert!(effects.is_empty());
    }
}

#[test]
fn dismissing_updates_then_clears_the_area() {
    init_logging();
    let (state, _) = update(
        attached(),
        Msg::RelayReceived(RelayResponse::suggestions(["a", "b"])),
    );
    let (state, effects) = update(state, Msg::SuggestionDismissed(0));
    assert_eq!(effects, vec![Effect::RenderSuggestions(vec![Suggestion::new("b")])]);
    let (state, effects) = update(state, Msg::SuggestionDismissed(0));
    assert_eq!(effects, vec![Effect::ClearSuggestions]);
    assert!(state.view().suggestions.is_empty());
}

#[test]
fn error_frames_are_recorded_but_not_rendered() {
    init_logging();
    let (state, _) = update(
        attached(),
        Msg::MutationBatch(conversation(&[(SenderType::User, "hi")])),
    );
    let (mut state, effects) = update(
        state,
        Msg::RelayReceived(RelayResponse::error("404 Not Found")),
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.last_error.as_deref(), Some("404 Not Found"));
    assert!(!view.request_in_flight);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn unknown_platform_is_inert() {
    init_logging();
    let state = PageContext::for_location("https://example.com/support");
    assert_eq!(state.platform(), Platform::Unknown);
    let msgs = vec![
        Msg::PageLoaded,
        Msg::PollTick {
            container_present: true,
        },
        Msg::TriggerRequested(conversation(&[(SenderType::User, "hi")])),
        Msg::RelayReceived(RelayResponse::suggestions(["a"])),
        Msg::SuggestionClicked(0),
        Msg::SendClicked,
    ];
    let mut state = state;
    for msg in msgs {
        let (next, effects) = update(state.clone(), msg);
        assert!(effects.is_empty());
        assert_eq!(next, state);
        state = next;
    }
}
