//! Relay core: pure page-context state machine, selector registry and
//! conversation model. No IO happens here; the engine executes the returned
//! effects.
mod bridge;
mod conversation;
mod effect;
mod gate;
mod injector;
mod msg;
mod platform;
mod relay;
mod selectors;
mod state;
mod update;
mod view_model;
mod watcher;

pub use bridge::propose_relay;
pub use conversation::{Conversation, Message, SenderType, GLYPH_TEXT};
pub use effect::Effect;
pub use gate::{GateDecision, RelayGate, ReplyDisposition};
pub use injector::{OfferOutcome, SuggestionArea};
pub use msg::Msg;
pub use platform::{detect_platform, Platform};
pub use relay::{
    ChannelName, RelayRequest, RelayResponse, RelayTrigger, Suggestion, TriggerKey,
    UnknownChannel,
};
pub use selectors::{EditorActivation, ObservationScope, SelectorRole, SelectorSet, SettleMode};
pub use state::PageContext;
pub use update::update;
pub use view_model::PageViewModel;
pub use watcher::{AvailabilityWatcher, WatcherPhase};
