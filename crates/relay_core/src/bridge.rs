use crate::{Conversation, Platform, RelayRequest, RelayTrigger, SenderType, SettleMode, TriggerKey};

/// Decide whether a freshly extracted conversation asks for suggestions.
///
/// Only a trailing settled message from the customer qualifies. Stateless:
/// the same conversation always yields the same answer, deduplication is the
/// relay gate's job.
pub fn propose_relay(
    conversation: &Conversation,
    mode: SettleMode,
    platform: Platform,
) -> Option<RelayTrigger> {
    if !platform.is_known() {
        return None;
    }
    let latest = conversation.latest_settled(mode)?;
    if latest.sender != SenderType::User {
        return None;
    }
    Some(RelayTrigger {
        key: TriggerKey {
            position: latest.position,
            text: latest.text.clone(),
        },
        request: RelayRequest {
            query_text: latest.text.clone(),
            platform,
        },
    })
}
