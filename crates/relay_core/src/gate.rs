use crate::{RelayRequest, RelayTrigger, TriggerKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Send(RelayRequest),
    /// Sent while earlier requests are unanswered; their replies are dropped.
    Supersede(RelayRequest),
    /// This trigger was already relayed.
    SuppressedDuplicate,
}

impl GateDecision {
    pub fn request(self) -> Option<RelayRequest> {
        match self {
            Self::Send(request) | Self::Supersede(request) => Some(request),
            Self::SuppressedDuplicate => None,
        }
    }
}

/// What an inbound frame answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDisposition {
    /// The newest outstanding request.
    Current,
    /// A request that a newer trigger replaced.
    Superseded,
    /// Nothing was outstanding.
    Unsolicited,
}

/// Page-side discipline for the relay channel. Each distinct trigger is
/// relayed once unless forced, and a newer trigger replaces any request still
/// in flight. Replies arrive in request order, so every reply but the one for
/// the newest request is stale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelayGate {
    pending: usize,
    last_sent: Option<TriggerKey>,
}

impl RelayGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending > 0
    }

    /// Offer a trigger. `force` skips the duplicate check (on-demand trigger).
    pub fn admit(&mut self, trigger: RelayTrigger, force: bool) -> GateDecision {
        if !force && self.last_sent.as_ref() == Some(&trigger.key) {
            return GateDecision::SuppressedDuplicate;
        }
        self.last_sent = Some(trigger.key);
        self.pending += 1;
        if self.pending > 1 {
            GateDecision::Supersede(trigger.request)
        } else {
            GateDecision::Send(trigger.request)
        }
    }

    /// A response frame arrived.
    pub fn complete(&mut self) -> ReplyDisposition {
        match self.pending {
            0 => ReplyDisposition::Unsolicited,
            1 => {
                self.pending = 0;
                ReplyDisposition::Current
            }
            _ => {
                self.pending -= 1;
                ReplyDisposition::Superseded
            }
        }
    }
}
