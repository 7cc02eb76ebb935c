use crate::SettleMode;

/// Text recorded for a bubble that carries content but no visible text
/// (an image, emoji glyph, attachment card...).
pub const GLYPH_TEXT: &str = "glyph";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenderType {
    Admin,
    User,
    Unspecified,
}

/// One settled message of an extraction pass.
///
/// `position` is the index within the pass that produced it; it is not an
/// identity across passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub position: usize,
    pub sender: SenderType,
    pub text: String,
}

/// Messages in document order, rebuilt wholesale on every extraction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. Empty text is rejected and `false` returned.
    pub fn push(&mut self, sender: SenderType, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.is_empty() {
            return false;
        }
        let position = self.messages.len();
        self.messages.push(Message {
            position,
            sender,
            text,
        });
        true
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn senders(&self) -> Vec<SenderType> {
        self.messages.iter().map(|m| m.sender).collect()
    }

    /// Latest message considered final under `mode`.
    pub fn latest_settled(&self, mode: SettleMode) -> Option<&Message> {
        match mode {
            SettleMode::AllSettled => self.messages.last(),
            SettleMode::HoldLast => self
                .messages
                .len()
                .checked_sub(2)
                .and_then(|idx| self.messages.get(idx)),
        }
    }
}

impl FromIterator<(SenderType, String)> for Conversation {
    fn from_iter<I: IntoIterator<Item = (SenderType, String)>>(iter: I) -> Self {
        let mut conversation = Conversation::new();
        for (sender, text) in iter {
            conversation.push(sender, text);
        }
        conversation
    }
}
