use crate::Platform;

/// Semantic DOM roles a platform must provide selectors for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorRole {
    Admin,
    User,
    MessageBox,
    Message,
    MessageText,
    MessageTerminal,
    MessageTerminalContainer,
    SendButton,
    SuggestionAnchor,
}

impl SelectorRole {
    pub const ALL: [SelectorRole; 9] = [
        SelectorRole::Admin,
        SelectorRole::User,
        SelectorRole::MessageBox,
        SelectorRole::Message,
        SelectorRole::MessageText,
        SelectorRole::MessageTerminal,
        SelectorRole::MessageTerminalContainer,
        SelectorRole::SendButton,
        SelectorRole::SuggestionAnchor,
    ];
}

/// How the trailing extracted entry is treated when picking the latest
/// settled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettleMode {
    /// Every extracted entry is final.
    #[default]
    AllSettled,
    /// The final entry may be an in-progress echo and is never settled.
    HoldLast,
}

/// What the editor needs after its text is replaced before the host page
/// notices the new content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorActivation {
    #[default]
    None,
    /// One synthetic click on the `messageTerminalContainer` element.
    ClickContainer,
}

/// Which mutations on the conversation container wake the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationScope {
    pub child_list: bool,
    pub subtree: bool,
    pub character_data: bool,
}

impl Default for ObservationScope {
    fn default() -> Self {
        Self {
            child_list: true,
            subtree: true,
            character_data: false,
        }
    }
}

/// Static selector table for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    /// Marker inside a bubble sent by the operator.
    pub admin: &'static str,
    /// Marker inside a bubble sent by the customer.
    pub user: &'static str,
    /// The conversation stream container.
    pub message_box: &'static str,
    /// One message bubble.
    pub message: &'static str,
    /// Text node inside a bubble.
    pub message_text: &'static str,
    /// Compose editor paragraph receiving inserted text.
    pub message_terminal: &'static str,
    pub message_terminal_container: &'static str,
    pub send_button: &'static str,
    pub suggestion_anchor: &'static str,
    pub settle_mode: SettleMode,
    pub editor_activation: EditorActivation,
    pub observation: ObservationScope,
}

static INTERCOM: SelectorSet = SelectorSet {
    admin: ".o__admin-comment",
    user: ".o__user-comment",
    message_box: ".conversation__stream",
    message: ".conversation__bubble",
    message_text: ".conversation__text p",
    message_terminal: ".composer-inbox p",
    message_terminal_container: ".composer-inbox",
    send_button: ".composer-inbox button[type=\"submit\"]",
    suggestion_anchor: ".composer-inbox",
    settle_mode: SettleMode::AllSettled,
    editor_activation: EditorActivation::ClickContainer,
    observation: ObservationScope {
        child_list: true,
        subtree: true,
        character_data: false,
    },
};

impl SelectorSet {
    /// Look up the selector table for a platform; `None` for `Unknown`.
    pub fn for_platform(platform: Platform) -> Option<&'static SelectorSet> {
        match platform {
            Platform::Intercom => Some(&INTERCOM),
            Platform::Unknown => None,
        }
    }

    pub fn get(&self, role: SelectorRole) -> &'static str {
        match role {
            SelectorRole::Admin => self.admin,
            SelectorRole::User => self.user,
            SelectorRole::MessageBox => self.message_box,
            SelectorRole::Message => self.message,
            SelectorRole::MessageText => self.message_text,
            SelectorRole::MessageTerminal => self.message_terminal,
            SelectorRole::MessageTerminalContainer => self.message_terminal_container,
            SelectorRole::SendButton => self.send_button,
            SelectorRole::SuggestionAnchor => self.suggestion_anchor,
        }
    }
}
