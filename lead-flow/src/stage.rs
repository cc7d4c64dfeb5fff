use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a conversation is in the lead-capture script.
///
/// Stages only ever move forward; `FreeForm` is the steady state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    #[default]
    Initial,
    AwaitingName,
    AwaitingPhone,
    AwaitingEmail,
    FreeForm,
}

impl ConversationStage {
    pub const ALL: [ConversationStage; 5] = [
        ConversationStage::Initial,
        ConversationStage::AwaitingName,
        ConversationStage::AwaitingPhone,
        ConversationStage::AwaitingEmail,
        ConversationStage::FreeForm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStage::Initial => "initial",
            ConversationStage::AwaitingName => "awaiting_name",
            ConversationStage::AwaitingPhone => "awaiting_phone",
            ConversationStage::AwaitingEmail => "awaiting_email",
            ConversationStage::FreeForm => "free_form",
        }
    }

    /// True once the contact details have all been collected.
    pub fn is_steady(&self) -> bool {
        matches!(self, ConversationStage::FreeForm)
    }
}

impl fmt::Display for ConversationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
