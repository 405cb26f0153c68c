//! Session-scoped conversation state.
//!
//! An append-only sequence of turns owned by one session. The pipeline
//! reads a bounded suffix and appends the turns of a completed query;
//! earlier turns are never rewritten or truncated. State is explicit
//! (passed into the pipeline), never ambient, and a multi-session
//! deployment gives each session its own instance.

use serde::{Deserialize, Serialize};

/// Number of prior turns included in the generation prompt.
pub const HISTORY_WINDOW: usize = 3;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Upper-case label used in transcript exports.
    pub fn label(&self) -> &'static str {
        match self {
            TurnRole::User => "USER",
            TurnRole::Assistant => "ASSISTANT",
        }
    }
}

/// One turn in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,

    pub content: String,

    /// Display label of the partition the answer was routed to
    #[serde(rename = "partitionBadge", skip_serializing_if = "Option::is_none")]
    pub partition_badge: Option<String>,
}

/// Conversation state for one session.
#[derive(Debug, Default)]
pub struct SessionContext {
    turns: Vec<ConversationTurn>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The bounded suffix of prior turns used as generation history.
    pub fn history_window(&self) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(HISTORY_WINDOW);
        &self.turns[start..]
    }

    /// Append a user turn.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role: TurnRole::User,
            content: content.into(),
            partition_badge: None,
        });
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, content: impl Into<String>, partition_badge: Option<String>) {
        self.turns.push(ConversationTurn {
            role: TurnRole::Assistant,
            content: content.into(),
            partition_badge,
        });
    }

    /// Forget all turns (the user's "clear history" action).
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Render the conversation as a plain-text report.
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}\n", turn.role.label(), turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
