use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::ConversationIds;
use crate::error::SetupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    User,
    Assistant,
}

/// Provider-neutral chat message kept in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Process-wide conversation shared by every agent call. Declared once at
/// startup and never reset; only the most recent `max_turns` turns are kept.
#[derive(Debug)]
pub struct ConversationContext {
    pub ids: ConversationIds,
    max_turns: usize,
    history: Mutex<Vec<ChatMessage>>,
}

impl ConversationContext {
    pub fn declare(ids: ConversationIds, max_turns: usize) -> Result<Self, SetupError> {
        for (field, value) in [
            ("app name", &ids.app_name),
            ("user id", &ids.user_id),
            ("session id", &ids.session_id),
        ] {
            if value.trim().is_empty() {
                return Err(SetupError::RunnerInitialization(format!(
                    "conversation {} must not be empty",
                    field
                )));
            }
        }

        tracing::info!(
            app_name = %ids.app_name,
            user_id = %ids.user_id,
            session_id = %ids.session_id,
            "Conversation context declared"
        );

        Ok(Self {
            ids,
            max_turns,
            history: Mutex::new(Vec::new()),
        })
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }

    /// Append one user/assistant exchange, dropping the oldest turns past the cap.
    pub async fn record_turn(&self, user: impl Into<String>, assistant: impl Into<String>) {
        let mut history = self.history.lock().await;
        history.push(ChatMessage::user(user));
        history.push(ChatMessage::assistant(assistant));

        let keep = self.max_turns * 2;
        if history.len() > keep {
            let excess = history.len() - keep;
            history.drain(..excess);
        }
    }
}
