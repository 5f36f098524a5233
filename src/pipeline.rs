//! One exchange with the chat session, from captured text to rendered reply.

use crate::ai::{ChatError, ChatSession};
use crate::conversation::{ConversationHandle, EntryId};
use crate::markdown::fenced;
use crate::types::Role;
use tracing::{debug, error};

/// An exchange whose user text and loading indicator are already on screen.
#[must_use = "a pending exchange leaves its indicator on screen until settled"]
pub struct PendingExchange {
    prompt: String,
    indicator: EntryId,
    error_text: fn(&ChatError) -> String,
}

/// Render the user's message and a loading indicator.
pub fn begin_exchange<V: ConversationHandle>(view: &mut V, text: &str) -> PendingExchange {
    view.update(|conversation| {
        conversation.append_message(Role::User, text);
        PendingExchange {
            prompt: text.to_string(),
            indicator: conversation.append_loading_indicator(),
            error_text: reply_error_text,
        }
    })
}

/// Like [`begin_exchange`] but without echoing `text` as a user message.
pub fn begin_silent_exchange<V: ConversationHandle>(view: &mut V, text: &str) -> PendingExchange {
    PendingExchange {
        prompt: text.to_string(),
        indicator: view.update(|conversation| conversation.append_loading_indicator()),
        error_text: reply_error_text,
    }
}

impl PendingExchange {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn indicator(&self) -> EntryId {
        self.indicator
    }

    /// Replace how a failed exchange is worded in the conversation.
    pub fn with_error_text(mut self, error_text: fn(&ChatError) -> String) -> Self {
        self.error_text = error_text;
        self
    }

    /// Wait for the reply, then swap the indicator for the reply or an error.
    pub async fn settle<V: ConversationHandle>(self, mut view: V, session: &dyn ChatSession) {
        debug!(chars = self.prompt.len(), "exchange pending");
        let outcome = session.send_message(&self.prompt).await;

        view.update(|conversation| {
            conversation.remove(self.indicator);
            match outcome {
                Ok(reply) => {
                    conversation.append_message(Role::Model, &reply);
                }
                Err(err) => {
                    error!(error = %err, "chat exchange failed");
                    conversation.append_message(Role::Model, &(self.error_text)(&err));
                }
            }
        });
    }
}

pub fn reply_error_text(err: &ChatError) -> String {
    format!(
        "**Sorry, something went wrong.**\n\n{}",
        fenced(&err.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Conversation;

    #[test]
    fn begin_renders_user_text_then_indicator() {
        let mut conversation = Conversation::default();
        let pending = begin_exchange(&mut conversation, "2+2=?");

        let entries = conversation.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role(), Role::User);
        assert_eq!(entries[1].id(), pending.indicator());
        assert!(entries[1].is_loading());
        assert_eq!(pending.prompt(), "2+2=?");
    }

    #[test]
    fn silent_begin_only_shows_indicator() {
        let mut conversation = Conversation::default();
        let pending = begin_silent_exchange(&mut conversation, "Hello");
        assert_eq!(conversation.messages().count(), 0);
        assert_eq!(conversation.scroll_target(), Some(pending.indicator()));
    }

    #[test]
    fn error_text_embeds_detail_in_code_block() {
        let text = reply_error_text(&ChatError::new("Network timeout"));
        assert!(text.ends_with("```\nNetwork timeout\n```"));
    }
}
