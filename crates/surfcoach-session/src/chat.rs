//! Follow-up chat scoped to one completed report.
//!
//! The conversation log is append-only: the user's message is appended
//! optimistically before the request is sent, and it stays in the history
//! even when the reply fails, so the question can simply be sent again.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use surfcoach_client::CoachApi;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// The surfer asking a question.
    User,
    /// The AI coach answering.
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry in the conversation log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: ChatRole,
    /// The message text.
    pub content: String,
}

/// Result of a [`ChatSession::send`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The coach replied; the reply was appended to the log.
    Answered {
        /// The coach's answer.
        reply: String,
    },
    /// The request failed; the user's message stays in the log and the
    /// error is held for display until dismissed.
    Failed {
        /// The transport's message.
        message: String,
    },
    /// Nothing was sent: the text was blank or a send was already in
    /// flight.
    Ignored,
}

/// Internal log state, shared between clones of the session.
#[derive(Debug, Default)]
struct ChatLog {
    messages: Vec<ChatMessage>,
    awaiting_reply: bool,
    error: Option<String>,
}

/// One conversation with the coach about a completed session.
///
/// Cloning is cheap; clones share the same log. At most one send is in
/// flight at a time; additional sends are ignored until the reply (or
/// failure) lands.
#[derive(Clone)]
pub struct ChatSession {
    api: Arc<dyn CoachApi>,
    session_id: String,
    log: Arc<Mutex<ChatLog>>,
}

impl ChatSession {
    /// Creates a chat scoped to the given completed session.
    #[must_use]
    pub fn new(api: Arc<dyn CoachApi>, session_id: impl Into<String>) -> Self {
        Self {
            api,
            session_id: session_id.into(),
            log: Arc::new(Mutex::new(ChatLog::default())),
        }
    }

    /// Returns the session id this conversation is scoped to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Sends a message to the coach and awaits a single reply.
    ///
    /// Blank input and sends issued while another is outstanding are
    /// no-ops. The user message is appended before the request goes out and
    /// is never rolled back.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let trimmed = text.trim();

        {
            let mut log = self.log.lock().await;
            if trimmed.is_empty() {
                return SendOutcome::Ignored;
            }
            if log.awaiting_reply {
                debug!(session_id = %self.session_id, "Send ignored; reply still pending");
                return SendOutcome::Ignored;
            }

            log.messages.push(ChatMessage {
                role: ChatRole::User,
                content: trimmed.to_string(),
            });
            log.awaiting_reply = true;
            log.error = None;
        }

        let result = self.api.send_chat_message(&self.session_id, trimmed).await;

        let mut log = self.log.lock().await;
        log.awaiting_reply = false;
        match result {
            Ok(reply) => {
                log.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: reply.reply.clone(),
                });
                SendOutcome::Answered { reply: reply.reply }
            }
            Err(err) => {
                let message = err.message().to_string();
                debug!(session_id = %self.session_id, %message, "Chat send failed");
                log.error = Some(message.clone());
                SendOutcome::Failed { message }
            }
        }
    }

    /// Returns a copy of the conversation in insertion order.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.log.lock().await.messages.clone()
    }

    /// Returns the displayed error, if a send has failed and the error has
    /// not been dismissed.
    pub async fn error(&self) -> Option<String> {
        self.log.lock().await.error.clone()
    }

    /// Dismisses the displayed error.
    pub async fn dismiss_error(&self) {
        self.log.lock().await.error = None;
    }

    /// Returns `true` while a send is outstanding.
    pub async fn is_awaiting_reply(&self) -> bool {
        self.log.lock().await.awaiting_reply
    }
}
