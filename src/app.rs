//! Session bootstrap and the application context shared by the UI.

use crate::ai::{ChatError, ChatSession, GeminiSession};
use crate::config::{ConfigError, Settings};
use crate::conversation::ConversationHandle;
use crate::input::InputController;
use crate::markdown::fenced;
use crate::pipeline::{begin_exchange, begin_silent_exchange};
use crate::types::Role;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Sent on startup so the model introduces itself.
pub const GREETING_PROMPT: &str = "Hello";

pub enum Startup {
    Ready(Arc<dyn ChatSession>),
    Misconfigured(ConfigError),
}

impl Startup {
    pub fn from_env() -> Self {
        match Settings::from_env().and_then(GeminiSession::new) {
            Ok(session) => Startup::Ready(Arc::new(session)),
            Err(err) => Startup::Misconfigured(err),
        }
    }
}

pub fn config_error_text(err: &ConfigError) -> String {
    match err {
        ConfigError::MissingApiKey => "**Configuration error:** no API key found. \
             Set `GEMINI_API_KEY` as described in the setup instructions in the README, \
             then restart the app."
            .to_string(),
        other => format!(
            "**Configuration error.** See the setup instructions in the README.\n\n{}",
            fenced(&other.to_string())
        ),
    }
}

pub fn greeting_error_text(err: &ChatError) -> String {
    format!(
        "**Could not start the tutoring session.**\n\n{}",
        fenced(&err.to_string())
    )
}

/// Hands out turns in the order they were requested.
#[derive(Clone, Default)]
struct TurnQueue {
    tail: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
}

impl TurnQueue {
    fn enqueue(&self) -> Turn {
        let (done, next) = oneshot::channel();
        let previous = self
            .tail
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(next);
        Turn {
            previous,
            _done: done,
        }
    }
}

/// Dropping a turn lets the next one proceed.
struct Turn {
    previous: Option<oneshot::Receiver<()>>,
    _done: oneshot::Sender<()>,
}

impl Turn {
    async fn wait(&mut self) {
        if let Some(previous) = self.previous.take() {
            // The sender is only ever dropped, never sent on.
            let _ = previous.await;
        }
    }
}

/// Everything the UI needs to drive the chat, created once at startup.
#[derive(Clone)]
pub struct AppContext {
    session: Option<Arc<dyn ChatSession>>,
    input: InputController,
    // Exchanges reach the session one at a time, in submission order.
    turns: TurnQueue,
}

impl AppContext {
    /// Renders the configuration error, if any, and returns the context.
    pub fn start<V: ConversationHandle>(startup: Startup, view: &mut V) -> Self {
        match startup {
            Startup::Ready(session) => {
                info!("tutor session ready");
                Self {
                    session: Some(session),
                    input: InputController::enabled(),
                    turns: TurnQueue::default(),
                }
            }
            Startup::Misconfigured(err) => {
                error!(error = %err, "chat disabled");
                let text = config_error_text(&err);
                view.update(|conversation| conversation.append_message(Role::Model, &text));
                Self {
                    session: None,
                    input: InputController::disabled(),
                    turns: TurnQueue::default(),
                }
            }
        }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn input(&self) -> InputController {
        self.input
    }

    pub fn accept_input(&self, draft: &mut String) -> Option<String> {
        self.input.take_submission(draft)
    }

    /// Ask the model to introduce itself. The prompt is not shown.
    pub fn greet<V>(&self, mut view: V) -> Option<impl Future<Output = ()> + use<V>>
    where
        V: ConversationHandle + 'static,
    {
        let session = self.session.clone()?;
        let pending = begin_silent_exchange(&mut view, GREETING_PROMPT)
            .with_error_text(greeting_error_text);
        let mut turn = self.turns.enqueue();
        Some(async move {
            turn.wait().await;
            pending.settle(view, &*session).await;
        })
    }

    /// Render `text` as the user's message now and return the exchange to
    /// drive to completion.
    pub fn send<V>(&self, mut view: V, text: &str) -> Option<impl Future<Output = ()> + use<V>>
    where
        V: ConversationHandle + 'static,
    {
        let Some(session) = self.session.clone() else {
            warn!("message dropped: no chat session");
            return None;
        };
        let pending = begin_exchange(&mut view, text);
        let mut turn = self.turns.enqueue();
        Some(async move {
            turn.wait().await;
            pending.settle(view, &*session).await;
        })
    }
}
