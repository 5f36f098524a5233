#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tutorchat::ai::{ChatError, ChatResult, ChatSession};

/// Replies from a script, recording what was sent and how many sends
/// overlapped.
#[derive(Default)]
pub struct ScriptedSession {
    replies: Mutex<VecDeque<ChatResult<String>>>,
    sent: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(Ok(text.to_string()))
    }

    pub fn fail(self, message: &str) -> Self {
        self.push(Err(ChatError::new(message)))
    }

    fn push(self, outcome: ChatResult<String>) -> Self {
        self.replies.lock().unwrap().push_back(outcome);
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn send_message(&self, text: &str) -> ChatResult<String> {
        self.sent.lock().unwrap().push(text.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Give other exchanges a chance to interleave.
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::new("script exhausted")))
    }
}
