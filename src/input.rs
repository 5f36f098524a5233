#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputState {
    Enabled,
    /// No chat session could be created; nothing can be sent.
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputController {
    state: InputState,
}

impl InputController {
    pub fn enabled() -> Self {
        Self {
            state: InputState::Enabled,
        }
    }

    pub fn disabled() -> Self {
        Self {
            state: InputState::Disabled,
        }
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == InputState::Enabled
    }

    pub fn placeholder(&self) -> &'static str {
        match self.state {
            InputState::Enabled => "Ask a question or share a problem…",
            InputState::Disabled => "Chat is unavailable until an API key is configured",
        }
    }

    /// Take the trimmed draft for sending, clearing the field.
    ///
    /// Blank drafts are left alone and yield `None`, as does every draft
    /// while disabled.
    pub fn take_submission(&self, draft: &mut String) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let trimmed = draft.trim();
        if trimmed.is_empty() {
            return None;
        }
        let text = trimmed.to_string();
        draft.clear();
        Some(text)
    }
}
