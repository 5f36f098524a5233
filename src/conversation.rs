//! The conversation log.
//!
//! The rendered chat list is a projection of [`Conversation`]: an ordered,
//! append-only sequence of entries. Messages are never removed; loading
//! indicators are removed once their request settles.

use crate::markdown::markdown_to_html;
use crate::types::{ChatMessage, Role};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub const LOADING_LABEL: &str = "Thinking…";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntryKind {
    Message { message: ChatMessage, html: String },
    Loading,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    id: EntryId,
    kind: EntryKind,
}

impl Entry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn role(&self) -> Role {
        match &self.kind {
            EntryKind::Message { message, .. } => message.role,
            EntryKind::Loading => Role::Model,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.kind, EntryKind::Loading)
    }

    pub fn message(&self) -> Option<&ChatMessage> {
        match &self.kind {
            EntryKind::Message { message, .. } => Some(message),
            EntryKind::Loading => None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Message { html, .. } => Some(html),
            EntryKind::Loading => None,
        }
    }

    pub fn css_class(&self) -> String {
        if self.is_loading() {
            format!("message {} loading", self.role().as_str())
        } else {
            format!("message {}", self.role().as_str())
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conversation {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Conversation {
    fn push(&mut self, kind: EntryKind) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, kind });
        id
    }

    pub fn append_message(&mut self, role: Role, text: &str) -> EntryId {
        let html = markdown_to_html(text);
        self.push(EntryKind::Message {
            message: ChatMessage {
                role,
                text: text.to_string(),
            },
            html,
        })
    }

    pub fn append_loading_indicator(&mut self) -> EntryId {
        self.push(EntryKind::Loading)
    }

    /// Returns `false` when the entry was already gone.
    pub fn remove(&mut self, id: EntryId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter().filter_map(Entry::message)
    }

    pub fn loading_indicators(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_loading()).count()
    }

    /// The newest entry, which the list keeps scrolled into view.
    pub fn scroll_target(&self) -> Option<EntryId> {
        self.entries.last().map(Entry::id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared access to the conversation log.
///
/// The pipeline mutates the log only through this trait so it can run
/// against a UI signal or a plain shared value in tests.
pub trait ConversationHandle {
    fn update<R>(&mut self, f: impl FnOnce(&mut Conversation) -> R) -> R;
}

impl ConversationHandle for Conversation {
    fn update<R>(&mut self, f: impl FnOnce(&mut Conversation) -> R) -> R {
        f(self)
    }
}

impl<T: ConversationHandle> ConversationHandle for &mut T {
    fn update<R>(&mut self, f: impl FnOnce(&mut Conversation) -> R) -> R {
        (**self).update(f)
    }
}

impl ConversationHandle for Rc<RefCell<Conversation>> {
    fn update<R>(&mut self, f: impl FnOnce(&mut Conversation) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}
