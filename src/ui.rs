use crate::app::{AppContext, Startup};
use crate::conversation::{Conversation, ConversationHandle};
use crate::views::ChatView;
use dioxus::prelude::*;

const TUTOR_CSS: Asset = asset!("/assets/tutor.css");

impl ConversationHandle for Signal<Conversation> {
    fn update<R>(&mut self, f: impl FnOnce(&mut Conversation) -> R) -> R {
        self.with_mut(f)
    }
}

#[component]
pub fn App() -> Element {
    let (context, seeded) = use_hook(|| {
        let mut conversation = Conversation::default();
        let context = AppContext::start(Startup::from_env(), &mut conversation);
        (context, conversation)
    });
    let conversation = use_signal(move || seeded);
    use_context_provider(|| context.clone());
    use_greeting(context, conversation);

    rsx! {
        document::Link { rel: "stylesheet", href: TUTOR_CSS }
        AppHeader {}
        ChatView { conversation }
    }
}

/// Queues the greeting during the first render, ahead of any submission.
fn use_greeting(context: AppContext, conversation: Signal<Conversation>) {
    use_hook(move || {
        if let Some(greeting) = context.greet(conversation) {
            spawn(greeting);
        }
    });
}

#[component]
fn AppHeader() -> Element {
    rsx! {
        div { class: "header no-divider",
            div { class: "header-content",
                h1 { class: "header-wordmark", "Math Tutor" }
            }
        }
    }
}
