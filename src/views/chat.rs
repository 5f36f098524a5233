use crate::app::AppContext;
use crate::conversation::{Conversation, EntryKind, LOADING_LABEL};
use dioxus::prelude::*;

const SCROLL_TO_BOTTOM: &str = r#"
const list = document.getElementById("chat-list");
if (list) { list.scrollTop = list.scrollHeight; }
"#;

#[component]
pub fn ChatView(conversation: Signal<Conversation>) -> Element {
    let context = use_context::<AppContext>();
    let mut draft = use_signal(String::new);
    let controller = context.input();

    use_effect(move || {
        // Re-runs whenever the newest entry changes.
        let _ = conversation.read().scroll_target();
        let _ = document::eval(SCROLL_TO_BOTTOM);
    });

    let submit = move |ev: FormEvent| {
        ev.prevent_default();
        let Some(text) = draft.with_mut(|value| context.accept_input(value)) else {
            return;
        };
        if let Some(exchange) = context.send(conversation, &text) {
            spawn(exchange);
        }
    };

    let entries = conversation.read().entries().to_vec();

    rsx! {
        div { class: "main-container",
            div { id: "chat-list", class: "chat-list",
                for entry in entries {
                    div { key: "{entry.id()}", class: "{entry.css_class()}",
                        {match entry.kind() {
                            EntryKind::Loading => rsx! {
                                div { class: "bubble",
                                    span { class: "shimmer-text", "{LOADING_LABEL}" }
                                }
                            },
                            EntryKind::Message { html, .. } => rsx! {
                                div { class: "bubble md", dangerous_inner_html: "{html}" }
                            },
                        }}
                    }
                }
            }

            form { class: "composer", onsubmit: submit,
                div { class: "composer-inner",
                    input {
                        r#type: "text",
                        placeholder: controller.placeholder(),
                        value: "{draft}",
                        disabled: !controller.is_enabled(),
                        autofocus: true,
                        oninput: move |ev| draft.set(ev.value()),
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: !controller.is_enabled(),
                        "Send"
                    }
                }
            }
        }
    }
}
