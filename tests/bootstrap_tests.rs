//! Startup, greeting and submission through the application context.

mod common;

use common::ScriptedSession;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tutorchat::app::{AppContext, GREETING_PROMPT, Startup};
use tutorchat::config::ConfigError;
use tutorchat::conversation::Conversation;
use tutorchat::types::Role;

fn shared() -> Rc<RefCell<Conversation>> {
    Rc::new(RefCell::new(Conversation::default()))
}

fn ready(session: &Arc<ScriptedSession>) -> Startup {
    Startup::Ready(session.clone())
}

mod missing_credential {
    use super::*;

    #[test]
    fn renders_one_error_and_disables_input() {
        let mut view = shared();
        let context = AppContext::start(Startup::Misconfigured(ConfigError::MissingApiKey), &mut view);

        let conversation = view.borrow();
        assert_eq!(conversation.len(), 1);
        let message = conversation.messages().next().unwrap();
        assert_eq!(message.role, Role::Model);
        assert!(message.text.contains("GEMINI_API_KEY"));
        assert!(message.text.contains("setup instructions"));

        assert!(!context.has_session());
        assert!(!context.input().is_enabled());
    }

    #[test]
    fn later_submissions_are_refused() {
        let mut view = shared();
        let context = AppContext::start(Startup::Misconfigured(ConfigError::MissingApiKey), &mut view);

        let mut draft = "2+2=?".to_string();
        assert_eq!(context.accept_input(&mut draft), None);
        assert_eq!(draft, "2+2=?");

        assert!(context.greet(view.clone()).is_none());
        assert!(context.send(view.clone(), "2+2=?").is_none());
        assert_eq!(view.borrow().len(), 1);
    }
}

mod greeting {
    use super::*;

    #[tokio::test]
    async fn sends_hello_once_and_renders_the_reply() {
        let session = Arc::new(ScriptedSession::new().reply("Hi, I'm your tutor."));
        let mut view = shared();
        let context = AppContext::start(ready(&session), &mut view);
        assert!(view.borrow().is_empty());

        let greeting = context.greet(view.clone()).expect("session is ready");
        assert_eq!(view.borrow().loading_indicators(), 1);
        greeting.await;

        assert_eq!(session.sent(), vec![GREETING_PROMPT.to_string()]);
        let conversation = view.borrow();
        assert_eq!(conversation.loading_indicators(), 0);
        let messages: Vec<_> = conversation.messages().cloned().collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Model);
        assert_eq!(messages[0].text, "Hi, I'm your tutor.");
    }

    #[tokio::test]
    async fn failure_is_rendered_and_input_stays_usable() {
        let session = Arc::new(
            ScriptedSession::new()
                .fail("API key not valid")
                .reply("**Hint 1:** start small"),
        );
        let mut view = shared();
        let context = AppContext::start(ready(&session), &mut view);

        context.greet(view.clone()).unwrap().await;
        {
            let conversation = view.borrow();
            assert_eq!(conversation.len(), 1);
            let error = conversation.messages().next().unwrap();
            assert_eq!(error.role, Role::Model);
            assert!(error.text.contains("```\nAPI key not valid\n```"));
        }

        let mut draft = "2+2=?".to_string();
        let text = context.accept_input(&mut draft).unwrap();
        context.send(view.clone(), &text).unwrap().await;
        assert_eq!(view.borrow().messages().count(), 3);
    }

    #[tokio::test]
    async fn queued_greeting_goes_out_before_an_early_submission() {
        let session = Arc::new(ScriptedSession::new().reply("Hi!").reply("**Hint 1:** count"));
        let mut view = shared();
        let context = AppContext::start(ready(&session), &mut view);

        // The greeting is queued at mount, the user submits before it is polled.
        let greeting = context.greet(view.clone()).unwrap();
        let exchange = context.send(view.clone(), "2+2=?").unwrap();
        tokio::join!(exchange, greeting);

        assert_eq!(
            session.sent(),
            vec![GREETING_PROMPT.to_string(), "2+2=?".to_string()]
        );
        let texts: Vec<_> = view.borrow().messages().map(|m| m.text.clone()).collect();
        assert_eq!(texts, vec!["2+2=?", "Hi!", "**Hint 1:** count"]);
    }
}

mod submission {
    use super::*;

    #[tokio::test]
    async fn clears_draft_and_renders_exchange() {
        let session = Arc::new(ScriptedSession::new().reply("**Hint 1:** count on your fingers"));
        let mut view = shared();
        let context = AppContext::start(ready(&session), &mut view);

        let mut draft = "  2+2=?  ".to_string();
        let text = context.accept_input(&mut draft).unwrap();
        assert!(draft.is_empty());

        let exchange = context.send(view.clone(), &text).unwrap();
        {
            let conversation = view.borrow();
            assert_eq!(conversation.messages().next().unwrap().text, "2+2=?");
            assert_eq!(conversation.loading_indicators(), 1);
        }
        assert!(session.sent().is_empty());

        exchange.await;
        let conversation = view.borrow();
        assert_eq!(conversation.loading_indicators(), 0);
        let last = conversation.entries().last().unwrap();
        assert!(last.html().unwrap().contains("<strong>Hint 1:</strong>"));
    }

    #[tokio::test]
    async fn blank_input_sends_nothing() {
        let session = Arc::new(ScriptedSession::new());
        let mut view = shared();
        let context = AppContext::start(ready(&session), &mut view);

        let mut draft = "   ".to_string();
        assert!(context.accept_input(&mut draft).is_none());
        assert!(view.borrow().is_empty());
        assert!(session.sent().is_empty());
    }

    #[tokio::test]
    async fn overlapping_submissions_are_serialized_in_order() {
        let session = Arc::new(ScriptedSession::new().reply("first").reply("second"));
        let mut view = shared();
        let context = AppContext::start(ready(&session), &mut view);

        let a = context.send(view.clone(), "one").unwrap();
        let b = context.send(view.clone(), "two").unwrap();
        assert_eq!(view.borrow().loading_indicators(), 2);

        tokio::join!(b, a);

        assert_eq!(session.max_in_flight(), 1);
        assert_eq!(session.sent(), vec!["one".to_string(), "two".to_string()]);
        let conversation = view.borrow();
        assert_eq!(conversation.loading_indicators(), 0);
        let texts: Vec<_> = conversation.messages().map(|m| m.text.clone()).collect();
        assert_eq!(texts, vec!["one", "two", "first", "second"]);
    }
}
