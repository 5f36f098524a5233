use super::{ChatError, ChatResult, ChatSession};
use crate::config::{ConfigError, SessionConfig, Settings};
use crate::types::{ChatMessage, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Session against the Gemini `generateContent` endpoint.
///
/// The REST API is stateless, so the history lives here and is resent on
/// every turn. A turn only lands in the history once it succeeded.
pub struct GeminiSession {
    client: Client,
    url: String,
    api_key: String,
    config: SessionConfig,
    history: Mutex<Vec<ChatMessage>>,
}

impl GeminiSession {
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        let client = Client::builder().build()?;
        let url = format!(
            "{}/models/{}:generateContent",
            settings.endpoint, settings.session.model
        );
        info!(model = %settings.session.model, "chat session created");
        Ok(Self {
            client,
            url,
            api_key: settings.api_key,
            config: settings.session,
            history: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(system_instruction: &'a str, history: &'a [ChatMessage], next: &'a str) -> Self {
        let mut contents: Vec<Content<'a>> = history
            .iter()
            .map(|msg| Content {
                role: msg.role.as_str(),
                parts: [Part { text: &msg.text }],
            })
            .collect();
        contents.push(Content {
            role: Role::User.as_str(),
            parts: [Part { text: next }],
        });
        Self {
            system_instruction: SystemInstruction {
                parts: [Part {
                    text: system_instruction,
                }],
            },
            contents,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Join the text parts of the first candidate.
pub fn extract_reply_text(body: &str) -> ChatResult<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)?;
    let blocked = parsed.prompt_feedback.and_then(|fb| fb.block_reason);

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(ChatError::EmptyReply {
            reason: blocked.unwrap_or_else(|| "no candidates".to_string()),
        });
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(ChatError::EmptyReply {
            reason: candidate
                .finish_reason
                .unwrap_or_else(|| "unknown".to_string()),
        });
    }
    Ok(text)
}

/// The `error.message` of an API error body, or the raw body.
pub fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl ChatSession for GeminiSession {
    async fn send_message(&self, text: &str) -> ChatResult<String> {
        let mut history = self.history.lock().await;
        let request =
            GenerateContentRequest::new(&self.config.system_instruction, &history, text);
        debug!(turns = history.len(), "sending chat message");

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%status, "Gemini request rejected");
            return Err(ChatError::Remote {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let reply = extract_reply_text(&body)?;
        history.push(ChatMessage::user(text));
        history.push(ChatMessage::model(reply.clone()));
        Ok(reply)
    }
}
