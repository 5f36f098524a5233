//! Startup configuration read from the environment.

use std::env;

/// Checked in order; the first non-blank value wins.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];
pub const MODEL_VAR: &str = "TUTOR_MODEL";
pub const ENDPOINT_VAR: &str = "GEMINI_ENDPOINT";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const SYSTEM_INSTRUCTION: &str = r#"You are a patient math tutor for school students. Your goal is to help the student reach the answer on their own, never to hand it over.

Rules:
1. Never state the final answer to a problem, even if the student asks for it directly.
2. Give one hint at a time, labelled in bold as **Hint 1:**, **Hint 2:**, and so on.
3. After each hint, ask a short question that checks the student's understanding.
4. When the student proposes an answer, say whether it is right. If it is wrong, point to the step where the reasoning went off track without correcting it for them.
5. Keep replies short and use Markdown; put formulas and worked steps in code blocks.
6. If the student is off topic, steer them back to the problem politely.

When the student says hello, introduce yourself in two sentences and invite them to share a problem."#;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("could not build the HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Fixed at session creation and owned by the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub model: String,
    pub system_instruction: String,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub api_key: String,
    pub endpoint: String,
    pub session: SessionConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|key| non_blank(key))
            .ok_or(ConfigError::MissingApiKey)?;
        let model = non_blank(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let endpoint = non_blank(ENDPOINT_VAR)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            endpoint,
            session: SessionConfig {
                model,
                system_instruction: SYSTEM_INSTRUCTION.to_string(),
            },
        })
    }
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
pub fn parse_env_file(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Apply the pairs of an env file through `set`, skipping keys `is_set`
/// reports as already present.
pub fn apply_env_file(
    contents: &str,
    is_set: impl Fn(&str) -> bool,
    mut set: impl FnMut(String, String),
) {
    for (key, value) in parse_env_file(contents) {
        if !is_set(&key) {
            set(key, value);
        }
    }
}
