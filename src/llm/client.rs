use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::{ContentGenerator, GeneratorError};

/// Configuration for the chat-completions client.
///
/// Resolved once at startup and passed in explicitly; the engine never
/// reads ambient globals mid-run, so the same configuration always
/// reproduces the same wiring in tests.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: String,
    /// API key; empty for local providers
    pub api_key: String,
    /// Model name (e.g. "gpt-4o", "llama3.1")
    pub model: String,
    /// Maximum tokens per completion
    pub max_tokens: u32,
}

impl LlmConfig {
    /// Resolve from environment variables. `LLM_PROVIDER` selects the
    /// backend: `openai` (default, requires `OPENAI_API_KEY`) or `ollama`
    /// (local, no key). `LLM_MODEL` and `OPENAI_BASE_URL` override defaults.
    pub fn from_env() -> Result<Self, GeneratorError> {
        let provider = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());

        match provider.as_str() {
            "openai" => {
                let api_key =
                    std::env::var("OPENAI_API_KEY").map_err(|_| GeneratorError::MissingApiKey)?;
                Ok(Self {
                    base_url: std::env::var("OPENAI_BASE_URL")
                        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                    api_key,
                    model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                    max_tokens: 4096,
                })
            }
            "ollama" => Ok(Self {
                base_url: std::env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:11434/v1".to_string()),
                api_key: String::new(),
                model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama3.1".to_string()),
                max_tokens: 4096,
            }),
            other => Err(GeneratorError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Chat-completions client for any OpenAI-compatible endpoint
pub struct OpenAiClient {
    client: Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ContentGenerator for OpenAiClient {
    async fn generate(
        &self,
        instructions: &str,
        context: &str,
        temperature: f64,
    ) -> Result<String, GeneratorError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: instructions.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: context.to_string(),
                },
            ],
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("content-type", "application/json");
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Api { status, body });
        }

        let response: ChatResponse = response.json().await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(GeneratorError::EmptyCompletion)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}
