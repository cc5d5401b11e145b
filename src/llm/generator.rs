use async_trait::async_trait;
use thiserror::Error;

/// Errors from the content-generation transport. All of these are fatal:
/// a stage that cannot reach its model at all cannot degrade gracefully,
/// unlike a response it merely fails to parse.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("unsupported LLM_PROVIDER: {0} (expected openai or ollama)")]
    UnsupportedProvider(String),

    #[error("request to LLM endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("no completion text in LLM response")]
    EmptyCompletion,
}

/// Capability boundary for delegated text generation. Stages hand over
/// instructions and context and get raw text back; interpreting that text
/// is the parser's job, never the generator's.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(
        &self,
        instructions: &str,
        context: &str,
        temperature: f64,
    ) -> Result<String, GeneratorError>;
}
