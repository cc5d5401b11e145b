pub mod client;
pub mod generator;
pub mod parser;
pub mod prompts;

pub use client::{LlmConfig, OpenAiClient};
pub use generator::{ContentGenerator, GeneratorError};
pub use parser::{extract_array, extract_object, ParseError};
