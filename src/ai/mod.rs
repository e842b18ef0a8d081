pub mod client;
pub mod prompts;
pub mod schema;
pub mod task;

pub use client::{AiClient, AiError, AiOutput, AiRequest, GeminiClient};
pub use task::{AiService, GenerationSlot, FALLBACK_MESSAGE};
