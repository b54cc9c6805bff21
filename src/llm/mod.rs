//! Answer generation through Azure OpenAI chat completions

pub mod client;

pub use client::ChatMessage;
pub use client::LlmService;
pub use client::Role;
