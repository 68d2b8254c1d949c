//! Hosted AI capabilities and the dispatcher that routes between them

pub mod adapter;
pub mod agent;
pub mod openai;
pub mod tavily;

pub use adapter::{LlmAdapter, SearchAdapter};
pub use agent::HealthBuddy;
pub use openai::OpenAiClient;
pub use tavily::TavilyClient;
