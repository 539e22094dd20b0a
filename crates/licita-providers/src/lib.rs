//! licita-providers
//!
//! Provedores concretos do gateway de LLM. Hoje: chat-completions da
//! OpenAI, com retry exponencial em falha transiente e timeout por
//! chamada. O resto do sistema só conhece o trait `LlmGateway`.

pub mod openai;

pub use openai::OpenAiGateway;
