//! Sales agents: keyword routing over templated prompts with a two-provider
//! fallback.
//!
//! - [`llm`] holds the provider seam (`LlmClient`) and the OpenAI/Gemini HTTP
//!   clients.
//! - [`responder`] asks the primary provider, then the secondary once, and
//!   folds any failure into the answer text.
//! - [`runtime`] owns the keyword table and fans a query out to every agent
//!   whose keyword it contains.

pub mod llm;
pub mod responder;
pub mod runtime;

pub use llm::{GeminiClient, LlmClient, OpenAiClient, ProviderError};
pub use responder::{FallbackOutcome, Responder};
pub use runtime::SalesOrchestrator;
