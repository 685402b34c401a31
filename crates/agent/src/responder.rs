use std::sync::Arc;

use tracing::{error, warn};

use crate::llm::{LlmClient, ProviderError};

/// What happened on the way to a single answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FallbackOutcome {
    Primary(String),
    Secondary { text: String, primary_error: ProviderError },
    Exhausted { primary_error: ProviderError, secondary_error: ProviderError },
}

impl FallbackOutcome {
    pub fn into_text(self) -> String {
        match self {
            Self::Primary(text) | Self::Secondary { text, .. } => text,
            Self::Exhausted { secondary_error, .. } => exhausted_message(&secondary_error),
        }
    }
}

pub fn exhausted_message(secondary_error: &ProviderError) -> String {
    format!("❌ Both OpenAI and Gemini failed: {secondary_error}")
}

/// One attempt against the primary provider, one against the secondary, and
/// nothing more. Failures never escape [`Responder::respond`].
#[derive(Clone)]
pub struct Responder {
    primary: Arc<dyn LlmClient>,
    secondary: Arc<dyn LlmClient>,
}

impl Responder {
    pub fn new(primary: Arc<dyn LlmClient>, secondary: Arc<dyn LlmClient>) -> Self {
        Self { primary, secondary }
    }

    pub async fn respond(&self, prompt: &str) -> String {
        self.attempt(prompt).await.into_text()
    }

    pub async fn attempt(&self, prompt: &str) -> FallbackOutcome {
        let primary_error = match self.primary.complete(prompt).await {
            Ok(text) => return FallbackOutcome::Primary(text.trim().to_string()),
            Err(primary_error) => primary_error,
        };
        warn!(
            event_name = "agent.responder.primary_failed",
            provider = self.primary.provider_name(),
            fallback = self.secondary.provider_name(),
            error = %primary_error,
            "primary provider failed, falling back"
        );

        match self.secondary.complete(prompt).await {
            Ok(text) => FallbackOutcome::Secondary { text: text.trim().to_string(), primary_error },
            Err(secondary_error) => {
                error!(
                    event_name = "agent.responder.exhausted",
                    primary_error = %primary_error,
                    secondary_error = %secondary_error,
                    "both providers failed"
                );
                FallbackOutcome::Exhausted { primary_error, secondary_error }
            }
        }
    }
}
