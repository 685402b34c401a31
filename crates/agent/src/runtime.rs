use std::sync::Arc;

use salesdesk_core::config::AppConfig;
use salesdesk_core::{
    AgentKind, AgentResponse, AggregateResponse, KeywordRegistry, KeywordRoute,
    NO_PRODUCTS_SENTINEL,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::llm::{GeminiClient, OpenAiClient, ProviderError};
use crate::responder::Responder;

pub struct SalesOrchestrator {
    registry: KeywordRegistry,
    responder: Responder,
}

impl SalesOrchestrator {
    pub fn new(registry: KeywordRegistry, responder: Responder) -> Self {
        Self { registry, responder }
    }

    pub fn with_defaults(responder: Responder) -> Self {
        Self::new(KeywordRegistry::sales_default(), responder)
    }

    /// OpenAI as primary, Gemini as fallback, default keyword table.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let primary = OpenAiClient::from_config(&config.openai)?;
        let secondary = GeminiClient::from_config(&config.gemini)?;
        Ok(Self::with_defaults(Responder::new(Arc::new(primary), Arc::new(secondary))))
    }

    pub fn registry(&self) -> &KeywordRegistry {
        &self.registry
    }

    pub fn match_set(&self, query: &str) -> Vec<&KeywordRoute> {
        self.registry.match_all(query)
    }

    pub async fn handle(&self, query: &str) -> String {
        self.route(query).await.render()
    }

    pub async fn route(&self, query: &str) -> AggregateResponse {
        let correlation_id = Uuid::new_v4().to_string();
        let matched = self.match_set(query);
        let keywords: Vec<&str> = matched.iter().map(|route| route.keyword.as_str()).collect();
        info!(
            event_name = "agent.router.query_routed",
            correlation_id = %correlation_id,
            matched = ?keywords,
            "query routed"
        );

        if !matched.is_empty() {
            let mut responses = Vec::with_capacity(matched.len());
            for route in matched {
                let text = self.invoke(route.agent, query, &correlation_id).await;
                responses.push(AgentResponse {
                    keyword: route.keyword.clone(),
                    agent: route.agent,
                    text,
                });
            }
            return AggregateResponse::Agents { responses };
        }

        let text = self.invoke(AgentKind::ProductDiscovery, query, &correlation_id).await;
        // The responder never yields the sentinel, so this branch is dormant.
        if text != NO_PRODUCTS_SENTINEL {
            return AggregateResponse::Discovery { text };
        }

        AggregateResponse::NotFound
    }

    async fn invoke(&self, agent: AgentKind, query: &str, correlation_id: &str) -> String {
        debug!(
            event_name = "agent.router.agent_invoked",
            correlation_id,
            agent = agent.display_name(),
            "invoking agent"
        );
        self.responder.respond(&agent.prompt(query)).await
    }
}
