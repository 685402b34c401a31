use serde::Serialize;

use super::routing::AgentKind;

/// Returned when a discovery answer is considered empty. The responder never
/// produces this text today, so the check in the router is dormant.
pub const NO_PRODUCTS_SENTINEL: &str = "No products matched your search.";

pub const NOT_FOUND_MESSAGE: &str =
    "Sorry, I couldn't find an answer to your query. Please try rephrasing.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgentResponse {
    pub keyword: String,
    pub agent: AgentKind,
    pub text: String,
}

impl AgentResponse {
    pub fn label(&self) -> String {
        format!("{} Agent", capitalize(&self.keyword))
    }

    pub fn render(&self) -> String {
        format!("**{}:** {}", self.label(), self.text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateResponse {
    Agents { responses: Vec<AgentResponse> },
    Discovery { text: String },
    NotFound,
}

impl AggregateResponse {
    pub fn render(&self) -> String {
        match self {
            Self::Agents { responses } => {
                responses.iter().map(AgentResponse::render).collect::<Vec<_>>().join("\n\n")
            }
            Self::Discovery { text } => format!("**Product Discovery Agent:** {text}"),
            Self::NotFound => NOT_FOUND_MESSAGE.to_string(),
        }
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{capitalize, AgentResponse, AggregateResponse, NOT_FOUND_MESSAGE};
    use crate::domain::routing::AgentKind;

    fn response(keyword: &str, agent: AgentKind, text: &str) -> AgentResponse {
        AgentResponse { keyword: keyword.to_string(), agent, text: text.to_string() }
    }

    #[test]
    fn capitalize_matches_label_convention() {
        assert_eq!(capitalize("followup"), "Followup");
        assert_eq!(capitalize("LOYALTY"), "Loyalty");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn agent_paragraphs_are_separated_by_a_blank_line() {
        let aggregate = AggregateResponse::Agents {
            responses: vec![
                response("followup", AgentKind::FollowUp, "Thanks for shopping!"),
                response("loyalty", AgentKind::CustomerLoyalty, "You have 120 points."),
            ],
        };

        assert_eq!(
            aggregate.render(),
            "**Followup Agent:** Thanks for shopping!\n\n**Loyalty Agent:** You have 120 points."
        );
    }

    #[test]
    fn discovery_and_not_found_render_fixed_shapes() {
        let discovery = AggregateResponse::Discovery { text: "Try our parkas.".to_string() };
        assert_eq!(discovery.render(), "**Product Discovery Agent:** Try our parkas.");
        assert_eq!(AggregateResponse::NotFound.render(), NOT_FOUND_MESSAGE);
    }
}
