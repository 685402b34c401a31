use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Discovery,
    Engagement,
    Retention,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Engagement => "engagement",
            Self::Retention => "retention",
        }
    }
}

/// The nine sales agents. Each one owns a single prompt template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    ProductDiscovery,
    DiscountAdviser,
    ProfileMatcher,
    SegmentRecommendations,
    UpsellCrossSell,
    UpsellPrompter,
    ProactiveOutreach,
    FollowUp,
    CustomerLoyalty,
}

impl AgentKind {
    pub const ALL: [AgentKind; 9] = [
        Self::ProductDiscovery,
        Self::DiscountAdviser,
        Self::ProfileMatcher,
        Self::SegmentRecommendations,
        Self::UpsellCrossSell,
        Self::UpsellPrompter,
        Self::ProactiveOutreach,
        Self::FollowUp,
        Self::CustomerLoyalty,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ProductDiscovery => "Product Discovery",
            Self::DiscountAdviser => "Discount Adviser",
            Self::ProfileMatcher => "Profile Matcher",
            Self::SegmentRecommendations => "Segment Recommendations",
            Self::UpsellCrossSell => "Upsell / Cross-sell",
            Self::UpsellPrompter => "Upsell Prompter",
            Self::ProactiveOutreach => "Proactive Outreach",
            Self::FollowUp => "Follow-up",
            Self::CustomerLoyalty => "Customer Loyalty",
        }
    }

    /// Builds the provider prompt around the query exactly as the user typed it.
    pub fn prompt(&self, query: &str) -> String {
        match self {
            Self::ProductDiscovery => format!("Find products related to: {query}"),
            Self::DiscountAdviser => {
                format!("Suggest any current discounts or offers for: {query}")
            }
            Self::ProfileMatcher => format!("Match the best product profile for: {query}"),
            Self::SegmentRecommendations => {
                format!("Give fashion recommendations for segment: {query}")
            }
            Self::UpsellCrossSell => format!("Suggest upsell or cross-sell ideas for: {query}"),
            Self::UpsellPrompter => format!("Create a promotional upsell message for: {query}"),
            Self::ProactiveOutreach => {
                format!("Draft proactive outreach engagement content for: {query}")
            }
            Self::FollowUp => format!("Write a follow-up message for: {query}"),
            Self::CustomerLoyalty => format!("Check loyalty benefits for: {query}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRoute {
    pub category: Category,
    pub keyword: String,
    pub agent: AgentKind,
}

impl KeywordRoute {
    pub fn matches(&self, normalized_query: &str) -> bool {
        normalized_query.contains(self.keyword.as_str())
    }
}

/// Ordered, read-only keyword table. Iteration order is registration order,
/// which is also the order in which matched agents answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordRegistry {
    routes: Vec<KeywordRoute>,
}

impl KeywordRegistry {
    pub fn builder() -> KeywordRegistryBuilder {
        KeywordRegistryBuilder::default()
    }

    pub fn sales_default() -> Self {
        let routes = [
            (Category::Discovery, "product", AgentKind::ProductDiscovery),
            (Category::Discovery, "discount", AgentKind::DiscountAdviser),
            (Category::Discovery, "profile", AgentKind::ProfileMatcher),
            (Category::Discovery, "segment", AgentKind::SegmentRecommendations),
            (Category::Engagement, "upsell", AgentKind::UpsellCrossSell),
            (Category::Engagement, "prompter", AgentKind::UpsellPrompter),
            (Category::Engagement, "outreach", AgentKind::ProactiveOutreach),
            (Category::Retention, "followup", AgentKind::FollowUp),
            (Category::Retention, "loyalty", AgentKind::CustomerLoyalty),
        ];

        Self {
            routes: routes
                .into_iter()
                .map(|(category, keyword, agent)| KeywordRoute {
                    category,
                    keyword: keyword.to_string(),
                    agent,
                })
                .collect(),
        }
    }

    pub fn routes(&self) -> &[KeywordRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every route whose keyword occurs in the query, case-insensitively.
    pub fn match_all(&self, query: &str) -> Vec<&KeywordRoute> {
        let normalized = query.to_lowercase();
        self.routes.iter().filter(|route| route.matches(&normalized)).collect()
    }
}

impl Default for KeywordRegistry {
    fn default() -> Self {
        Self::sales_default()
    }
}

#[derive(Clone, Debug, Default)]
pub struct KeywordRegistryBuilder {
    routes: Vec<KeywordRoute>,
}

impl KeywordRegistryBuilder {
    /// Registers `keyword` under `category`. Re-registering the same pair swaps
    /// the agent in place; the same keyword under another category is a
    /// separate route and fires as well.
    pub fn register(
        mut self,
        category: Category,
        keyword: &str,
        agent: AgentKind,
    ) -> Result<Self, DomainError> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(DomainError::InvalidKeyword { keyword, reason: "keyword is empty" });
        }

        if let Some(existing) = self
            .routes
            .iter_mut()
            .find(|route| route.category == category && route.keyword == keyword)
        {
            existing.agent = agent;
        } else {
            self.routes.push(KeywordRoute { category, keyword, agent });
        }

        Ok(self)
    }

    pub fn build(self) -> KeywordRegistry {
        KeywordRegistry { routes: self.routes }
    }
}
