use salesdesk_core::{AgentKind, Category, KeywordRegistry};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RouteEntry<'a> {
    category: Category,
    keyword: &'a str,
    agent: AgentKind,
    display_name: &'static str,
    template: String,
}

pub fn run(json_output: bool) -> String {
    render(&KeywordRegistry::sales_default(), json_output)
}

pub fn render(registry: &KeywordRegistry, json_output: bool) -> String {
    let entries: Vec<RouteEntry<'_>> = registry
        .routes()
        .iter()
        .map(|route| RouteEntry {
            category: route.category,
            keyword: &route.keyword,
            agent: route.agent,
            display_name: route.agent.display_name(),
            template: route.agent.prompt("{query}"),
        })
        .collect();

    if json_output {
        return serde_json::to_string_pretty(&entries)
            .unwrap_or_else(|error| format!("[{{\"error\":\"{error}\"}}]"));
    }

    let mut lines =
        vec![format!("{} keyword routes (all matches fire, in this order):", entries.len())];
    lines.extend(entries.iter().map(|entry| {
        format!(
            "- [{}] {} -> {} ({})",
            entry.category.as_str(),
            entry.keyword,
            entry.display_name,
            entry.template
        )
    }));
    lines.push(format!(
        "- [fallback] <no match> -> {} ({})",
        AgentKind::ProductDiscovery.display_name(),
        AgentKind::ProductDiscovery.prompt("{query}")
    ));
    lines.join("\n")
}
