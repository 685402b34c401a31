use std::env;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use salesdesk_agent::{LlmClient, ProviderError, Responder, SalesOrchestrator};
use salesdesk_cli::commands::{agents, ask, chat, doctor, ConfigArgs};
use salesdesk_core::Query;
use serde_json::Value;

struct StubClient {
    name: &'static str,
    reply: Result<String, ProviderError>,
}

#[async_trait]
impl LlmClient for StubClient {
    fn provider_name(&self) -> &'static str {
        self.name
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.reply.clone()
    }
}

fn stub_orchestrator(primary_reply: Result<String, ProviderError>) -> SalesOrchestrator {
    let primary = Arc::new(StubClient { name: "OpenAI", reply: primary_reply });
    let secondary =
        Arc::new(StubClient { name: "Gemini", reply: Ok(" gemini stub answer ".to_string()) });
    SalesOrchestrator::with_defaults(Responder::new(primary, secondary))
}

fn current_thread_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
}

#[test]
fn doctor_passes_with_both_provider_keys() {
    with_env(&[("OPENAI_API_KEY", "sk-test"), ("GEMINI_API_KEY", "gm-test")], || {
        let result = doctor::run(true, &ConfigArgs::default());
        assert_eq!(result.exit_code, 0, "expected all readiness checks to pass");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn doctor_flags_missing_provider_keys() {
    with_env(&[("OPENAI_API_KEY", "sk-test")], || {
        let result = doctor::run(true, &ConfigArgs::default());
        assert_eq!(result.exit_code, 3, "expected readiness failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][1]["name"], "openai_credentials");
        assert_eq!(payload["checks"][1]["status"], "pass");
        assert_eq!(payload["checks"][2]["name"], "gemini_credentials");
        assert_eq!(payload["checks"][2]["status"], "fail");
    });
}

#[test]
fn doctor_skips_credential_checks_when_config_is_invalid() {
    with_env(&[("SALESDESK_OPENAI_BASE_URL", "not-a-url")], || {
        let result = doctor::run(true, &ConfigArgs::default());
        let payload = parse_payload(&result.output);

        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn ask_rejects_blank_query_before_loading_config() {
    with_env(&[("SALESDESK_OPENAI_BASE_URL", "not-a-url")], || {
        let result = ask::run("   ", true, &ConfigArgs::default());
        assert_eq!(result.exit_code, 2, "blank query should be a bad request");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "bad_request");
        assert_eq!(payload["message"], "bad request: Query cannot be empty!");
    });
}

#[test]
fn ask_reports_invalid_config_as_internal_error() {
    with_env(&[("SALESDESK_GEMINI_TIMEOUT_SECS", "0")], || {
        let result = ask::run("any discount?", true, &ConfigArgs::default());
        assert_eq!(result.exit_code, 3, "expected configuration failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "internal");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("gemini.timeout_secs"));
    });
}

#[test]
fn explicit_config_path_must_exist() {
    with_env(&[("OPENAI_API_KEY", "sk-test"), ("GEMINI_API_KEY", "gm-test")], || {
        let args = ConfigArgs {
            config_path: Some(PathBuf::from("does-not-exist/salesdesk.toml")),
            ..ConfigArgs::default()
        };

        let result = ask::run("any discount?", true, &args);
        assert_eq!(result.exit_code, 3, "expected configuration failure code");
        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("required config file was not found"), "{message}");

        let report = parse_payload(&doctor::run(true, &args).output);
        assert_eq!(report["checks"][0]["name"], "config_validation");
        assert_eq!(report["checks"][0]["status"], "fail");
    });
}

#[test]
fn doctor_reports_model_overrides_from_flags() {
    with_env(&[("OPENAI_API_KEY", "sk-test"), ("GEMINI_API_KEY", "gm-test")], || {
        let args = ConfigArgs {
            openai_model: Some("gpt-4o".to_string()),
            gemini_model: Some("gemini-1.5-pro".to_string()),
            ..ConfigArgs::default()
        };

        let payload = parse_payload(&doctor::run(true, &args).output);
        assert_eq!(payload["checks"][1]["details"], "api key configured for model `gpt-4o`");
        assert_eq!(
            payload["checks"][2]["details"],
            "api key configured for model `gemini-1.5-pro`"
        );
    });
}

#[test]
fn ask_answer_uses_gemini_when_openai_fails() {
    let orchestrator = stub_orchestrator(Err(ProviderError::MissingCredentials {
        provider: "OpenAI",
    }));
    let runtime = current_thread_runtime();
    let query = Query::parse("what goes with a denim jacket?").expect("non-empty query");

    let result = ask::answer(&orchestrator, &runtime, &query, false);

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output, "**Product Discovery Agent:** gemini stub answer");
}

#[test]
fn ask_answer_wraps_response_in_json_payload() {
    let orchestrator = stub_orchestrator(Ok("20% off all outerwear".to_string()));
    let runtime = current_thread_runtime();
    let query = Query::parse("Discount on coats").expect("non-empty query");

    let result = ask::answer(&orchestrator, &runtime, &query, true);
    let payload = parse_payload(&result.output);

    assert_eq!(payload["command"], "ask");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["message"], "**Discount Agent:** 20% off all outerwear");
}

#[test]
fn chat_session_warns_on_blank_lines_and_stops_at_quit() {
    let orchestrator = stub_orchestrator(Ok("stub answer".to_string()));
    let runtime = current_thread_runtime();
    let input = Cursor::new("   \nI want a discount\nquit\nloyalty\n");
    let mut output = Vec::new();
    let mut status = Vec::new();

    let answered = chat::converse(&orchestrator, &runtime, input, &mut output, &mut status)
        .expect("in-memory i/o should not fail");

    let output = String::from_utf8(output).expect("utf-8 output");
    let status = String::from_utf8(status).expect("utf-8 status");

    assert_eq!(answered, 1, "quit should stop before the loyalty query");
    assert!(output.starts_with(chat::TITLE));
    assert!(output.contains("**Discount Agent:** stub answer"));
    assert!(!output.contains("Loyalty Agent"));
    assert!(status.contains("warning: Query cannot be empty!"));
    assert_eq!(status.matches("Thinking...").count(), 1);
}

#[test]
fn chat_session_ends_on_eof() {
    let orchestrator = stub_orchestrator(Ok("stub answer".to_string()));
    let runtime = current_thread_runtime();
    let mut output = Vec::new();
    let mut status = Vec::new();

    let answered = chat::converse(
        &orchestrator,
        &runtime,
        Cursor::new("followup and loyalty"),
        &mut output,
        &mut status,
    )
    .expect("in-memory i/o should not fail");

    let output = String::from_utf8(output).expect("utf-8 output");
    assert_eq!(answered, 1);
    assert!(output.contains("**Followup Agent:** stub answer\n\n**Loyalty Agent:** stub answer"));
}

#[test]
fn agents_json_lists_default_routes_in_order() {
    let payload = parse_payload(&agents::run(true));
    let routes = payload.as_array().expect("routes array");

    assert_eq!(routes.len(), 9);
    assert_eq!(routes[0]["keyword"], "product");
    assert_eq!(routes[0]["category"], "discovery");
    assert_eq!(routes[8]["keyword"], "loyalty");
    assert_eq!(routes[8]["agent"], "customer_loyalty");
    assert_eq!(routes[1]["template"], "Suggest any current discounts or offers for: {query}");
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "OPENAI_API_KEY",
        "GEMINI_API_KEY",
        "SALESDESK_OPENAI_API_KEY",
        "SALESDESK_OPENAI_BASE_URL",
        "SALESDESK_OPENAI_MODEL",
        "SALESDESK_OPENAI_MAX_TOKENS",
        "SALESDESK_OPENAI_TIMEOUT_SECS",
        "SALESDESK_GEMINI_API_KEY",
        "SALESDESK_GEMINI_BASE_URL",
        "SALESDESK_GEMINI_MODEL",
        "SALESDESK_GEMINI_TIMEOUT_SECS",
        "SALESDESK_LOGGING_LEVEL",
        "SALESDESK_LOGGING_FORMAT",
        "SALESDESK_LOG_LEVEL",
        "SALESDESK_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
