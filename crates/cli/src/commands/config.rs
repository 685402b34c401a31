use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use salesdesk_core::config::{AppConfig, GEMINI_API_KEY_ENV, OPENAI_API_KEY_ENV};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

use crate::commands::ConfigArgs;

pub fn run(args: &ConfigArgs) -> String {
    let config = match AppConfig::load(args.load_options()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = args.config_path.clone().or_else(detect_config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };
    let flagged = |flag: &str, value: &Option<String>, key_path: &str, env_keys: &[&str]| {
        if value.is_some() {
            format!("cli ({flag})")
        } else {
            source(key_path, env_keys)
        }
    };

    let mut lines =
        vec!["effective config (source precedence: cli > env > file > default):".to_string()];

    lines.push(render_line(
        "openai.api_key",
        &redact_key(config.openai.api_key.as_ref()),
        source("openai.api_key", &["SALESDESK_OPENAI_API_KEY", OPENAI_API_KEY_ENV]),
    ));
    lines.push(render_line(
        "openai.base_url",
        &config.openai.base_url,
        source("openai.base_url", &["SALESDESK_OPENAI_BASE_URL"]),
    ));
    lines.push(render_line(
        "openai.model",
        &config.openai.model,
        flagged(
            "--openai-model",
            &args.openai_model,
            "openai.model",
            &["SALESDESK_OPENAI_MODEL"],
        ),
    ));
    lines.push(render_line(
        "openai.max_tokens",
        &config.openai.max_tokens.to_string(),
        source("openai.max_tokens", &["SALESDESK_OPENAI_MAX_TOKENS"]),
    ));
    lines.push(render_line(
        "openai.timeout_secs",
        &config.openai.timeout_secs.to_string(),
        source("openai.timeout_secs", &["SALESDESK_OPENAI_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "gemini.api_key",
        &redact_key(config.gemini.api_key.as_ref()),
        source("gemini.api_key", &["SALESDESK_GEMINI_API_KEY", GEMINI_API_KEY_ENV]),
    ));
    lines.push(render_line(
        "gemini.base_url",
        &config.gemini.base_url,
        source("gemini.base_url", &["SALESDESK_GEMINI_BASE_URL"]),
    ));
    lines.push(render_line(
        "gemini.model",
        &config.gemini.model,
        flagged(
            "--gemini-model",
            &args.gemini_model,
            "gemini.model",
            &["SALESDESK_GEMINI_MODEL"],
        ),
    ));
    lines.push(render_line(
        "gemini.timeout_secs",
        &config.gemini.timeout_secs.to_string(),
        source("gemini.timeout_secs", &["SALESDESK_GEMINI_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        flagged(
            "--log-level",
            &args.log_level,
            "logging.level",
            &["SALESDESK_LOGGING_LEVEL", "SALESDESK_LOG_LEVEL"],
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["SALESDESK_LOGGING_FORMAT", "SALESDESK_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("salesdesk.toml"), PathBuf::from("config/salesdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_key(key: Option<&SecretString>) -> String {
    let Some(key) = key else {
        return "<unset>".to_string();
    };
    let trimmed = key.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use toml::Value;

    use super::{contains_path, redact_key};

    #[test]
    fn keys_are_redacted_to_their_prefix() {
        let key = SecretString::from("sk-proj-abcdef".to_string());
        assert_eq!(redact_key(Some(&key)), "sk-***");

        let opaque = SecretString::from("AIzaSyOpaque".to_string());
        assert_eq!(redact_key(Some(&opaque)), "<redacted>");
        assert_eq!(redact_key(None), "<unset>");
    }

    #[test]
    fn dotted_paths_are_resolved_in_the_file_document() {
        let doc: Value = "[openai]\nmodel = \"gpt-4o\"\n".parse().expect("valid toml");
        assert!(contains_path(&doc, "openai.model"));
        assert!(!contains_path(&doc, "gemini.model"));
    }
}
