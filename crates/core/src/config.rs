use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub gemini: GeminiConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub openai_model: Option<String>,
    pub gemini_model: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    /// Read `.env` from the working directory before the environment layer.
    pub load_dotenv: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("could not load dotenv file: {0}")]
    Dotenv(String),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig {
                api_key: None,
                base_url: "https://api.openai.com".to_string(),
                model: "gpt-4o-mini".to_string(),
                max_tokens: 200,
                timeout_secs: 30,
            },
            gemini: GeminiConfig {
                api_key: None,
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-1.5-flash".to_string(),
                timeout_secs: 30,
            },
            logging: LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl OpenAiConfig {
    pub fn has_credentials(&self) -> bool {
        has_secret(self.api_key.as_ref())
    }
}

impl GeminiConfig {
    pub fn has_credentials(&self) -> bool {
        has_secret(self.api_key.as_ref())
    }
}

fn has_secret(value: Option<&SecretString>) -> bool {
    value.map(|secret| !secret.expose_secret().trim().is_empty()).unwrap_or(false)
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        if options.load_dotenv {
            load_dotenv()?;
        }

        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("salesdesk.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(openai) = patch.openai {
            if let Some(openai_api_key_value) = openai.api_key {
                self.openai.api_key = Some(secret_value(openai_api_key_value));
            }
            if let Some(base_url) = openai.base_url {
                self.openai.base_url = base_url;
            }
            if let Some(model) = openai.model {
                self.openai.model = model;
            }
            if let Some(max_tokens) = openai.max_tokens {
                self.openai.max_tokens = max_tokens;
            }
            if let Some(timeout_secs) = openai.timeout_secs {
                self.openai.timeout_secs = timeout_secs;
            }
        }

        if let Some(gemini) = patch.gemini {
            if let Some(gemini_api_key_value) = gemini.api_key {
                self.gemini.api_key = Some(secret_value(gemini_api_key_value));
            }
            if let Some(base_url) = gemini.base_url {
                self.gemini.base_url = base_url;
            }
            if let Some(model) = gemini.model {
                self.gemini.model = model;
            }
            if let Some(timeout_secs) = gemini.timeout_secs {
                self.gemini.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let openai_key =
            read_env("SALESDESK_OPENAI_API_KEY").or_else(|| read_env(OPENAI_API_KEY_ENV));
        if let Some(value) = openai_key {
            self.openai.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SALESDESK_OPENAI_BASE_URL") {
            self.openai.base_url = value;
        }
        if let Some(value) = read_env("SALESDESK_OPENAI_MODEL") {
            self.openai.model = value;
        }
        if let Some(value) = read_env("SALESDESK_OPENAI_MAX_TOKENS") {
            self.openai.max_tokens = parse_u32("SALESDESK_OPENAI_MAX_TOKENS", &value)?;
        }
        if let Some(value) = read_env("SALESDESK_OPENAI_TIMEOUT_SECS") {
            self.openai.timeout_secs = parse_u64("SALESDESK_OPENAI_TIMEOUT_SECS", &value)?;
        }

        let gemini_key =
            read_env("SALESDESK_GEMINI_API_KEY").or_else(|| read_env(GEMINI_API_KEY_ENV));
        if let Some(value) = gemini_key {
            self.gemini.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SALESDESK_GEMINI_BASE_URL") {
            self.gemini.base_url = value;
        }
        if let Some(value) = read_env("SALESDESK_GEMINI_MODEL") {
            self.gemini.model = value;
        }
        if let Some(value) = read_env("SALESDESK_GEMINI_TIMEOUT_SECS") {
            self.gemini.timeout_secs = parse_u64("SALESDESK_GEMINI_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("SALESDESK_LOGGING_LEVEL").or_else(|| read_env("SALESDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SALESDESK_LOGGING_FORMAT").or_else(|| read_env("SALESDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(openai_model) = overrides.openai_model {
            self.openai.model = openai_model;
        }
        if let Some(gemini_model) = overrides.gemini_model {
            self.gemini.model = gemini_model;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_openai(&self.openai)?;
        validate_gemini(&self.gemini)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(error) if error.not_found() => Ok(()),
        Err(error) => Err(ConfigError::Dotenv(error.to_string())),
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("salesdesk.toml"), PathBuf::from("config/salesdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_openai(openai: &OpenAiConfig) -> Result<(), ConfigError> {
    validate_base_url("openai.base_url", &openai.base_url)?;
    validate_model("openai.model", &openai.model)?;
    validate_timeout("openai.timeout_secs", openai.timeout_secs)?;

    if openai.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "openai.max_tokens must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_gemini(gemini: &GeminiConfig) -> Result<(), ConfigError> {
    validate_base_url("gemini.base_url", &gemini.base_url)?;
    validate_model("gemini.model", &gemini.model)?;
    validate_timeout("gemini.timeout_secs", gemini.timeout_secs)
}

fn validate_base_url(key: &str, base_url: &str) -> Result<(), ConfigError> {
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{key} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn validate_model(key: &str, model: &str) -> Result<(), ConfigError> {
    if model.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    Ok(())
}

fn validate_timeout(key: &str, timeout_secs: u64) -> Result<(), ConfigError> {
    if timeout_secs == 0 || timeout_secs > 300 {
        return Err(ConfigError::Validation(format!("{key} must be in range 1..=300")));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    openai: Option<OpenAiPatch>,
    gemini: Option<GeminiPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
