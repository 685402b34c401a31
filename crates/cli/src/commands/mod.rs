pub mod agents;
pub mod ask;
pub mod chat;
pub mod config;
pub mod doctor;

use std::path::PathBuf;

use anyhow::{Context, Result};
use salesdesk_agent::SalesOrchestrator;
use salesdesk_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use salesdesk_core::errors::{ApplicationError, InterfaceError};
use serde::Serialize;
use tokio::runtime::Runtime;
use uuid::Uuid;

pub const EXIT_BAD_REQUEST: u8 = 2;
pub const EXIT_CONFIG: u8 = 3;
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    correlation_id: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            correlation_id: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(command: &str, error: &InterfaceError, exit_code: u8) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error.error_class().to_string()),
            correlation_id: Some(error.correlation_id().to_string()),
            message: error.to_string(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn plain(exit_code: u8, output: impl Into<String>) -> Self {
        Self { exit_code, output: output.into() }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Config-related flags shared by every subcommand.
#[derive(Clone, Debug, Default)]
pub struct ConfigArgs {
    pub config_path: Option<PathBuf>,
    pub openai_model: Option<String>,
    pub gemini_model: Option<String>,
    pub log_level: Option<String>,
}

impl ConfigArgs {
    /// An explicit `--config` path must exist; otherwise the usual lookup applies.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config_path.clone(),
            require_file: self.config_path.is_some(),
            load_dotenv: true,
            overrides: ConfigOverrides {
                openai_model: self.openai_model.clone(),
                gemini_model: self.gemini_model.clone(),
                log_level: self.log_level.clone(),
            },
        }
    }
}

/// Everything a query-answering command needs, built once per invocation.
pub(crate) struct Session {
    pub orchestrator: SalesOrchestrator,
    pub runtime: Runtime,
}

pub(crate) fn open_session(args: &ConfigArgs) -> Result<Session, InterfaceError> {
    let correlation_id = Uuid::new_v4().to_string();

    let config = AppConfig::load(args.load_options())
        .map_err(|error| {
            ApplicationError::Configuration(error.to_string()).into_interface(&correlation_id)
        })?;
    crate::logging::init(&config);

    let orchestrator = SalesOrchestrator::from_config(&config).map_err(|error| {
        ApplicationError::Integration(error.to_string()).into_interface(&correlation_id)
    })?;
    let runtime = build_runtime().map_err(|error| {
        ApplicationError::Integration(format!("{error:#}")).into_interface(&correlation_id)
    })?;

    Ok(Session { orchestrator, runtime })
}

pub(crate) fn exit_code_for(error: &InterfaceError) -> u8 {
    match error {
        InterfaceError::BadRequest { .. } => EXIT_BAD_REQUEST,
        InterfaceError::Internal { .. } => EXIT_CONFIG,
        InterfaceError::ServiceUnavailable { .. } => EXIT_RUNTIME,
    }
}

pub(crate) fn error_line(error: &InterfaceError) -> String {
    format!("error: {} ({error})", error.user_message())
}

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")
}
