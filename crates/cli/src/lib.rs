pub mod commands;
pub mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands::ConfigArgs;

#[derive(Debug, Parser)]
#[command(
    name = "salesdesk",
    about = "Keyword-routed AI sales agents",
    long_about = "Route shopper questions to discovery, engagement, and retention agents backed by OpenAI with a Gemini fallback.",
    after_help = "Examples:\n  salesdesk chat\n  salesdesk ask \"any discount on winter jackets?\"\n  salesdesk doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file to load instead of salesdesk.toml; must exist"
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "MODEL", help = "Override the OpenAI model")]
    openai_model: Option<String>,
    #[arg(long, global = true, value_name = "MODEL", help = "Override the Gemini model")]
    gemini_model: Option<String>,
    #[arg(long, global = true, value_name = "LEVEL", help = "Override the log level")]
    log_level: Option<String>,
}

impl From<GlobalArgs> for ConfigArgs {
    fn from(value: GlobalArgs) -> Self {
        Self {
            config_path: value.config,
            openai_model: value.openai_model,
            gemini_model: value.gemini_model,
            log_level: value.log_level,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start the interactive sales assistant")]
    Chat,
    #[command(about = "Answer a single query and exit")]
    Ask {
        #[arg(required = true, num_args = 1.., help = "Query text; multiple words are joined")]
        query: Vec<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List the keyword routing table")]
    Agents {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and provider credential readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_args = ConfigArgs::from(cli.global);

    let result = match cli.command {
        Command::Chat => commands::chat::run(&config_args),
        Command::Ask { query, json } => commands::ask::run(&query.join(" "), json, &config_args),
        Command::Agents { json } => {
            commands::CommandResult { exit_code: 0, output: commands::agents::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&config_args) }
        }
        Command::Doctor { json } => commands::doctor::run(json, &config_args),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}
