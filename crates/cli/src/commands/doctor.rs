use salesdesk_core::config::{AppConfig, GEMINI_API_KEY_ENV, OPENAI_API_KEY_ENV};
use serde::Serialize;

use crate::commands::{CommandResult, ConfigArgs, EXIT_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool, args: &ConfigArgs) -> CommandResult {
    let report = build_report(args);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_CONFIG };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(args: &ConfigArgs) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(args.load_options()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(credential_check(
                "openai_credentials",
                config.openai.has_credentials(),
                OPENAI_API_KEY_ENV,
                &config.openai.model,
            ));
            checks.push(credential_check(
                "gemini_credentials",
                config.gemini.has_credentials(),
                GEMINI_API_KEY_ENV,
                &config.gemini.model,
            ));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("openai_credentials"));
            checks.push(skipped("gemini_credentials"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn credential_check(
    name: &'static str,
    present: bool,
    env_key: &str,
    model: &str,
) -> DoctorCheck {
    if present {
        DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("api key configured for model `{model}`"),
        }
    } else {
        DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: format!("api key missing; set {env_key} or add it to salesdesk.toml"),
        }
    }
}

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because configuration did not load".to_string(),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
