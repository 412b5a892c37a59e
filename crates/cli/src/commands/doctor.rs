use callflow_core::config::{AppConfig, LoadOptions};
use callflow_core::{AgentConfig, AgentType, InstructionComposer};
use serde::Serialize;

use crate::commands::CommandResult;

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

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

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

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = vec![check_agent_defaults(), check_instruction_templates()];

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_credentials(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "credential_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
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

fn check_agent_defaults() -> DoctorCheck {
    match AgentConfig::from_env() {
        Ok(config) => DoctorCheck {
            name: "agent_defaults",
            status: CheckStatus::Pass,
            details: format!(
                "default agent `{}` with {} voice, {} tone, {} verbosity, {} pacing",
                config.agent_type,
                config.voice_gender,
                config.style.tone,
                config.style.verbosity,
                config.style.pacing
            ),
        },
        Err(error) => DoctorCheck {
            name: "agent_defaults",
            status: CheckStatus::Fail,
            details: format!("DEFAULT_* environment rejected: {error}"),
        },
    }
}

fn check_instruction_templates() -> DoctorCheck {
    let rendered = InstructionComposer::new().and_then(|composer| {
        AgentType::ALL.into_iter().try_for_each(|agent_type| {
            let config = AgentConfig::default().with_agent_type(agent_type);
            composer.instructions(&config)?;
            composer.greeting(&config).map(|_| ())
        })
    });

    match rendered {
        Ok(()) => DoctorCheck {
            name: "instruction_templates",
            status: CheckStatus::Pass,
            details: format!("rendered scripts and greetings for {} agents", AgentType::ALL.len()),
        },
        Err(error) => DoctorCheck {
            name: "instruction_templates",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_credentials(config: &AppConfig) -> DoctorCheck {
    match config.validate_credentials() {
        Ok(()) => DoctorCheck {
            name: "credential_readiness",
            status: CheckStatus::Pass,
            details: format!(
                "livekit, {} tts, and model provider credentials present",
                config.providers.tts_provider
            ),
        },
        Err(error) => DoctorCheck {
            name: "credential_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
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
