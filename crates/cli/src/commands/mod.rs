pub mod config;
pub mod doctor;
pub mod plan;
pub mod run;
pub mod run_all;
pub mod tools;

use std::sync::Arc;

use callflow_agent::{DemoStore, PlanError, SessionPlanner, SessionSettings};
use callflow_core::config::{AppConfig, LoadOptions};
use callflow_core::InstructionComposer;
use serde::Serialize;

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
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Metadata given on the command line, else from `CALLFLOW_JOB_METADATA`.
pub fn job_metadata(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("CALLFLOW_JOB_METADATA").ok()).unwrap_or_default()
}

pub(crate) fn load_config(
    command: &str,
    options: &LoadOptions,
) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn build_planner(
    command: &str,
    config: &AppConfig,
) -> Result<SessionPlanner, CommandResult> {
    let composer = InstructionComposer::new()
        .map_err(|error| CommandResult::failure(command, "instructions", error.to_string(), 3))?;
    let store = Arc::new(DemoStore::new());
    Ok(SessionPlanner::new(composer, store, SessionSettings::from_config(config)))
}

pub(crate) fn plan_failure(command: &str, error: PlanError) -> CommandResult {
    match error {
        PlanError::Validation(error) => CommandResult::failure(
            command,
            "config_validation",
            format!("job configuration rejected: {error}"),
            2,
        ),
        PlanError::Instructions(error) => {
            CommandResult::failure(command, "instructions", error.to_string(), 3)
        }
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
