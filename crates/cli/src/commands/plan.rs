use callflow_core::config::LoadOptions;
use callflow_core::AgentType;

use crate::commands::{build_planner, job_metadata, load_config, plan_failure, CommandResult};

/// Plans a session without starting it and prints the plan as JSON.
pub fn run(
    options: &LoadOptions,
    agent_type: AgentType,
    metadata: Option<String>,
) -> CommandResult {
    let config = match load_config("plan", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let planner = match build_planner("plan", &config) {
        Ok(planner) => planner,
        Err(result) => return result,
    };

    let plan = match planner.plan(agent_type, &job_metadata(metadata)) {
        Ok(plan) => plan,
        Err(error) => return plan_failure("plan", error),
    };

    match serde_json::to_string_pretty(&plan.summary()) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("plan", "serialization", error.to_string(), 3),
    }
}
