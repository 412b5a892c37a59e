use callflow_agent::{AgentRuntime, LoggingRuntime};
use callflow_core::config::LoadOptions;
use callflow_core::AgentType;
use tracing::{info, warn};

use crate::commands::{build_planner, job_metadata, load_config, plan_failure, CommandResult};
use crate::logging::init_logging;

pub fn run(
    options: &LoadOptions,
    agent_type: AgentType,
    metadata: Option<String>,
) -> CommandResult {
    let config = match load_config("run", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    init_logging(&config.logging);

    if let Err(error) = config.validate_credentials() {
        // The dev runtime needs no credentials; a real transport would refuse to start.
        warn!(
            event_name = "cli.run.credentials_missing",
            agent_type = %agent_type,
            error = %error,
            "provider credentials incomplete"
        );
    }

    let planner = match build_planner("run", &config) {
        Ok(planner) => planner,
        Err(result) => return result,
    };
    let worker = AgentRuntime::new(agent_type, planner, LoggingRuntime);
    info!(
        event_name = "cli.run.worker_started",
        agent_type = %agent_type,
        worker = worker.worker_name(),
        "worker ready"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "run",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let metadata = job_metadata(metadata);
    match runtime.block_on(worker.handle_job(&metadata)) {
        Ok(session_id) => CommandResult::success(
            "run",
            format!("{} handled job in session {session_id}", worker.worker_name()),
        ),
        Err(error) => plan_failure("run", error),
    }
}
