use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use anyhow::{Context, Result};
use callflow_core::config::LoadOptions;
use callflow_core::AgentType;
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use crate::commands::{load_config, CommandResult};
use crate::logging::init_logging;

/// How to launch the worker process for one agent type.
#[derive(Clone, Debug)]
pub struct WorkerCommand {
    pub agent_type: AgentType,
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl WorkerCommand {
    /// `<program> run <agent_type>`, i.e. this binary re-invoked per worker.
    /// An explicit config file is passed on so every worker loads the same one.
    pub fn for_agent(program: PathBuf, agent_type: AgentType, config: Option<&Path>) -> Self {
        let mut args: Vec<OsString> = vec!["run".into(), agent_type.as_str().into()];
        if let Some(path) = config {
            args.push("--config".into());
            args.push(path.into());
        }
        Self { agent_type, program, args }
    }
}

#[derive(Debug)]
pub enum Supervision {
    Exited(Vec<(AgentType, io::Result<ExitStatus>)>),
    Interrupted,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("run-all", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    init_logging(&config.logging);

    let program = match std::env::current_exe() {
        Ok(program) => program,
        Err(error) => {
            return CommandResult::failure(
                "run-all",
                "launcher",
                format!("could not locate the callflow binary: {error}"),
                3,
            );
        }
    };
    let workers = AgentType::ALL
        .into_iter()
        .map(|agent_type| {
            WorkerCommand::for_agent(program.clone(), agent_type, options.config_path.as_deref())
        })
        .collect::<Vec<_>>();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "run-all",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(supervise(workers)) {
        Ok(Supervision::Interrupted) => CommandResult::success("run-all", "all agents stopped"),
        Ok(Supervision::Exited(exits)) => summarize(exits),
        Err(error) => CommandResult::failure("run-all", "launcher", format!("{error:#}"), 3),
    }
}

/// Starts every worker, then waits for all of them to exit or for Ctrl-C.
/// On Ctrl-C every worker still running is killed and reaped.
pub async fn supervise(workers: Vec<WorkerCommand>) -> Result<Supervision> {
    info!(event_name = "cli.run_all.starting", workers = workers.len(), "starting all agents");
    let mut children = spawn_all(&workers).await?;

    let supervision = tokio::select! {
        exits = wait_all(&mut children) => Supervision::Exited(exits),
        () = shutdown_signal() => Supervision::Interrupted,
    };

    if matches!(supervision, Supervision::Interrupted) {
        info!(event_name = "cli.run_all.shutdown", "shutting down all agents");
        stop_all(&mut children).await;
        info!(event_name = "cli.run_all.stopped", "all agents stopped");
    }

    Ok(supervision)
}

async fn spawn_all(workers: &[WorkerCommand]) -> Result<Vec<(AgentType, Child)>> {
    let mut children = Vec::with_capacity(workers.len());
    for worker in workers {
        let spawned = Command::new(&worker.program).args(&worker.args).kill_on_drop(true).spawn();
        let child = match spawned {
            Ok(child) => child,
            Err(error) => {
                // Reap what already started rather than leaving orphans.
                stop_all(&mut children).await;
                return Err(error).with_context(|| {
                    format!("failed to start {}", worker.agent_type.worker_name())
                });
            }
        };
        info!(
            event_name = "cli.run_all.worker_started",
            worker = worker.agent_type.worker_name(),
            pid = child.id(),
            "started worker process"
        );
        children.push((worker.agent_type, child));
    }
    Ok(children)
}

async fn wait_all(
    children: &mut [(AgentType, Child)],
) -> Vec<(AgentType, io::Result<ExitStatus>)> {
    let mut exits = Vec::with_capacity(children.len());
    for (agent_type, child) in children.iter_mut() {
        let status = child.wait().await;
        match &status {
            Ok(status) => info!(
                event_name = "cli.run_all.worker_exited",
                worker = agent_type.worker_name(),
                status = %status,
                "worker process exited"
            ),
            Err(wait_error) => error!(
                event_name = "cli.run_all.worker_lost",
                worker = agent_type.worker_name(),
                error = %wait_error,
                "could not wait on worker process"
            ),
        }
        exits.push((*agent_type, status));
    }
    exits
}

async fn stop_all(children: &mut [(AgentType, Child)]) {
    for (agent_type, child) in children.iter_mut() {
        // `kill` also waits, so the process is reaped once this returns.
        if let Err(kill_error) = child.kill().await {
            warn!(
                event_name = "cli.run_all.kill_failed",
                worker = agent_type.worker_name(),
                error = %kill_error,
                "could not stop worker process"
            );
        }
    }
}

async fn shutdown_signal() {
    if let Err(signal_error) = tokio::signal::ctrl_c().await {
        warn!(
            event_name = "cli.run_all.signal_unavailable",
            error = %signal_error,
            "ctrl-c handler unavailable; waiting for workers to exit"
        );
        std::future::pending::<()>().await;
    }
}

fn summarize(exits: Vec<(AgentType, io::Result<ExitStatus>)>) -> CommandResult {
    let failed = exits
        .iter()
        .filter(|(_, status)| !matches!(status, Ok(status) if status.success()))
        .map(|(agent_type, _)| agent_type.worker_name())
        .collect::<Vec<_>>();

    if failed.is_empty() {
        CommandResult::success("run-all", format!("{} workers exited cleanly", exits.len()))
    } else {
        CommandResult::failure(
            "run-all",
            "worker_exit",
            format!("workers exited with errors: {}", failed.join(", ")),
            1,
        )
    }
}
