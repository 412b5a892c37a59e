pub mod commands;
pub mod logging;

use callflow_core::config::LoadOptions;
use callflow_core::AgentType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "callflow",
    about = "Mind Call Flow voice agent launcher",
    long_about = "Launch voice agent workers, preview planned sessions, and inspect tools and \
                  runtime configuration.",
    after_help = "Examples:\n  callflow run scheduling --metadata '{\"voice_gender\":\"male\"}'\n  \
                  callflow plan outbound --metadata '{\"user_name\":\"Priya\"}'\n  \
                  callflow run-all\n  callflow doctor --json"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file to load (defaults to callflow.toml or config/callflow.toml)"
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one worker and hand a single job to the voice runtime")]
    Run {
        #[arg(help = "Agent type: general, scheduling, customer_service, or outbound")]
        agent: AgentType,
        #[arg(long, help = "Job metadata as a JSON object (defaults to CALLFLOW_JOB_METADATA)")]
        metadata: Option<String>,
    },
    #[command(about = "Run one worker process per agent type until interrupted")]
    RunAll,
    #[command(about = "Print the planned session for an agent type without starting it")]
    Plan {
        agent: AgentType,
        #[arg(long, help = "Job metadata as a JSON object (defaults to CALLFLOW_JOB_METADATA)")]
        metadata: Option<String>,
    },
    #[command(about = "Print the function-calling schemas of each agent type's tools")]
    Tools {
        #[arg(long, help = "Only list tools for this agent type")]
        agent: Option<AgentType>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, agent defaults, templates, and provider credentials")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let options = LoadOptions::from_flag(cli.config);

    let result = match cli.command {
        Command::Run { agent, metadata } => commands::run::run(&options, agent, metadata),
        Command::RunAll => commands::run_all::run(&options),
        Command::Plan { agent, metadata } => commands::plan::run(&options, agent, metadata),
        Command::Tools { agent } => {
            commands::CommandResult { exit_code: 0, output: commands::tools::run(agent) }
        }
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
