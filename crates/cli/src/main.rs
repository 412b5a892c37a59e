use std::process::ExitCode;

fn main() -> ExitCode {
    callflow_cli::run()
}
