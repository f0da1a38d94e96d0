use std::process::ExitCode;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use seclai_cli::{run_cli, Cli, CliRuntime, ProcessRuntime};
use seclai_client::DEFAULT_API_BASE;

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Stdout carries command results only, so diagnostics go to stderr and the
/// API base comes from the environment rather than a flag.
fn resolve_api_base() -> String {
    std::env::var("SECLAI_API_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

fn exit_code_from(code: i32) -> ExitCode {
    u8::try_from(code).map(ExitCode::from).unwrap_or(ExitCode::FAILURE)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // Help and version land here too; clap reports zero for those.
            let _ = error.print();
            return exit_code_from(error.exit_code());
        }
    };

    let runtime = ProcessRuntime::default();
    run_cli(&cli, &resolve_api_base(), &runtime).await;
    exit_code_from(runtime.exit_code())
}
