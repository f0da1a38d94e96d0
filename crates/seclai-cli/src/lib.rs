//! Command-line front end for the Seclai content and agent platform.
//!
//! Exposes clap-backed command/flag types plus the dispatch, input
//! resolution, and error reporting layers shared by the `seclai` binary
//! and its integration tests.

pub mod cli_args;
pub mod commands;
pub mod error_report;
pub mod request_input;
pub mod runtime;

pub use cli_args::Cli;
pub use commands::run_cli;
pub use error_report::{report_error, CliError};
pub use request_input::{read_upload_bytes, resolve_json_body};
pub use runtime::{CliRuntime, MemoryRuntime, ProcessRuntime};
