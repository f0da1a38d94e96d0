use std::path::Path;

use serde_json::Value;

use crate::error_report::CliError;
use crate::runtime::CliRuntime;

/// Marker accepted by `--json` and `--json-file` to read from stdin.
pub const STDIN_SENTINEL: &str = "-";

/// Resolves a JSON request body from exactly one of the inline string or
/// the file path, honoring the stdin sentinel for both.
pub async fn resolve_json_body(
    runtime: &dyn CliRuntime,
    inline: Option<&str>,
    file_path: Option<&str>,
) -> Result<Value, CliError> {
    let raw = match (inline, file_path) {
        (Some(_), Some(_)) => {
            return Err(CliError::input(
                "--json and --json-file are mutually exclusive",
            ));
        }
        (Some(inline), None) => {
            if inline == STDIN_SENTINEL {
                runtime.read_input_to_string().await?
            } else {
                inline.to_string()
            }
        }
        (None, Some(file_path)) => {
            if file_path == STDIN_SENTINEL {
                runtime.read_input_to_string().await?
            } else {
                tokio::fs::read_to_string(file_path).await?
            }
        }
        (None, None) => {
            return Err(CliError::input(
                "a JSON request body is required: pass --json or --json-file",
            ));
        }
    };

    serde_json::from_str(&raw)
        .map_err(|error| CliError::input(format!("request body is not valid JSON: {error}")))
}

/// Reads an upload file fully into memory. Filesystem failures propagate
/// as-is rather than being reclassified.
pub async fn read_upload_bytes(path: &Path) -> Result<Vec<u8>, CliError> {
    Ok(tokio::fs::read(path).await?)
}
