use seclai_client::SeclaiError;
use thiserror::Error;

use crate::runtime::CliRuntime;

#[derive(Debug, Error)]
/// Enumerates supported `CliError` values.
///
/// Closed taxonomy the normalizer matches exhaustively: local input
/// problems, anything the API client raised, and a generic catch-all for
/// filesystem and serialization failures.
pub enum CliError {
    #[error("{0}")]
    Input(String),
    #[error(transparent)]
    Client(#[from] SeclaiError),
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Other(error.to_string())
    }
}

/// Writes the normalized failure report to the error sink and records the
/// failure exit code. This is the terminal sink for every error; rendering
/// itself cannot fail.
pub fn report_error(runtime: &dyn CliRuntime, error: &CliError) {
    runtime.write_err(&render_error(error));
    runtime.set_exit_code(1);
}

fn render_error(error: &CliError) -> String {
    match error {
        CliError::Input(message) => format!("InputError: {message}\n"),
        CliError::Other(message) => format!("Error: {message}\n"),
        CliError::Client(client_error) => render_client_error(client_error),
    }
}

fn render_client_error(error: &SeclaiError) -> String {
    match error {
        SeclaiError::ApiValidation {
            status,
            url,
            body,
            detail,
            ..
        } => {
            let mut report = format!("APIValidationError: {error}\n");
            report.push_str(&format!("status: {status}\n"));
            report.push_str(&format!("url: {url}\n"));
            if let Some(body) = body {
                report.push_str(&format!("response: {body}\n"));
            }
            let pretty =
                serde_json::to_string_pretty(detail).unwrap_or_else(|_| detail.to_string());
            report.push_str(&format!("validationError: {pretty}\n"));
            report
        }
        SeclaiError::ApiStatus {
            status, url, body, ..
        } => {
            let mut report = format!("APIStatusError: {error}\n");
            report.push_str(&format!("status: {status}\n"));
            report.push_str(&format!("url: {url}\n"));
            if let Some(body) = body {
                report.push_str(&format!("response: {body}\n"));
            }
            report
        }
        SeclaiError::MissingApiKey => {
            "ConfigurationError: missing API key: pass --api-key or set SECLAI_API_KEY\n"
                .to_string()
        }
        SeclaiError::Config(message) => format!("ConfigurationError: {message}\n"),
        other => format!("Error: {other}\n"),
    }
}
