use std::path::PathBuf;

use clap::{Parser, Subcommand};

fn parse_positive_u32(value: &str) -> Result<u32, String> {
    let parsed = value
        .parse::<u32>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "seclai",
    about = "Command-line client for the Seclai content and agent platform",
    version
)]
/// Public struct `Cli` used across Seclai components.
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "SECLAI_API_KEY",
        hide_env_values = true,
        help = "API key used to authenticate against the Seclai API"
    )]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, PartialEq)]
/// Enumerates supported `Commands` values.
pub enum Commands {
    /// Inspect source connections and feed files into them
    #[command(alias = "source")]
    Sources {
        #[command(subcommand)]
        command: Option<SourceCommands>,
    },
    /// Start agent runs and manage them per agent
    #[command(alias = "agent")]
    Agents {
        #[command(subcommand)]
        command: Option<AgentCommands>,
    },
    /// Address agent runs directly by run id
    #[command(alias = "run")]
    Runs {
        #[command(subcommand)]
        command: Option<RunCommands>,
    },
    /// Work with content versions
    #[command(alias = "content")]
    Contents {
        #[command(subcommand)]
        command: Option<ContentCommands>,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
/// Enumerates supported `SourceCommands` values.
pub enum SourceCommands {
    /// List source connections visible to the API key
    List {
        #[arg(long, value_parser = parse_positive_u32, help = "Page number to fetch (1-based)")]
        page: Option<u32>,
        #[arg(long, value_parser = parse_positive_u32, help = "Maximum entries per page")]
        limit: Option<u32>,
        #[arg(long, help = "Field to sort the listing by")]
        sort: Option<String>,
        #[arg(long, value_parser = ["asc", "desc"], help = "Sort direction")]
        order: Option<String>,
        #[arg(long = "account-id", help = "Restrict the listing to one account")]
        account_id: Option<String>,
    },
    /// Upload a local file into a source connection
    Upload {
        #[arg(help = "Source connection receiving the file")]
        source_connection_id: String,
        #[arg(long, help = "Path of the local file to upload")]
        file: PathBuf,
        #[arg(long, help = "Display title stored with the file")]
        title: Option<String>,
        #[arg(long = "file-name", help = "Override the uploaded file name")]
        file_name: Option<String>,
        #[arg(long = "mime-type", help = "MIME type recorded for the file")]
        mime_type: Option<String>,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
/// Enumerates supported `AgentCommands` values.
pub enum AgentCommands {
    /// Start an agent run from a JSON request body
    Run {
        #[arg(help = "Agent to run")]
        agent_id: String,
        #[arg(long, help = "Inline JSON request body, or '-' to read it from stdin")]
        json: Option<String>,
        #[arg(
            long = "json-file",
            help = "Path of a file holding the JSON request body, or '-' for stdin"
        )]
        json_file: Option<String>,
        #[arg(
            long,
            help = "Follow the run's event stream and print only the final result"
        )]
        stream: bool,
        #[arg(
            long = "timeout-ms",
            value_parser = parse_positive_u64,
            help = "Client-side wait deadline for --stream, in milliseconds"
        )]
        timeout_ms: Option<u64>,
    },
    /// Manage runs belonging to an agent
    Runs {
        #[command(subcommand)]
        command: Option<AgentRunCommands>,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
/// Enumerates supported `AgentRunCommands` values.
pub enum AgentRunCommands {
    /// List runs started for an agent
    List {
        #[arg(help = "Agent whose runs to list")]
        agent_id: String,
        #[arg(long, value_parser = parse_positive_u32, help = "Page number to fetch (1-based)")]
        page: Option<u32>,
        #[arg(long, value_parser = parse_positive_u32, help = "Maximum entries per page")]
        limit: Option<u32>,
    },
    /// Fetch one run of an agent
    Get {
        #[arg(help = "Agent owning the run")]
        agent_id: String,
        #[arg(help = "Run to fetch")]
        run_id: String,
    },
    /// Delete one run of an agent
    Delete {
        #[arg(help = "Agent owning the run")]
        agent_id: String,
        #[arg(help = "Run to delete")]
        run_id: String,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
/// Enumerates supported `RunCommands` values.
pub enum RunCommands {
    /// Fetch a run by id
    Get {
        #[arg(help = "Run to fetch")]
        run_id: String,
        #[arg(
            long = "include-step-outputs",
            help = "Include each step's outputs in the result"
        )]
        include_step_outputs: bool,
    },
    /// Delete a run by id
    Delete {
        #[arg(help = "Run to delete")]
        run_id: String,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
/// Enumerates supported `ContentCommands` values.
pub enum ContentCommands {
    /// Fetch a content version
    Get {
        #[arg(help = "Content version to fetch")]
        content_version_id: String,
        #[arg(long, help = "Start offset of the content window")]
        start: Option<u64>,
        #[arg(long, help = "End offset of the content window")]
        end: Option<u64>,
    },
    /// Delete a content version
    Delete {
        #[arg(help = "Content version to delete")]
        content_version_id: String,
    },
    /// List embeddings computed for a content version
    Embeddings {
        #[arg(help = "Content version whose embeddings to list")]
        content_version_id: String,
        #[arg(long, value_parser = parse_positive_u32, help = "Page number to fetch (1-based)")]
        page: Option<u32>,
        #[arg(long, value_parser = parse_positive_u32, help = "Maximum entries per page")]
        limit: Option<u32>,
    },
    /// Upload a local file as a new content version
    Upload {
        #[arg(long, help = "Path of the local file to upload")]
        file: PathBuf,
        #[arg(long, help = "Display title stored with the content")]
        title: Option<String>,
        #[arg(long = "file-name", help = "Override the uploaded file name")]
        file_name: Option<String>,
        #[arg(long = "mime-type", help = "MIME type recorded for the file")]
        mime_type: Option<String>,
        #[arg(long, help = "Structured metadata JSON attached to the upload")]
        metadata: Option<String>,
    },
}
