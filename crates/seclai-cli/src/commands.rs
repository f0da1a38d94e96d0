use std::path::Path;

use clap::CommandFactory;
use serde_json::{json, Value};
use tracing::warn;

use seclai_client::{
    ContentRangeQuery, FileUpload, PageQuery, RunDetailQuery, SeclaiClient, SeclaiConfig,
    SourceListQuery,
};

use crate::cli_args::{
    AgentCommands, AgentRunCommands, Cli, Commands, ContentCommands, RunCommands, SourceCommands,
};
use crate::error_report::{report_error, CliError};
use crate::request_input::{read_upload_bytes, resolve_json_body};
use crate::runtime::CliRuntime;

/// Executes one parsed invocation against `api_base`, leaving all output
/// and the final exit code on the runtime bundle.
pub async fn run_cli(cli: &Cli, api_base: &str, runtime: &dyn CliRuntime) {
    if let Err(error) = dispatch(cli, api_base, runtime).await {
        report_error(runtime, &error);
    }
}

async fn dispatch(cli: &Cli, api_base: &str, runtime: &dyn CliRuntime) -> Result<(), CliError> {
    match &cli.command {
        Commands::Sources { command } => match command {
            None => print_group_help(runtime, &["sources"]),
            Some(SourceCommands::List {
                page,
                limit,
                sort,
                order,
                account_id,
            }) => {
                let client = build_client(cli, api_base)?;
                let query = SourceListQuery {
                    page: *page,
                    limit: *limit,
                    sort: sort.clone(),
                    order: order.clone(),
                    account_id: account_id.clone(),
                };
                print_json(runtime, &client.list_sources(&query).await?)
            }
            Some(SourceCommands::Upload {
                source_connection_id,
                file,
                title,
                file_name,
                mime_type,
            }) => {
                let client = build_client(cli, api_base)?;
                let upload = build_file_upload(file, title, file_name, mime_type, None).await?;
                print_json(
                    runtime,
                    &client
                        .upload_file_to_source(source_connection_id, upload)
                        .await?,
                )
            }
        },
        Commands::Agents { command } => match command {
            None => print_group_help(runtime, &["agents"]),
            Some(AgentCommands::Run {
                agent_id,
                json,
                json_file,
                stream,
                timeout_ms,
            }) => {
                // Body resolution comes first so a conflicting --json/--json-file
                // pair fails before any client exists.
                let payload = resolve_json_body(runtime, json.as_deref(), json_file.as_deref())
                    .await?;
                let client = build_client(cli, api_base)?;
                let result = if *stream {
                    let Some(streaming) = client.streaming() else {
                        return Err(CliError::input(
                            "this client does not support streaming agent runs",
                        ));
                    };
                    streaming
                        .run_streaming_agent_and_wait(agent_id, &payload, *timeout_ms)
                        .await?
                } else {
                    if timeout_ms.is_some() {
                        warn!("--timeout-ms only applies to --stream runs and was ignored");
                    }
                    client.run_agent(agent_id, &payload).await?
                };
                print_json(runtime, &result)
            }
            Some(AgentCommands::Runs { command }) => match command {
                None => print_group_help(runtime, &["agents", "runs"]),
                Some(AgentRunCommands::List {
                    agent_id,
                    page,
                    limit,
                }) => {
                    let client = build_client(cli, api_base)?;
                    let query = PageQuery {
                        page: *page,
                        limit: *limit,
                    };
                    print_json(runtime, &client.list_agent_runs(agent_id, &query).await?)
                }
                Some(AgentRunCommands::Get { agent_id, run_id }) => {
                    let client = build_client(cli, api_base)?;
                    print_json(
                        runtime,
                        &client
                            .get_agent_run(run_id, Some(agent_id), &RunDetailQuery::default())
                            .await?,
                    )
                }
                Some(AgentRunCommands::Delete { agent_id, run_id }) => {
                    let client = build_client(cli, api_base)?;
                    client.delete_agent_run(run_id, Some(agent_id)).await?;
                    print_delete_ack(runtime)
                }
            },
        },
        Commands::Runs { command } => match command {
            None => print_group_help(runtime, &["runs"]),
            Some(RunCommands::Get {
                run_id,
                include_step_outputs,
            }) => {
                let client = build_client(cli, api_base)?;
                let query = RunDetailQuery {
                    include_step_outputs: include_step_outputs.then_some(true),
                };
                print_json(runtime, &client.get_agent_run(run_id, None, &query).await?)
            }
            Some(RunCommands::Delete { run_id }) => {
                let client = build_client(cli, api_base)?;
                client.delete_agent_run(run_id, None).await?;
                print_delete_ack(runtime)
            }
        },
        Commands::Contents { command } => match command {
            None => print_group_help(runtime, &["contents"]),
            Some(ContentCommands::Get {
                content_version_id,
                start,
                end,
            }) => {
                let client = build_client(cli, api_base)?;
                let query = ContentRangeQuery {
                    start: *start,
                    end: *end,
                };
                print_json(
                    runtime,
                    &client.get_content_detail(content_version_id, &query).await?,
                )
            }
            Some(ContentCommands::Delete { content_version_id }) => {
                let client = build_client(cli, api_base)?;
                client.delete_content(content_version_id).await?;
                print_delete_ack(runtime)
            }
            Some(ContentCommands::Embeddings {
                content_version_id,
                page,
                limit,
            }) => {
                let client = build_client(cli, api_base)?;
                let query = PageQuery {
                    page: *page,
                    limit: *limit,
                };
                print_json(
                    runtime,
                    &client
                        .list_content_embeddings(content_version_id, &query)
                        .await?,
                )
            }
            Some(ContentCommands::Upload {
                file,
                title,
                file_name,
                mime_type,
                metadata,
            }) => {
                let client = build_client(cli, api_base)?;
                let upload =
                    build_file_upload(file, title, file_name, mime_type, metadata.as_deref())
                        .await?;
                print_json(runtime, &client.upload_file_to_content(upload).await?)
            }
        },
    }
}

fn build_client(cli: &Cli, api_base: &str) -> Result<SeclaiClient, CliError> {
    let api_key = cli.api_key.clone().unwrap_or_default();
    Ok(SeclaiClient::new(SeclaiConfig::new(api_base, api_key))?)
}

async fn build_file_upload(
    file: &Path,
    title: &Option<String>,
    file_name: &Option<String>,
    mime_type: &Option<String>,
    metadata: Option<&str>,
) -> Result<FileUpload, CliError> {
    let bytes = read_upload_bytes(file).await?;
    let file_name = file_name
        .clone()
        .or_else(|| file.file_name().map(|name| name.to_string_lossy().into_owned()));
    let metadata = match metadata {
        Some(raw) => Some(parse_metadata(raw)?),
        None => None,
    };

    Ok(FileUpload {
        bytes,
        file_name,
        mime_type: mime_type.clone(),
        title: title.clone(),
        metadata,
    })
}

fn parse_metadata(raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw)
        .map_err(|error| CliError::input(format!("--metadata is not valid JSON: {error}")))
}

fn print_json(runtime: &dyn CliRuntime, value: &Value) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|error| CliError::Other(error.to_string()))?;
    runtime.write_out(&format!("{rendered}\n"));
    Ok(())
}

fn print_delete_ack(runtime: &dyn CliRuntime) -> Result<(), CliError> {
    print_json(runtime, &json!({ "ok": true }))
}

/// Renders a group's usage help to the output sink. Selecting a namespace
/// without a leaf is not an error.
fn print_group_help(runtime: &dyn CliRuntime, path: &[&str]) -> Result<(), CliError> {
    let mut command = Cli::command();
    let mut node = &mut command;
    for name in path {
        node = node
            .find_subcommand_mut(name)
            .ok_or_else(|| CliError::Other(format!("unknown command group: {name}")))?;
    }

    let help = node.render_help();
    runtime.write_out(&help.to_string());
    Ok(())
}
