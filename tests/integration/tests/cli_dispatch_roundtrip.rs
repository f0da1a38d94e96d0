use clap::error::ErrorKind;
use clap::Parser;
use httpmock::prelude::*;
use seclai_cli::{run_cli, Cli, CliRuntime, MemoryRuntime};
use serde_json::json;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("arguments should parse")
}

async fn dispatch(args: &[&str], api_base: &str) -> MemoryRuntime {
    let runtime = MemoryRuntime::new();
    run_cli(&parse(args), api_base, &runtime).await;
    runtime
}

#[tokio::test]
async fn source_listing_prints_the_response_as_pretty_json() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1/sources").query_param("page", "2");
        then.status(200)
            .json_body(json!({ "page": 2, "sources": [{ "id": "sc_1" }] }));
    });

    let runtime = dispatch(
        &["seclai", "sources", "list", "--page", "2", "--api-key", "k"],
        &server.base_url(),
    )
    .await;

    mock.assert();
    assert_eq!(runtime.exit_code(), 0);
    assert_eq!(runtime.err(), "");
    let printed = runtime.out();
    assert!(printed.ends_with('\n'));
    let parsed: serde_json::Value =
        serde_json::from_str(&printed).expect("printed output should parse back");
    assert_eq!(parsed, json!({ "page": 2, "sources": [{ "id": "sc_1" }] }));
}

#[tokio::test]
async fn blank_api_key_fails_before_any_request_is_made() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1/sources");
        then.status(200).json_body(json!({ "sources": [] }));
    });

    let runtime = dispatch(
        &["seclai", "sources", "list", "--api-key", ""],
        &server.base_url(),
    )
    .await;

    mock.assert_calls(0);
    assert_eq!(runtime.exit_code(), 1);
    assert_eq!(runtime.out(), "");
    assert_eq!(
        runtime.err(),
        "ConfigurationError: missing API key: pass --api-key or set SECLAI_API_KEY\n"
    );
}

#[tokio::test]
async fn conflicting_body_flags_fail_without_contacting_the_api() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/agents/ag_1/runs");
        then.status(200).json_body(json!({ "run": { "id": "r_1" } }));
    });

    let runtime = dispatch(
        &[
            "seclai", "agents", "run", "ag_1", "--json", "{}", "--json-file", "body.json",
            "--api-key", "k",
        ],
        &server.base_url(),
    )
    .await;

    mock.assert_calls(0);
    assert_eq!(runtime.exit_code(), 1);
    assert_eq!(runtime.out(), "");
    assert_eq!(
        runtime.err(),
        "InputError: --json and --json-file are mutually exclusive\n"
    );
}

#[tokio::test]
async fn singular_aliases_dispatch_identically() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1/sources");
        then.status(200).json_body(json!({ "sources": [] }));
    });

    let plural = dispatch(
        &["seclai", "sources", "list", "--api-key", "k"],
        &server.base_url(),
    )
    .await;
    let singular = dispatch(
        &["seclai", "source", "list", "--api-key", "k"],
        &server.base_url(),
    )
    .await;

    mock.assert_calls(2);
    assert_eq!(plural.out(), singular.out());
    assert_eq!(plural.exit_code(), 0);
    assert_eq!(singular.exit_code(), 0);
}

#[tokio::test]
async fn group_without_a_leaf_prints_help_and_exits_zero() {
    let runtime = dispatch(&["seclai", "agents"], "http://127.0.0.1:9").await;

    assert_eq!(runtime.exit_code(), 0);
    assert_eq!(runtime.err(), "");
    let help = runtime.out();
    assert!(help.contains("Usage:"));
    assert!(help.contains("run"));
    assert!(help.contains("runs"));
}

#[tokio::test]
async fn nested_group_without_a_leaf_prints_its_own_help() {
    let runtime = dispatch(&["seclai", "agents", "runs"], "http://127.0.0.1:9").await;

    assert_eq!(runtime.exit_code(), 0);
    assert_eq!(runtime.err(), "");
    let help = runtime.out();
    assert!(help.contains("Usage:"));
    assert!(help.contains("list"));
    assert!(help.contains("delete"));
}

#[tokio::test]
async fn unauthorized_responses_render_status_and_url() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1/sources");
        then.status(401).json_body(json!({ "error": "invalid API key" }));
    });

    let runtime = dispatch(
        &["seclai", "sources", "list", "--api-key", "bad-key"],
        &server.base_url(),
    )
    .await;

    mock.assert();
    assert_eq!(runtime.exit_code(), 1);
    assert_eq!(runtime.out(), "");
    let report = runtime.err();
    assert!(report.starts_with("APIStatusError: "));
    assert!(report.contains("\nstatus: 401\n"));
    assert!(report.contains(&format!("url: {}/v1/sources\n", server.base_url())));
    assert!(report.contains("invalid API key"));
}

#[tokio::test]
async fn stdin_marker_reads_the_body_through_the_runtime() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/agents/ag_9/runs")
            .json_body_includes(json!({ "input": "from stdin" }).to_string());
        then.status(200).json_body(json!({ "run": { "id": "r_9" } }));
    });

    let runtime = MemoryRuntime::with_input("{\"input\":\"from stdin\"}");
    run_cli(
        &parse(&["seclai", "agents", "run", "ag_9", "--json", "-", "--api-key", "k"]),
        &server.base_url(),
        &runtime,
    )
    .await;

    mock.assert();
    assert_eq!(runtime.exit_code(), 0);
    let parsed: serde_json::Value =
        serde_json::from_str(&runtime.out()).expect("printed output should parse back");
    assert_eq!(parsed, json!({ "run": { "id": "r_9" } }));
}

#[tokio::test]
async fn streaming_run_prints_only_the_final_result() {
    let server = MockServer::start();
    let body = concat!(
        "data: {\"type\":\"run.started\",\"run\":{\"id\":\"r_5\",\"status\":\"running\"}}\n\n",
        "data: {\"type\":\"run.step.completed\",\"step\":{\"id\":\"s_1\"}}\n\n",
        "data: {\"type\":\"run.completed\",\"run\":{\"id\":\"r_5\",\"status\":\"completed\",\"output\":\"done\"}}\n\n",
        "data: [DONE]\n\n"
    );
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/agents/ag_5/runs/stream");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(body);
    });

    let runtime = dispatch(
        &[
            "seclai", "agents", "run", "ag_5", "--stream", "--json", "{\"input\":\"hi\"}",
            "--api-key", "k",
        ],
        &server.base_url(),
    )
    .await;

    mock.assert();
    assert_eq!(runtime.exit_code(), 0);
    assert_eq!(runtime.err(), "");
    let parsed: serde_json::Value =
        serde_json::from_str(&runtime.out()).expect("printed output should parse back");
    assert_eq!(
        parsed,
        json!({ "id": "r_5", "status": "completed", "output": "done" })
    );
}

#[tokio::test]
async fn run_listing_sends_the_supplied_page_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/agents/ag_7/runs")
            .query_param("page", "3")
            .query_param("limit", "2");
        then.status(200)
            .json_body(json!({ "page": 3, "runs": [{ "id": "r_7" }] }));
    });

    let runtime = dispatch(
        &[
            "seclai", "agents", "runs", "list", "ag_7", "--page", "3", "--limit", "2",
            "--api-key", "k",
        ],
        &server.base_url(),
    )
    .await;

    mock.assert();
    assert_eq!(runtime.exit_code(), 0);
    assert_eq!(runtime.err(), "");
    let parsed: serde_json::Value =
        serde_json::from_str(&runtime.out()).expect("printed output should parse back");
    assert_eq!(parsed, json!({ "page": 3, "runs": [{ "id": "r_7" }] }));
}

#[tokio::test]
async fn scoped_run_lookup_uses_the_agent_route() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1/agents/ag_1/runs/r_1");
        then.status(200).json_body(json!({ "run": { "id": "r_1" } }));
    });

    let runtime = dispatch(
        &["seclai", "agents", "runs", "get", "ag_1", "r_1", "--api-key", "k"],
        &server.base_url(),
    )
    .await;

    mock.assert();
    assert_eq!(runtime.exit_code(), 0);
}

#[tokio::test]
async fn direct_run_lookup_passes_the_step_output_flag() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/runs/r_2")
            .query_param("include_step_outputs", "true");
        then.status(200)
            .json_body(json!({ "run": { "id": "r_2", "steps": [] } }));
    });

    let runtime = dispatch(
        &[
            "seclai", "runs", "get", "r_2", "--include-step-outputs", "--api-key", "k",
        ],
        &server.base_url(),
    )
    .await;

    mock.assert();
    assert_eq!(runtime.exit_code(), 0);
}

#[tokio::test]
async fn deleting_a_run_prints_the_acknowledgment() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/v1/runs/r_3");
        then.status(204);
    });

    let runtime = dispatch(
        &["seclai", "runs", "delete", "r_3", "--api-key", "k"],
        &server.base_url(),
    )
    .await;

    mock.assert();
    assert_eq!(runtime.exit_code(), 0);
    assert_eq!(runtime.out(), "{\n  \"ok\": true\n}\n");
}

#[tokio::test]
async fn version_flag_reports_the_tool_version() {
    let error =
        Cli::try_parse_from(["seclai", "--version"]).expect_err("version should stop parsing");

    assert_eq!(error.kind(), ErrorKind::DisplayVersion);
    assert_eq!(error.exit_code(), 0);
    assert_eq!(error.to_string(), "seclai 0.1.0\n");
}
