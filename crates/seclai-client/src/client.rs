use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tokio::time::timeout;

use crate::{
    ContentRangeQuery, FileUpload, PageQuery, RunDetailQuery, SeclaiConfig, SeclaiError,
    SourceListQuery, StreamingRunClient,
};

#[derive(Debug, Clone)]
/// Public struct `SeclaiClient` used across Seclai components.
///
/// One instance is bound to one API key and base URL for its whole life.
/// Every operation issues exactly one HTTP request and never retries;
/// re-invocation is the caller's decision.
pub struct SeclaiClient {
    client: reqwest::Client,
    config: SeclaiConfig,
}

impl SeclaiClient {
    pub fn new(config: SeclaiConfig) -> Result<Self, SeclaiError> {
        if config.api_key.trim().is_empty() {
            return Err(SeclaiError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|e| SeclaiError::Config(format!("invalid API key header: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Streaming-run support for this client build. `None` means the
    /// transport cannot follow run event streams.
    pub fn streaming(&self) -> Option<&dyn StreamingRunClient> {
        Some(self)
    }

    pub async fn list_sources(&self, query: &SourceListQuery) -> Result<Value, SeclaiError> {
        let request = self
            .client
            .get(self.endpoint_url("/v1/sources"))
            .query(query)
            .timeout(self.request_timeout());
        self.send_expect_json(request).await
    }

    /// Uploads a file into an existing source connection. The byte buffer is
    /// consumed by the in-flight request.
    pub async fn upload_file_to_source(
        &self,
        source_connection_id: &str,
        upload: FileUpload,
    ) -> Result<Value, SeclaiError> {
        let url = self.endpoint_url(&format!("/v1/sources/{source_connection_id}/files"));
        let form = build_upload_form(upload)?;
        let request = self
            .client
            .post(url)
            .multipart(form)
            .timeout(self.request_timeout());
        self.send_expect_json(request).await
    }

    /// Uploads a standalone file as a new content version.
    pub async fn upload_file_to_content(&self, upload: FileUpload) -> Result<Value, SeclaiError> {
        let url = self.endpoint_url("/v1/contents/files");
        let form = build_upload_form(upload)?;
        let request = self
            .client
            .post(url)
            .multipart(form)
            .timeout(self.request_timeout());
        self.send_expect_json(request).await
    }

    pub async fn run_agent(&self, agent_id: &str, payload: &Value) -> Result<Value, SeclaiError> {
        let url = self.endpoint_url(&format!("/v1/agents/{agent_id}/runs"));
        let request = self
            .client
            .post(url)
            .json(payload)
            .timeout(self.request_timeout());
        self.send_expect_json(request).await
    }

    pub async fn list_agent_runs(
        &self,
        agent_id: &str,
        query: &PageQuery,
    ) -> Result<Value, SeclaiError> {
        let url = self.endpoint_url(&format!("/v1/agents/{agent_id}/runs"));
        let request = self
            .client
            .get(url)
            .query(query)
            .timeout(self.request_timeout());
        self.send_expect_json(request).await
    }

    pub async fn get_agent_run(
        &self,
        run_id: &str,
        agent_id: Option<&str>,
        query: &RunDetailQuery,
    ) -> Result<Value, SeclaiError> {
        let request = self
            .client
            .get(self.run_url(run_id, agent_id))
            .query(query)
            .timeout(self.request_timeout());
        self.send_expect_json(request).await
    }

    pub async fn delete_agent_run(
        &self,
        run_id: &str,
        agent_id: Option<&str>,
    ) -> Result<(), SeclaiError> {
        let request = self
            .client
            .delete(self.run_url(run_id, agent_id))
            .timeout(self.request_timeout());
        self.send_expect_empty(request).await
    }

    pub async fn get_content_detail(
        &self,
        content_version_id: &str,
        query: &ContentRangeQuery,
    ) -> Result<Value, SeclaiError> {
        let url = self.endpoint_url(&format!("/v1/contents/{content_version_id}"));
        let request = self
            .client
            .get(url)
            .query(query)
            .timeout(self.request_timeout());
        self.send_expect_json(request).await
    }

    pub async fn delete_content(&self, content_version_id: &str) -> Result<(), SeclaiError> {
        let url = self.endpoint_url(&format!("/v1/contents/{content_version_id}"));
        let request = self.client.delete(url).timeout(self.request_timeout());
        self.send_expect_empty(request).await
    }

    pub async fn list_content_embeddings(
        &self,
        content_version_id: &str,
        query: &PageQuery,
    ) -> Result<Value, SeclaiError> {
        let url = self.endpoint_url(&format!("/v1/contents/{content_version_id}/embeddings"));
        let request = self
            .client
            .get(url)
            .query(query)
            .timeout(self.request_timeout());
        self.send_expect_json(request).await
    }

    fn endpoint_url(&self, path: &str) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{base}{path}")
    }

    fn run_url(&self, run_id: &str, agent_id: Option<&str>) -> String {
        match agent_id {
            Some(agent_id) => self.endpoint_url(&format!("/v1/agents/{agent_id}/runs/{run_id}")),
            None => self.endpoint_url(&format!("/v1/runs/{run_id}")),
        }
    }

    fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.config.request_timeout_ms.max(1))
    }

    async fn send_expect_json(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, SeclaiError> {
        let response = self.execute_checked(request).await?;
        let raw = response.text().await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn send_expect_empty(&self, request: reqwest::RequestBuilder) -> Result<(), SeclaiError> {
        self.execute_checked(request).await?;
        Ok(())
    }

    async fn execute_checked(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, SeclaiError> {
        let request = request.build()?;
        let method = request.method().to_string();
        let url = request.url().to_string();

        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await?;
        Err(shape_status_error(&method, &url, status.as_u16(), &raw))
    }

    async fn run_stream_to_completion(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, SeclaiError> {
        let response = self.execute_checked(request).await?;
        parse_run_stream(response).await
    }
}

#[async_trait]
impl StreamingRunClient for SeclaiClient {
    async fn run_streaming_agent_and_wait(
        &self,
        agent_id: &str,
        payload: &Value,
        timeout_ms: Option<u64>,
    ) -> Result<Value, SeclaiError> {
        let url = self.endpoint_url(&format!("/v1/agents/{agent_id}/runs/stream"));
        let request = self
            .client
            .post(url)
            .header(ACCEPT, "text/event-stream")
            .json(payload);

        match timeout_ms {
            Some(timeout_ms) => {
                let deadline = std::time::Duration::from_millis(timeout_ms.max(1));
                match timeout(deadline, self.run_stream_to_completion(request)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(SeclaiError::StreamTimeout { timeout_ms }),
                }
            }
            None => self.run_stream_to_completion(request).await,
        }
    }
}

fn build_upload_form(upload: FileUpload) -> Result<Form, SeclaiError> {
    let mut part = Part::bytes(upload.bytes);
    if let Some(file_name) = upload.file_name {
        part = part.file_name(file_name);
    }
    if let Some(mime_type) = &upload.mime_type {
        part = part
            .mime_str(mime_type)
            .map_err(|e| SeclaiError::Config(format!("invalid MIME type {mime_type:?}: {e}")))?;
    }

    let mut form = Form::new().part("file", part);
    if let Some(title) = upload.title {
        form = form.text("title", title);
    }
    if let Some(metadata) = upload.metadata {
        form = form.text("metadata", metadata.to_string());
    }
    Ok(form)
}

fn shape_status_error(method: &str, url: &str, status: u16, raw: &str) -> SeclaiError {
    let body = if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    };

    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        if let Some(detail) = value.get("validationError") {
            if !detail.is_null() {
                return SeclaiError::ApiValidation {
                    status,
                    method: method.to_string(),
                    url: url.to_string(),
                    body,
                    detail: detail.clone(),
                };
            }
        }
    }

    SeclaiError::ApiStatus {
        status,
        method: method.to_string(),
        url: url.to_string(),
        body,
    }
}

async fn parse_run_stream(response: reqwest::Response) -> Result<Value, SeclaiError> {
    let mut stream = response.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let fragment = std::str::from_utf8(chunk.as_ref()).map_err(|error| {
            SeclaiError::InvalidResponse(format!("invalid UTF-8 in event stream: {error}"))
        })?;
        buffer.push_str(fragment);

        while let Some(pos) = buffer.find('\n') {
            let line = buffer[..pos].trim().to_string();
            buffer.drain(..=pos);
            if line.is_empty() {
                continue;
            }

            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if data == "[DONE]" {
                    return Err(stream_ended_early());
                }
                if let Some(outcome) = apply_run_event(data)? {
                    return Ok(outcome);
                }
            }
        }
    }

    let trailing = buffer.trim();
    if let Some(data) = trailing.strip_prefix("data:") {
        let data = data.trim();
        if data != "[DONE]" {
            if let Some(outcome) = apply_run_event(data)? {
                return Ok(outcome);
            }
        }
    }

    Err(stream_ended_early())
}

/// Interprets one event envelope. Terminal run events resolve the wait with
/// the run payload; an `error` envelope fails it; everything else is
/// progress and is skipped.
fn apply_run_event(data: &str) -> Result<Option<Value>, SeclaiError> {
    let envelope: Value = serde_json::from_str(data)?;
    let event_type = envelope
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match event_type.as_str() {
        "run.completed" | "run.failed" | "run.cancelled" => {
            let outcome = envelope.get("run").cloned().unwrap_or(envelope);
            Ok(Some(outcome))
        }
        "error" => {
            let detail = envelope.get("error").cloned().unwrap_or(envelope);
            Err(SeclaiError::InvalidResponse(format!(
                "event stream reported an error: {detail}"
            )))
        }
        _ => Ok(None),
    }
}

fn stream_ended_early() -> SeclaiError {
    SeclaiError::InvalidResponse("event stream ended before a terminal run event".to_string())
}
