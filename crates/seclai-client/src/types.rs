use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Base URL used when `SECLAI_API_URL` is not set.
pub const DEFAULT_API_BASE: &str = "https://api.seclai.com";

/// Timeout applied to each unary request. Streaming waits are unbounded
/// unless the caller supplies one.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
/// Public struct `SeclaiConfig` used across Seclai components.
pub struct SeclaiConfig {
    pub api_base: String,
    pub api_key: String,
    pub request_timeout_ms: u64,
}

impl SeclaiConfig {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
/// Public struct `SourceListQuery` used across Seclai components.
///
/// Only fields the caller actually set are serialized, so the service
/// applies its own defaults for the rest.
pub struct SourceListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
/// Public struct `PageQuery` used across Seclai components.
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
/// Public struct `RunDetailQuery` used across Seclai components.
pub struct RunDetailQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_step_outputs: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
/// Public struct `ContentRangeQuery` used across Seclai components.
pub struct ContentRangeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

#[derive(Debug, Clone, Default)]
/// Public struct `FileUpload` used across Seclai components.
///
/// Owns the raw bytes for one in-flight upload. `file_name`, `mime_type`,
/// `title`, and `metadata` ride along as multipart fields when set.
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub title: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Error)]
/// Enumerates supported `SeclaiError` values.
pub enum SeclaiError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("{0}")]
    Config(String),
    #[error("the API rejected the request")]
    ApiStatus {
        status: u16,
        method: String,
        url: String,
        body: Option<String>,
    },
    #[error("the API rejected the request as invalid")]
    ApiValidation {
        status: u16,
        method: String,
        url: String,
        body: Option<String>,
        detail: Value,
    },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("streaming run did not finish within {timeout_ms}ms")]
    StreamTimeout { timeout_ms: u64 },
}

#[async_trait]
/// Trait contract for `StreamingRunClient` behavior.
///
/// Implemented by client builds that can follow an agent run's event stream
/// to completion. Callers obtain it through `SeclaiClient::streaming` and
/// treat a `None` there as the operation being unsupported.
pub trait StreamingRunClient: Send + Sync {
    async fn run_streaming_agent_and_wait(
        &self,
        agent_id: &str,
        payload: &Value,
        timeout_ms: Option<u64>,
    ) -> Result<Value, SeclaiError>;
}
