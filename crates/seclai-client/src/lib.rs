//! Typed async client for the Seclai content/agent-management API.
mod client;
mod types;

pub use client::SeclaiClient;
pub use types::{
    ContentRangeQuery, FileUpload, PageQuery, RunDetailQuery, SeclaiConfig, SeclaiError,
    SourceListQuery, StreamingRunClient, DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT_MS,
};
