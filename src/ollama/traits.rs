use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;

use super::types::{ChatRequest, ChatResponse, InventoryEntry, PullEvent};

/// Progress events of one pull, in arrival order
pub type PullStream = Pin<Box<dyn Stream<Item = Result<PullEvent>> + Send>>;

/// The operations we need from a local Ollama runtime
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OllamaRuntime: Send + Sync {
    /// Models currently stored by the runtime
    async fn list(&self) -> Result<Vec<InventoryEntry>>;

    /// Start downloading a model; the stream ends when the pull finishes
    async fn pull(&self, model: &str) -> Result<PullStream>;

    /// Run one non-streaming chat completion
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Runtime version, also used as a reachability probe
    async fn version(&self) -> Result<String>;
}
