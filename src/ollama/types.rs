use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One locally cached model as reported by `GET /api/tags`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Model tag (e.g. "llama3:latest")
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Size on disk in bytes
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl InventoryEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            size: None,
            digest: None,
            modified_at: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListResponse {
    #[serde(default)]
    pub models: Vec<InventoryEntry>,
}

/// A single progress message from a streaming pull
///
/// Events without a digest are plain status updates ("pulling manifest",
/// "verifying sha256 digest", "success"). Events with a digest describe
/// the transfer of one layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullEvent {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
}

impl PullEvent {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn layer(digest: impl Into<String>, total: Option<u64>, completed: Option<u64>) -> Self {
        let digest = digest.into();
        Self {
            status: format!("pulling {}", short_digest(&digest)),
            digest: Some(digest),
            total,
            completed,
        }
    }
}

/// Raw NDJSON line of a pull stream, which may carry an error instead
#[derive(Debug, Deserialize)]
pub(super) struct PullLine {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub event: PullEvent,
}

#[derive(Debug, Serialize)]
pub(super) struct PullRequest<'a> {
    pub model: &'a str,
    pub stream: bool,
}

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A chat message sent to or received from the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

impl ChatRequest {
    /// Non-streaming request; the whole reply comes back in one response
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            format: None,
            stream: false,
            keep_alive: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Response envelope of a non-streaming chat call
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: String,
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VersionResponse {
    pub version: String,
}

/// Short label for a layer digest: the first characters of the hash,
/// without the "sha256:" algorithm prefix
pub fn short_digest(digest: &str) -> &str {
    let hash = digest.split_once(':').map_or(digest, |(_, hash)| hash);
    match hash.char_indices().nth(crate::constants::DIGEST_LABEL_LEN) {
        Some((end, _)) => &hash[..end],
        None => hash,
    }
}
