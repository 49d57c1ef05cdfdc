/// Ollama integration module - Gateway
mod client;
mod detector;
mod guide;
mod installer;
mod server;
mod traits;
mod types;

pub use client::OllamaClient;
pub use detector::{binary_path, is_installed, is_server_running};
pub use guide::detect_and_guide;
pub use installer::{ensure_model, is_cached, Availability};
pub use server::{ensure_server, start_server};
pub use traits::{OllamaRuntime, PullStream};
pub use types::{
    short_digest, ChatMessage, ChatRequest, ChatResponse, InventoryEntry, MessageRole, PullEvent,
};

#[cfg(test)]
pub(crate) use traits::MockOllamaRuntime;
