use anyhow::{Context, Result};
use tracing::info;

use crate::constants::CHAT_RESPONSE_FORMAT;
use crate::ollama::{ensure_model, ChatMessage, ChatRequest, OllamaRuntime};
use crate::progress::ProgressDisplay;

/// Make sure the model is local, then send one chat and return the reply
///
/// The request is non-streaming and asks the runtime for JSON output, so
/// the returned string is the model's JSON document as text.
pub async fn chat(
    runtime: &dyn OllamaRuntime,
    display: &mut dyn ProgressDisplay,
    model_name: &str,
    messages: Vec<ChatMessage>,
) -> Result<String> {
    ensure_model(runtime, display, model_name).await?;

    let request = ChatRequest::new(model_name, messages).with_format(CHAT_RESPONSE_FORMAT);
    let response = runtime
        .chat(request)
        .await
        .with_context(|| format!("Chat request to {} failed", model_name))?;

    info!(
        "{} replied ({} chars, {} eval tokens)",
        model_name,
        response.message.content.len(),
        response.eval_count.unwrap_or(0)
    );
    Ok(response.message.content)
}
