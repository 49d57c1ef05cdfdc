use anyhow::{Context, Result};
use futures::StreamExt;
use tracing::{debug, info};

use super::traits::OllamaRuntime;
use super::types::InventoryEntry;
use crate::progress::{ProgressDisplay, PullProgressTracker};

/// How `ensure_model` satisfied the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Already in the local inventory; nothing was downloaded
    Cached,
    /// Pulled during this call
    Downloaded,
}

/// Whether the inventory holds a model with exactly this tag
pub fn is_cached(inventory: &[InventoryEntry], model_name: &str) -> bool {
    inventory.iter().any(|m| m.name == model_name)
}

/// Ensure a model is stored locally, pulling it with progress if needed
pub async fn ensure_model(
    runtime: &dyn OllamaRuntime,
    display: &mut dyn ProgressDisplay,
    model_name: &str,
) -> Result<Availability> {
    let inventory = runtime
        .list()
        .await
        .context("Failed to list local Ollama models")?;
    debug!("Local inventory: {:?}", inventory);

    if is_cached(&inventory, model_name) {
        info!("Model {} is cached", model_name);
        display.status("Model Cached - Using Cached Version...");
        return Ok(Availability::Cached);
    }

    info!("Model {} is not cached, pulling", model_name);
    display.status("Model Uncached - Downloading...");

    let mut events = runtime
        .pull(model_name)
        .await
        .with_context(|| format!("Failed to start pulling {}", model_name))?;

    {
        let mut tracker = PullProgressTracker::new(display);
        while let Some(event) = events.next().await {
            let event = event.with_context(|| format!("Failed while pulling {}", model_name))?;
            tracker.handle(&event);
        }
        debug!(
            "Pull of {} finished: {} layers, {} finalized",
            model_name,
            tracker.indicator_count(),
            tracker.finalized()
        );
    }

    display.status("Download Complete.");
    Ok(Availability::Downloaded)
}
