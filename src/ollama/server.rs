use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::info;

use super::detector::{binary_path, is_server_running};
use super::guide::{detect_and_guide, server_start_hint};
use super::traits::OllamaRuntime;
use crate::app::OllamaConfig;
use crate::constants::{SERVER_MAX_STARTUP_ATTEMPTS, SERVER_STARTUP_WAIT_MS};

/// Start `ollama serve` with our storage directory and keep-alive
pub async fn start_server(config: &OllamaConfig, runtime: &dyn OllamaRuntime) -> Result<()> {
    let Some(binary) = binary_path() else {
        detect_and_guide();
        anyhow::bail!("Ollama is not installed");
    };

    std::fs::create_dir_all(&config.models_dir).with_context(|| {
        format!(
            "Failed to create models directory {}",
            config.models_dir.display()
        )
    })?;

    println!("[STARTING] Launching ollama serve on {}...", config.bind_address());
    info!(
        "Spawning {} (models: {}, keep-alive: {})",
        binary.display(),
        config.models_dir.display(),
        config.keep_alive
    );

    Command::new(binary)
        .arg("serve")
        .env("OLLAMA_HOST", config.bind_address())
        .env("OLLAMA_MODELS", &config.models_dir)
        .env("OLLAMA_KEEP_ALIVE", &config.keep_alive)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to spawn ollama serve")?;

    for _ in 0..SERVER_MAX_STARTUP_ATTEMPTS {
        tokio::time::sleep(Duration::from_millis(SERVER_STARTUP_WAIT_MS)).await;
        if is_server_running(runtime).await {
            println!("[OK] Ollama server is ready");
            return Ok(());
        }
    }

    anyhow::bail!(
        "Ollama server did not become ready at {}",
        config.base_url()
    )
}

/// Ensure an Ollama server is reachable, starting one if allowed
pub async fn ensure_server(
    config: &OllamaConfig,
    runtime: &dyn OllamaRuntime,
    auto_start: bool,
) -> Result<()> {
    if is_server_running(runtime).await {
        return Ok(());
    }

    if !auto_start {
        server_start_hint(&config.base_url());
        anyhow::bail!("Ollama is not reachable at {}", config.base_url());
    }

    start_server(config, runtime).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ollama::MockOllamaRuntime;

    #[tokio::test]
    async fn test_running_server_is_left_alone() {
        let mut runtime = MockOllamaRuntime::new();
        runtime
            .expect_version()
            .times(1)
            .returning(|| Ok("0.1.32".to_string()));

        ensure_server(&OllamaConfig::default(), &runtime, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_without_auto_start_fails() {
        let mut runtime = MockOllamaRuntime::new();
        runtime
            .expect_version()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("connection refused")));

        let err = ensure_server(&OllamaConfig::default(), &runtime, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not reachable"));
    }
}
