use std::path::PathBuf;

use tracing::debug;

use super::traits::OllamaRuntime;

/// Check if Ollama is installed on the system
pub fn is_installed() -> bool {
    which::which("ollama").is_ok()
}

/// Path to the `ollama` binary, if on PATH
pub fn binary_path() -> Option<PathBuf> {
    which::which("ollama").ok()
}

/// Check whether the runtime answers API requests
pub async fn is_server_running(runtime: &dyn OllamaRuntime) -> bool {
    match runtime.version().await {
        Ok(version) => {
            debug!("Ollama {} is reachable", version);
            true
        }
        Err(e) => {
            debug!("Ollama is not reachable: {:#}", e);
            false
        }
    }
}
