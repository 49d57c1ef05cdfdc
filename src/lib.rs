pub mod app;
pub mod chat;
pub mod cli;
pub mod constants;
pub mod ollama;
pub mod progress;
pub mod utils;

pub use app::{load_config, Config};
pub use chat::chat;
pub use ollama::{ensure_model, Availability, OllamaClient, OllamaRuntime};
pub use progress::{ProgressDisplay, TerminalDisplay};
pub use utils::OllamaError;
