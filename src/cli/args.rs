use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ollama-cached")]
#[command(version)]
#[command(about = "Pull an Ollama model on first use, then chat with it", long_about = None)]
pub struct Cli {
    /// Model tag to use (e.g., llama3, mistral:7b)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Start `ollama serve` if the server is not reachable
    #[arg(long)]
    pub auto_start: bool,

    /// Prompt to send to the model
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Optional system message sent before the prompt
    #[arg(short, long, requires = "prompt")]
    pub system: Option<String>,

    /// Output format for the reply
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// List locally cached models
    List,
    /// Make sure a model is available locally, downloading it if needed
    Pull {
        /// Model tag (defaults to the configured model)
        model: Option<String>,
    },
    /// Show version information
    Version,
    /// Check status of the Ollama server
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Reply text only
    Text,
    /// JSON object with model and reply
    Json,
}
