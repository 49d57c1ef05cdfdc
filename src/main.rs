use anyhow::Result;
use clap::Parser;

use ollama_cached::{
    app::{load_config, load_config_file, Config},
    chat::chat,
    cli::{format_reply, handle_command, Cli},
    ollama::{ensure_server, ChatMessage, OllamaClient},
    progress::TerminalDisplay,
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Set up logging if verbose
    if cli.verbose {
        init_logger("info");
    }

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        load_config_file(config_path)?
    } else {
        load_config().unwrap_or_else(|e| {
            eprintln!("[WARNING] {:#}; using defaults", e);
            Config::default()
        })
    };

    let client = OllamaClient::new(&config.ollama)?;
    let auto_start = cli.auto_start || config.ollama.auto_start;

    if let Some(command) = &cli.command {
        return handle_command(command, &config, &client, auto_start).await;
    }

    let Some(prompt) = cli.prompt.clone() else {
        println!("Nothing to do. Pass --prompt or a subcommand; see --help.");
        return Ok(());
    };

    ensure_server(&config.ollama, &client, auto_start).await?;

    let model = cli
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.name.clone());

    let mut messages = Vec::new();
    if let Some(system) = &cli.system {
        messages.push(ChatMessage::system(system.clone()));
    }
    messages.push(ChatMessage::user(prompt));

    let mut display = TerminalDisplay::new();
    let reply = chat(&client, &mut display, &model, messages).await?;

    println!("{}", format_reply(&model, &reply, cli.output_format));
    Ok(())
}
