/// Detect OS and provide Ollama installation instructions
pub fn detect_and_guide() {
    println!("[WARNING] Ollama not found on your system\n");

    #[cfg(target_os = "macos")]
    {
        println!("Install Ollama:");
        println!("[INSTALL] macOS: brew install ollama");
        println!("   or");
        println!("[DOWNLOAD] Download: https://ollama.com/download/mac\n");
    }

    #[cfg(target_os = "linux")]
    {
        println!("Install Ollama:");
        println!("[INSTALL] Linux: curl -fsSL https://ollama.com/install.sh | sh");
        println!("   or");
        println!("[DOWNLOAD] Download: https://ollama.com/download/linux\n");
    }

    #[cfg(target_os = "windows")]
    {
        println!("Install Ollama:");
        println!("[DOWNLOAD] Windows: Download from https://ollama.com/download/windows\n");
    }

    println!("After installing Ollama, either:");
    println!("1. Start it yourself: ollama serve");
    println!("2. Or let ollama-cached start it: --auto-start");
}

/// Explain how to start a server that is installed but not running
pub fn server_start_hint(base_url: &str) {
    eprintln!("[ERROR] Ollama is not running at {}", base_url);
    eprintln!("   Start it manually with: ollama serve");
    eprintln!("   Or pass --auto-start (or set ollama.auto_start = true)");
}
