/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_OLLAMA_HOST: &str = "localhost";
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;

// Runtime settings handed to `ollama serve`
pub const DEFAULT_MODELS_DIR: &str = "./models";
pub const DEFAULT_KEEP_ALIVE: &str = "1m";
pub const DEFAULT_MODEL: &str = "llama3";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 600; // 10 minutes for large model requests
pub const CONNECT_TIMEOUT_SECS: u64 = 10;
pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 2000;
pub const SERVER_STARTUP_WAIT_MS: u64 = 500;
pub const SERVER_MAX_STARTUP_ATTEMPTS: usize = 20;

// Chat requests ask for machine-parseable output
pub const CHAT_RESPONSE_FORMAT: &str = "json";

// Progress display
pub const DIGEST_LABEL_LEN: usize = 12;
pub const PROGRESS_BAR_TEMPLATE: &str =
    "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
