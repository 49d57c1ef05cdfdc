use thiserror::Error;

/// Errors raised by the Ollama HTTP client
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("Could not reach Ollama at {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Ollama returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Error message reported inside a response body or stream
    #[error("Ollama error: {0}")]
    Runtime(String),

    #[error("Malformed response from Ollama: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for OllamaError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts and dropped bodies can surface while decoding; they are still transport failures
        let transport = err.is_timeout() || err.is_connect() || err.is_request() || err.is_body();
        if err.is_decode() && !transport {
            OllamaError::Malformed(err.to_string())
        } else {
            OllamaError::Connection {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                source: err,
            }
        }
    }
}
