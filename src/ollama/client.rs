use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::{OllamaRuntime, PullStream};
use super::types::{
    ChatRequest, ChatResponse, InventoryEntry, ListResponse, PullEvent, PullLine, PullRequest,
    VersionResponse,
};
use crate::app::OllamaConfig;
use crate::constants::{CONNECT_TIMEOUT_SECS, HEALTH_CHECK_TIMEOUT_MS};
use crate::utils::OllamaError;

/// HTTP client for the Ollama REST API
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    keep_alive: Option<String>,
    /// Applied to list and chat; pulls run until the stream ends
    request_timeout: Duration,
}

impl OllamaClient {
    /// Create a client from configuration
    pub fn new(config: &OllamaConfig) -> Result<Self, OllamaError> {
        let mut client = Self::with_base_url(
            &config.base_url(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        if !config.keep_alive.is_empty() {
            client.keep_alive = Some(config.keep_alive.clone());
        }
        Ok(client)
    }

    /// Create a client for an explicit endpoint
    ///
    /// `timeout` bounds list and chat requests. It is not applied to pulls,
    /// whose download stream may legitimately run for a long time.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, OllamaError> {
        if base_url.is_empty() {
            return Err(OllamaError::ConfigError(
                "Ollama base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| OllamaError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            keep_alive: None,
            request_timeout: timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn keep_alive(&self) -> Option<&str> {
        self.keep_alive.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-success response into an error carrying the runtime's message
async fn check_status(response: Response) -> Result<Response, OllamaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text)
        .map(|e| e.error)
        .unwrap_or(text);

    Err(OllamaError::Http {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl OllamaRuntime for OllamaClient {
    async fn list(&self) -> Result<Vec<InventoryEntry>> {
        let url = self.url("/api/tags");
        debug!("Listing local models via {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(OllamaError::from)?;
        let list: ListResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(OllamaError::from)?;

        debug!("Runtime reports {} local models", list.models.len());
        Ok(list.models)
    }

    async fn pull(&self, model: &str) -> Result<PullStream> {
        let url = self.url("/api/pull");
        debug!("Pulling {} via {}", model, url);

        let response = self
            .client
            .post(&url)
            .json(&PullRequest {
                model,
                stream: true,
            })
            .send()
            .await
            .map_err(OllamaError::from)?;
        let response = check_status(response).await?;

        Ok(pull_events(response.bytes_stream()))
    }

    async fn chat(&self, mut request: ChatRequest) -> Result<ChatResponse> {
        let url = self.url("/api/chat");
        if request.keep_alive.is_none() {
            request.keep_alive = self.keep_alive.clone();
        }
        debug!(
            "Chat request to {} ({} messages)",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(OllamaError::from)?;
        let response: ChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(OllamaError::from)?;

        Ok(response)
    }

    async fn version(&self) -> Result<String> {
        let response = self
            .client
            .get(self.url("/api/version"))
            .timeout(Duration::from_millis(HEALTH_CHECK_TIMEOUT_MS))
            .send()
            .await
            .map_err(OllamaError::from)?;
        let version: VersionResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(OllamaError::from)?;

        Ok(version.version)
    }
}

/// Decode an NDJSON byte stream into pull events
///
/// Lines may be split across chunks. A line carrying `error` yields an
/// error and ends the stream, as does a transport error.
fn pull_events<S, E>(bytes: S) -> PullStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<OllamaError> + Send + 'static,
{
    struct State<S> {
        bytes: std::pin::Pin<Box<S>>,
        buffer: Vec<u8>,
        pending: VecDeque<Result<PullEvent>>,
        done: bool,
    }

    let state = State {
        bytes: Box::pin(bytes),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                if item.is_err() {
                    state.done = true;
                    state.pending.clear();
                }
                return Some((item, state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(&chunk);
                    while let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                        let line: Vec<u8> = state.buffer.drain(..=pos).collect();
                        if let Some(item) = decode_line(&line) {
                            state.pending.push_back(item);
                        }
                    }
                }
                Some(Err(e)) => {
                    let err: OllamaError = e.into();
                    state.pending.push_back(Err(err.into()));
                }
                None => {
                    let rest = std::mem::take(&mut state.buffer);
                    if let Some(item) = decode_line(&rest) {
                        state.pending.push_back(item);
                    }
                    state.done = true;
                }
            }
        }
    }))
}

fn decode_line(line: &[u8]) -> Option<Result<PullEvent>> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<PullLine>(line) {
        Ok(PullLine {
            error: Some(message),
            ..
        }) => Some(Err(OllamaError::Runtime(message).into())),
        Ok(PullLine { event, .. }) => Some(Ok(event)),
        Err(e) => {
            warn!("Unparseable pull progress line: {}", line);
            Some(Err(OllamaError::Malformed(e.to_string()).into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::ollama::ChatMessage;

    fn client_for(server: &mockito::ServerGuard) -> OllamaClient {
        OllamaClient::with_base_url(&server.url(), Duration::from_secs(5)).unwrap()
    }

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Bytes, OllamaError>> + Send + 'static {
        let parts: Vec<Result<Bytes, OllamaError>> = parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect();
        stream::iter(parts)
    }

    #[test]
    fn test_empty_base_url_rejected() {
        match OllamaClient::with_base_url("", Duration::from_secs(1)) {
            Err(OllamaError::ConfigError(msg)) => assert!(msg.contains("base URL is required")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_client_from_config() {
        let client = OllamaClient::new(&OllamaConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.keep_alive(), Some("1m"));
    }

    #[tokio::test]
    async fn test_pull_events_joins_split_lines() {
        let events: Vec<_> = pull_events(chunks(&[
            "{\"status\":\"pulling manifest\"}\n{\"status\":\"pull",
            "ing aaa\",\"digest\":\"sha256:aaa\",\"total\":100}\n",
            "\n{\"status\":\"success\"}",
        ]))
        .collect()
        .await;

        let events: Vec<PullEvent> = events.into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(
            events,
            vec![
                PullEvent::status("pulling manifest"),
                PullEvent {
                    status: "pulling aaa".to_string(),
                    digest: Some("sha256:aaa".to_string()),
                    total: Some(100),
                    completed: None,
                },
                PullEvent::status("success"),
            ]
        );
    }

    #[tokio::test]
    async fn test_pull_events_stop_at_runtime_error() {
        let mut events = pull_events(chunks(&[
            "{\"status\":\"pulling manifest\"}\n",
            "{\"error\":\"pull model manifest: file does not exist\"}\n",
            "{\"status\":\"success\"}\n",
        ]));

        assert!(events.next().await.unwrap().is_ok());
        let err = events.next().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("file does not exist"));
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn test_pull_events_stop_at_transport_error() {
        let parts: Vec<Result<Bytes, OllamaError>> = vec![
            Ok(Bytes::from("{\"status\":\"pulling manifest\"}\n")),
            Err(OllamaError::Runtime("connection reset".to_string())),
            Ok(Bytes::from("{\"status\":\"success\"}\n")),
        ];
        let mut events = pull_events(stream::iter(parts));

        assert_eq!(
            events.next().await.unwrap().unwrap(),
            PullEvent::status("pulling manifest")
        );
        let err = events.next().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn test_pull_events_reject_garbage() {
        let mut events = pull_events(chunks(&["not json\n"]));
        let err = events.next().await.unwrap().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OllamaError>(),
            Some(OllamaError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_list_reads_tags() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"models":[{"name":"llama3:latest"},{"name":"mistral:7b"}]}"#)
            .create_async()
            .await;

        let models = client_for(&server).list().await.unwrap();
        mock.assert_async().await;
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["llama3:latest", "mistral:7b"]);
    }

    #[tokio::test]
    async fn test_list_surfaces_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(500)
            .with_body(r#"{"error":"disk unavailable"}"#)
            .create_async()
            .await;

        let err = client_for(&server).list().await.unwrap_err();
        match err.downcast_ref::<OllamaError>() {
            Some(OllamaError::Http { status, body }) => {
                assert_eq!(*status, 500);
                assert_eq!(body, "disk unavailable");
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pull_streams_progress() {
        let mut server = mockito::Server::new_async().await;
        let body = [
            r#"{"status":"pulling manifest"}"#,
            r#"{"status":"pulling aaa","digest":"sha256:aaa","total":100,"completed":50}"#,
            r#"{"status":"success"}"#,
        ]
        .join("\n");
        let mock = server
            .mock("POST", "/api/pull")
            .match_body(Matcher::Json(json!({"model": "llama3", "stream": true})))
            .with_status(200)
            .with_header("content-type", "application/x-ndjson")
            .with_body(body)
            .create_async()
            .await;

        let events: Vec<PullEvent> = client_for(&server)
            .pull("llama3")
            .await
            .unwrap()
            .map(|e| e.unwrap())
            .collect()
            .await;

        mock.assert_async().await;
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].completed, Some(50));
    }

    #[tokio::test]
    async fn test_pull_outlives_request_timeout() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/pull")
            .with_status(200)
            .with_header("content-type", "application/x-ndjson")
            .with_chunked_body(|w| {
                w.write_all(
                    br#"{"status":"pulling aaa","digest":"sha256:aaa","total":100,"completed":10}"#,
                )?;
                w.write_all(b"\n")?;
                w.flush()?;
                std::thread::sleep(Duration::from_millis(1500));
                w.write_all(br#"{"status":"success"}"#)
            })
            .create_async()
            .await;

        let client = OllamaClient::with_base_url(&server.url(), Duration::from_secs(1)).unwrap();
        let events: Vec<PullEvent> = client
            .pull("llama3")
            .await
            .unwrap()
            .map(|e| e.unwrap())
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].completed, Some(10));
        assert_eq!(events[1], PullEvent::status("success"));
    }

    #[tokio::test]
    async fn test_list_timeout_is_connection_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_chunked_body(|w| {
                w.write_all(br#"{"models":["#)?;
                w.flush()?;
                std::thread::sleep(Duration::from_millis(1500));
                w.write_all(br#"]}"#)
            })
            .create_async()
            .await;

        let client = OllamaClient::with_base_url(&server.url(), Duration::from_secs(1)).unwrap();
        let err = client.list().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OllamaError>(),
            Some(OllamaError::Connection { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_refused_is_connection_error() {
        let client =
            OllamaClient::with_base_url("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = client.list().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OllamaError>(),
            Some(OllamaError::Connection { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_bad_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"models":"nope"}"#)
            .create_async()
            .await;

        let err = client_for(&server).list().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OllamaError>(),
            Some(OllamaError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_sends_format_and_keep_alive() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3",
                "format": "json",
                "stream": false,
                "keep_alive": "1m"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"model":"llama3","message":{"role":"assistant","content":"{\"ok\":true}"},"done":true}"#,
            )
            .create_async()
            .await;

        let mut client = client_for(&server);
        client.keep_alive = Some("1m".to_string());

        let request =
            ChatRequest::new("llama3", vec![ChatMessage::user("hello")]).with_format("json");
        let response = client.chat(request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.message.content, r#"{"ok":true}"#);
        assert!(response.done);
    }

    #[tokio::test]
    async fn test_version() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/version")
            .with_status(200)
            .with_body(r#"{"version":"0.1.32"}"#)
            .create_async()
            .await;

        assert_eq!(client_for(&server).version().await.unwrap(), "0.1.32");
    }
}
