use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

/// One line of the newline-delimited streaming response body.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: Option<WireMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

pub struct OllamaClient {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// `endpoint` is the full chat URL, e.g. `http://localhost:11434/api/chat`.
    pub fn with_config(endpoint: String, model: String) -> Self {
        OllamaClient {
            endpoint,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one user message and accumulates the streamed reply. No retry,
    /// no cancellation; the caller decides what to do with the error text.
    pub async fn chat(&self, prompt: &str) -> Result<String, AppError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: true,
        };
        log::debug!("chat request to {} (model {})", self.endpoint, self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Connect(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Connect(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let mut reply = String::new();
        let mut pending = String::new();
        let mut stream = response.bytes_stream();

        while let Some(item) = stream.next().await {
            let chunk = item.map_err(|e| AppError::Connect(e.to_string()))?;
            pending.push_str(&String::from_utf8_lossy(&chunk));

            // JSON objects are newline-delimited but may straddle chunks.
            while let Some(pos) = pending.find('\n') {
                let line: String = pending.drain(..=pos).collect();
                if consume_line(line.trim(), &mut reply)? {
                    return finish(reply);
                }
            }

            tokio::task::yield_now().await;
        }

        consume_line(pending.trim(), &mut reply)?;
        finish(reply)
    }

    /// Startup probe: is the server up, and is the configured model pulled?
    /// Used to warn, never to block.
    pub async fn check_available(&self) -> Result<(), AppError> {
        if self.model.trim().is_empty() {
            return Err(AppError::Config("no Ollama model configured".to_string()));
        }

        let Some(url) = tags_url(&self.endpoint) else {
            log::debug!("endpoint {} has no /api/chat suffix, skipping model check", self.endpoint);
            return Ok(());
        };

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(3))
            .send()
            .await
            .map_err(|e| AppError::Connect(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Connect(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Connect(e.to_string()))?;

        if !tags.models.iter().any(|m| m.name.contains(&self.model)) {
            return Err(AppError::Config(format!(
                "model '{}' not found in Ollama. Run: ollama pull {}",
                self.model, self.model
            )));
        }
        Ok(())
    }
}

/// Applies one stream line to the accumulated reply. Returns true once the
/// server marks the stream done. Unparsable lines are skipped.
fn consume_line(line: &str, reply: &mut String) -> Result<bool, AppError> {
    if line.is_empty() {
        return Ok(false);
    }
    let chunk: ChatChunk = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(e) => {
            log::debug!("skipping unparsable stream line: {}", e);
            return Ok(false);
        }
    };
    if let Some(error) = chunk.error {
        return Err(AppError::Connect(format!("Ollama error: {}", error)));
    }
    if let Some(message) = chunk.message {
        reply.push_str(&message.content);
    }
    Ok(chunk.done)
}

fn finish(reply: String) -> Result<String, AppError> {
    let reply = reply.trim().to_string();
    if reply.is_empty() {
        Err(AppError::Connect("no response from Ollama".to_string()))
    } else {
        Ok(reply)
    }
}

/// Derives the `/api/tags` URL from the configured chat endpoint.
fn tags_url(endpoint: &str) -> Option<String> {
    endpoint
        .trim_end_matches('/')
        .strip_suffix("/api/chat")
        .map(|base| format!("{}/api/tags", base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_model_and_prompt() {
        let request = ChatRequest {
            model: "llama2".to_string(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            stream: true,
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
        assert_eq!(json["model"], "llama2");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn content_fragments_accumulate_until_done() {
        let mut reply = String::new();
        let lines = [
            r#"{"message":{"role":"assistant","content":"Hel"},"done":false}"#,
            r#"{"message":{"role":"assistant","content":"lo!"},"done":false}"#,
            r#"{"message":{"role":"assistant","content":""},"done":true}"#,
        ];
        assert!(!consume_line(lines[0], &mut reply).unwrap());
        assert!(!consume_line(lines[1], &mut reply).unwrap());
        assert!(consume_line(lines[2], &mut reply).unwrap());
        assert_eq!(reply, "Hello!");
    }

    #[test]
    fn error_chunk_fails_the_call() {
        let mut reply = String::new();
        let err = consume_line(r#"{"error":"model not loaded"}"#, &mut reply).unwrap_err();
        assert!(matches!(err, AppError::Connect(_)));
        assert!(err.to_string().contains("model not loaded"));
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let mut reply = String::new();
        assert!(!consume_line("definitely not json", &mut reply).unwrap());
        assert!(!consume_line("", &mut reply).unwrap());
        assert_eq!(reply, "");
    }

    #[test]
    fn empty_reply_is_an_error() {
        assert!(finish("  \n".to_string()).is_err());
        assert_eq!(finish(" hi ".to_string()).unwrap(), "hi");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connect_error_not_a_panic() {
        // Port 1 is never listening locally.
        let client = OllamaClient::with_config(
            "http://127.0.0.1:1/api/chat".to_string(),
            "llama2".to_string(),
        );
        let err = client.chat("hi").await.unwrap_err();
        assert!(matches!(err, AppError::Connect(_)));
        let err = client.check_available().await.unwrap_err();
        assert!(matches!(err, AppError::Connect(_)));
    }

    #[tokio::test]
    async fn blank_model_fails_the_probe_before_any_request() {
        let client = OllamaClient::with_config(
            "http://127.0.0.1:1/api/chat".to_string(),
            "  ".to_string(),
        );
        assert!(matches!(
            client.check_available().await,
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn tags_url_derives_from_chat_endpoint() {
        assert_eq!(
            tags_url("http://localhost:11434/api/chat").as_deref(),
            Some("http://localhost:11434/api/tags")
        );
        assert_eq!(
            tags_url("http://localhost:11434/api/chat/").as_deref(),
            Some("http://localhost:11434/api/tags")
        );
        assert_eq!(tags_url("http://localhost:8080/v1/chat"), None);
    }
}
