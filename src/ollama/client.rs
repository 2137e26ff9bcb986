// HTTP client for the Ollama API

use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::sync::mpsc;

use super::types::{
    ChatChunk, ChatMessage, ChatOptions, ChatRequest, EmbeddingsRequest, EmbeddingsResponse,
    ModelInfo, NetworkError, TagsResponse,
};
use super::{ChatModel, ProgressCallback};
use crate::config::Settings;
use crate::json_scan::ObjectScanner;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, NetworkError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        // No overall timeout: generation on local hardware can take minutes
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|source| NetworkError::Transport {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            model: model.into(),
            max_tokens: None,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, NetworkError> {
        Ok(Self::new(&settings.ollama_base_url, &settings.ollama_model)?
            .with_max_tokens(settings.max_tokens))
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_chat(&self, messages: &[ChatMessage], stream: bool) -> Result<Response, NetworkError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream,
            options: self.max_tokens.map(|num_predict| ChatOptions { num_predict }),
        };
        let url = self.url("/api/chat");
        tracing::debug!(%url, model = %self.model, messages = messages.len(), stream, "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| NetworkError::Transport { url, source })?;
        check_status(response).await
    }

    /// Stream a chat completion.
    ///
    /// Returns a channel of content deltas; the channel closes when the
    /// server reports `done` or the connection ends.
    pub async fn chat_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<mpsc::Receiver<Result<String, NetworkError>>, NetworkError> {
        let response = self.post_chat(messages, true).await?;
        let url = self.url("/api/chat");
        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut scanner = ObjectScanner::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(source) => {
                        let _ = tx
                            .send(Err(NetworkError::Transport {
                                url: url.clone(),
                                source,
                            }))
                            .await;
                        return;
                    }
                };

                for object in scanner.push(&bytes) {
                    let parsed: ChatChunk = match serde_json::from_slice(&object) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            tracing::debug!("Skipping malformed stream object: {}", e);
                            continue;
                        }
                    };

                    if let Some(error) = parsed.error {
                        let _ = tx.send(Err(NetworkError::Server(error))).await;
                        return;
                    }
                    if let Some(content) = parsed.content() {
                        if !content.is_empty() && tx.send(Ok(content.to_string())).await.is_err() {
                            // Receiver dropped, stop streaming
                            return;
                        }
                    }
                    if parsed.done {
                        tracing::debug!("Stream completed");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}

async fn check_status(response: Response) -> Result<Response, NetworkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(NetworkError::Status {
        status: status.to_string(),
        body,
    })
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<String, NetworkError> {
        let Some(on_progress) = on_progress else {
            let response = self.post_chat(messages, false).await?;
            let chunk: ChatChunk = response
                .json()
                .await
                .map_err(|e| NetworkError::Decode(e.to_string()))?;
            if let Some(error) = chunk.error {
                return Err(NetworkError::Server(error));
            }
            return Ok(chunk.content().unwrap_or_default().to_string());
        };

        let mut rx = self.chat_stream(messages).await?;
        let mut full_text = String::new();
        while let Some(delta) = rx.recv().await {
            full_text.push_str(&delta?);
            on_progress(&full_text);
        }
        Ok(full_text)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, NetworkError> {
        let url = self.url("/api/tags");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| NetworkError::Transport { url, source })?;
        let tags: TagsResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| NetworkError::Decode(e.to_string()))?;
        Ok(tags.models)
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f64>, NetworkError> {
        let url = self.url("/api/embeddings");
        let request = EmbeddingsRequest {
            model: &self.model,
            prompt: text,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| NetworkError::Transport { url, source })?;
        let embeddings: EmbeddingsResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| NetworkError::Decode(e.to_string()))?;
        Ok(embeddings.embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
