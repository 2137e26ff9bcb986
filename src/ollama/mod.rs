// Ollama model service
//
// The `ChatModel` trait is the seam between the conversation loop and the
// model server; `OllamaClient` implements it over HTTP.

use async_trait::async_trait;

pub mod client;
pub mod types;

pub use client::OllamaClient;
pub use types::{ChatMessage, ModelInfo, NetworkError, Role};

/// Receives the cumulative response text as it streams in
pub type ProgressCallback<'a> = &'a mut (dyn FnMut(&str) + Send);

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete a conversation.
    ///
    /// With a progress callback the response is streamed and the callback
    /// sees the full text received so far after every delta.
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<String, NetworkError>;

    async fn list_models(&self) -> Result<Vec<ModelInfo>, NetworkError>;

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f64>, NetworkError>;

    fn model_name(&self) -> &str;
}
