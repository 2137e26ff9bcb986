// Ollama client against a mock HTTP server

use mockito::Matcher;
use serde_json::json;
use std::sync::{Arc, Mutex};

use ollama_code::ollama::{ChatMessage, ChatModel, NetworkError, OllamaClient};

fn messages() -> Vec<ChatMessage> {
    vec![ChatMessage::system("sys"), ChatMessage::user("hi")]
}

#[tokio::test]
async fn test_streaming_reports_cumulative_text() {
    let mut server = mockito::Server::new_async().await;
    // Objects are concatenated without separators, as some servers send them
    let body = concat!(
        r#"{"message":{"role":"assistant","content":"a"},"done":false}"#,
        r#"{"message":{"role":"assistant","content":"b {\"x\": \"}\"}"},"done":false}"#,
        "\n",
        r#"{"message":{"role":"assistant","content":""},"done":true}"#,
    );
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({
            "model": "codellama",
            "stream": true,
            "options": {"num_predict": 128}
        })))
        .with_status(200)
        .with_header("content-type", "application/x-ndjson")
        .with_body(body)
        .create_async()
        .await;

    let client = OllamaClient::new(server.url(), "codellama")
        .unwrap()
        .with_max_tokens(128);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut on_progress = move |text: &str| sink.lock().unwrap().push(text.to_string());

    let response = client
        .chat_completion(&messages(), Some(&mut on_progress))
        .await
        .unwrap();

    assert_eq!(response, r#"ab {"x": "}"}"#);
    assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), r#"ab {"x": "}"}"#.to_string()]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_streaming_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({"stream": false})))
        .with_status(200)
        .with_body(r#"{"message":{"role":"assistant","content":"hello"},"done":true}"#)
        .create_async()
        .await;

    let client = OllamaClient::new(server.url(), "codellama").unwrap();
    let response = client.chat_completion(&messages(), None).await.unwrap();

    assert_eq!(response, "hello");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_carries_status_text() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(404)
        .with_body(r#"{"error":"model 'nope' not found"}"#)
        .create_async()
        .await;

    let client = OllamaClient::new(server.url(), "nope").unwrap();
    let err = client.chat_completion(&messages(), None).await.unwrap_err();

    match err {
        NetworkError::Status { status, body } => {
            assert!(status.starts_with("404"));
            assert!(body.contains("not found"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_error_object() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body(r#"{"message":{"content":"par"},"done":false}{"error":"out of memory"}"#)
        .create_async()
        .await;

    let client = OllamaClient::new(server.url(), "codellama").unwrap();
    let mut ignore = |_: &str| {};
    let err = client
        .chat_completion(&messages(), Some(&mut ignore))
        .await
        .unwrap_err();

    assert!(matches!(err, NetworkError::Server(ref m) if m == "out of memory"));
}

#[tokio::test]
async fn test_list_models() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_body(
            json!({
                "models": [
                    {"name": "codellama:latest", "size": 3825819519u64, "digest": "abc"},
                    {"name": "llama3:8b", "size": 4661224676u64}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OllamaClient::new(server.url(), "codellama").unwrap();
    let models = client.list_models().await.unwrap();

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].name, "codellama:latest");
    assert_eq!(models[0].human_size(), "3.8 GB");
    assert_eq!(models[1].digest, None);
}

#[tokio::test]
async fn test_generate_embeddings() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/embeddings")
        .match_body(Matcher::Json(json!({"model": "codellama", "prompt": "fn main"})))
        .with_status(200)
        .with_body(r#"{"embedding":[0.5,-1.0]}"#)
        .create_async()
        .await;

    let client = OllamaClient::new(server.url(), "codellama").unwrap();
    assert_eq!(client.generate_embeddings("fn main").await.unwrap(), vec![0.5, -1.0]);
}

#[tokio::test]
async fn test_connection_refused() {
    let client = OllamaClient::new("http://127.0.0.1:1", "codellama").unwrap();
    let err = client.list_models().await.unwrap_err();
    assert!(err.is_connection_refused(), "got {:?}", err);
}
