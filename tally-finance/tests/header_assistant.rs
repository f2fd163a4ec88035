use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tally_finance::assist::{AssistConfig, FileType, HeaderAssistant, Outcome, Provider};

fn header(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

fn assistant(base_url: String, provider: Provider) -> HeaderAssistant {
    HeaderAssistant::new(AssistConfig {
        provider,
        base_url,
        model: "llama3.2".to_string(),
        timeout: Duration::from_millis(500),
        api_key: Some("test-key".to_string()),
    })
    .unwrap()
}

#[tokio::test]
async fn test_ollama_reply_becomes_mapping() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat").body_contains("Txn Date");
            then.status(200).json_body(json!({
                "model": "llama3.2",
                "message": {
                    "role": "assistant",
                    "content": "{\"file_type\":\"csv\",\"header_mapping\":{\"Txn Date\":\"date\",\"Payee\":\"vendor\",\"Value\":\"amount\",\"Memo\":null}}"
                },
                "done": true
            }));
        })
        .await;

    let a = assistant(server.base_url(), Provider::Ollama);
    let out = a
        .suggest_mapping("Txn Date,Payee,Value,Memo", &header(&["Txn Date", "Payee", "Value", "Memo"]))
        .await;
    mock.assert_async().await;

    match out {
        Outcome::Assisted { mapping, file_type } => {
            assert_eq!(file_type, FileType::Csv);
            assert_eq!(mapping.date, Some(0));
            assert_eq!(mapping.description, Some(1));
            assert_eq!(mapping.amount, Some(2));
        }
        other => panic!("expected a mapping, got {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_reply_becomes_mapping() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "{\"file_type\":\"tsv\",\"header_mapping\":{\"Date\":\"date\",\"Amount\":\"amount\"}}"
                    }
                }]
            }));
        })
        .await;

    let a = assistant(server.base_url(), Provider::OpenAI);
    let out = a.suggest_mapping("Date\tAmount", &header(&["Date", "Amount"])).await;
    assert!(matches!(out, Outcome::Assisted { file_type: FileType::Tsv, .. }));
}

#[tokio::test]
async fn test_invalid_json_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(200).json_body(json!({
                "message": { "role": "assistant", "content": "What is love?" }
            }));
        })
        .await;

    let a = assistant(server.base_url(), Provider::Ollama);
    let out = a.suggest_mapping("Date,Amount", &header(&["Date", "Amount"])).await;
    assert!(matches!(out, Outcome::Fallback { .. }));
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(500).body("model not loaded");
        })
        .await;

    let a = assistant(server.base_url(), Provider::Ollama);
    match a.suggest_mapping("Date,Amount", &header(&["Date", "Amount"])).await {
        Outcome::Fallback { notice } => assert!(notice.contains("500")),
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({ "message": { "content": "{}" } }));
        })
        .await;

    let a = assistant(server.base_url(), Provider::Ollama);
    let out = a.suggest_mapping("Date,Amount", &header(&["Date", "Amount"])).await;
    assert!(matches!(out, Outcome::Fallback { .. }));
}

#[tokio::test]
async fn test_unreachable_server_falls_back() {
    // Nothing listens on the discard port.
    let a = assistant("http://127.0.0.1:9".to_string(), Provider::Ollama);
    let out = a.suggest_mapping("Date,Amount", &header(&["Date", "Amount"])).await;
    assert!(matches!(out, Outcome::Fallback { .. }));
}

#[tokio::test]
async fn test_missing_api_key_falls_back() {
    let a = HeaderAssistant::new(AssistConfig {
        provider: Provider::OpenAI,
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: None,
        ..AssistConfig::default()
    })
    .unwrap();
    match a.suggest_mapping("Date", &header(&["Date"])).await {
        Outcome::Fallback { notice } => assert!(notice.contains("OPENAI_API_KEY")),
        other => panic!("expected fallback, got {other:?}"),
    }
}
