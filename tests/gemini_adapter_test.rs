use httpmock::prelude::*;
use manualj_chain::{
    CalculationRequest, ChainError, GeminiClient, GeminiConfig, GenerativeModel, ManualJChain,
    ModelError, Stage,
};
use serde_json::json;

fn client_for(server: &MockServer) -> GeminiClient {
    let mut config = GeminiConfig::new("test-key");
    config.base_url = server.base_url();
    GeminiClient::new(config).unwrap()
}

fn completion(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn vision_call_sends_inline_document_and_api_key() {
    let server = MockServer::start();

    // b"%PDF-1.4" encodes to JVBERi0xLjQ=
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-pro-vision:generateContent")
            .header("x-goog-api-key", "test-key")
            .body_contains("JVBERi0xLjQ=")
            .body_contains("application/pdf");
        then.status(200).json_body(completion("STATIC data"));
    });

    let client = client_for(&server);
    let text = client
        .generate_vision("extract the building data", "application/pdf", "JVBERi0xLjQ=")
        .await
        .unwrap();

    assert_eq!(text, "STATIC data");
    mock.assert();
}

#[tokio::test]
async fn reasoning_call_targets_reasoning_model() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash-thinking-exp:generateContent")
            .body_contains("perform Manual J load calculations");
        then.status(200).json_body(completion("RESULTS text"));
    });

    let client = client_for(&server);
    let text = client
        .generate_reasoning("Using the following building data and assumptions, perform Manual J load calculations: ...")
        .await
        .unwrap();

    assert_eq!(text, "RESULTS text");
    mock.assert();
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST);
        then.status(401).body("API key not valid");
    });

    let client = client_for(&server);
    let err = client.generate_reasoning("prompt").await.unwrap_err();
    assert!(matches!(err, ModelError::Auth { .. }));
}

#[tokio::test]
async fn throttling_maps_to_rate_limited() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST);
        then.status(429).body("Resource exhausted");
    });

    let client = client_for(&server);
    let err = client.generate_reasoning("prompt").await.unwrap_err();
    assert!(matches!(err, ModelError::RateLimited { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn undecodable_completion_body_is_malformed() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST);
        then.status(200).body("<html>gateway</html>");
    });

    let client = client_for(&server);
    let err = client.generate_reasoning("prompt").await.unwrap_err();
    assert!(matches!(err, ModelError::Malformed { .. }));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let mut config = GeminiConfig::new("test-key");
    // Port 1 is never listening.
    config.base_url = "http://127.0.0.1:1".to_string();
    config.timeout = std::time::Duration::from_secs(2);
    let client = GeminiClient::new(config).unwrap();

    let err = client.generate_reasoning("prompt").await.unwrap_err();
    assert!(matches!(err, ModelError::Transport(_)));
    assert!(err.is_retryable());
}

/// Full chain against a mocked service; the reasoning mocks dispatch on the
/// prompt wording each stage uses.
#[tokio::test]
async fn chain_runs_end_to_end_over_http() {
    let server = MockServer::start();

    let vision = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-pro-vision:generateContent");
        then.status(200).json_body(completion("STATIC: 1800 sqft, 6 rooms"));
    });
    let assumptions = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash-thinking-exp:generateContent")
            .body_contains("Generate reasonable assumptions");
        then.status(200)
            .json_body(completion("ASSUMPTIONS: design temp 20F"));
    });
    let results = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash-thinking-exp:generateContent")
            .body_contains("perform Manual J load calculations");
        then.status(200)
            .json_body(completion("RESULTS: heating 42000 BTU/h"));
    });
    let visualization = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash-thinking-exp:generateContent")
            .body_contains("Convert these Manual J results");
        then.status(200).json_body(completion(
            r#"{"chartData":"iVBORw0KGgo=","csvData":"room,load\nkitchen,1200"}"#,
        ));
    });

    let chain = ManualJChain::new(client_for(&server));
    let request = CalculationRequest::new(b"%PDF-1.4 plans".to_vec(), "94110");
    let result = chain.run(&request).await.unwrap();

    assert_eq!(result.static_data, "STATIC: 1800 sqft, 6 rooms");
    assert_eq!(result.dynamic_assumptions, "ASSUMPTIONS: design temp 20F");
    assert_eq!(result.manual_j_results, "RESULTS: heating 42000 BTU/h");
    assert_eq!(result.chart_data, "iVBORw0KGgo=");
    assert_eq!(result.csv_data, "room,load\nkitchen,1200");

    vision.assert();
    assumptions.assert();
    results.assert();
    visualization.assert();
}

#[tokio::test]
async fn chain_tags_http_auth_failure_with_first_stage() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST);
        then.status(403).body("caller lacks permission");
    });

    let chain = ManualJChain::new(client_for(&server));
    let request = CalculationRequest::new(b"%PDF-1.4 plans".to_vec(), "94110");
    let err = chain.run(&request).await.unwrap_err();

    assert!(matches!(
        err,
        ChainError::Stage {
            stage: Stage::ExtractStaticData,
            source: ModelError::Auth { .. }
        }
    ));
    assert_eq!(err.http_status(), 401);
}
