//! `GeminiClient` against a local wiremock server: request shape, response parsing, errors.

mod init_logging;

use safora::{
    Coordinates, GeminiClient, ModelClient, ModelError, ModelRequest, ResponseInterpreter,
    ToolCapability, Turn, TravelSession, FALLBACK_REPLY,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";

fn endpoint() -> String {
    format!("/v1beta/models/{}:generateContent", MODEL)
}

fn request(location: Option<Coordinates>) -> ModelRequest {
    ModelRequest {
        model: MODEL.into(),
        system_instruction: Some("You are Safora".into()),
        turns: vec![Turn::user("Plan a trip to Santorini")],
        tools: vec![ToolCapability::GoogleMaps, ToolCapability::GoogleSearch],
        location,
    }
}

fn santorini_body() -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "Here is Santorini" }] },
            "groundingMetadata": {
                "groundingChunks": [
                    { "maps": { "title": "Oia", "uri": "https://maps.google.com/@36.4618,25.3753,15z" } },
                    { "web": { "title": "Wiki", "uri": "https://en.wikipedia.org/wiki/Santorini" } }
                ]
            }
        }]
    })
}

#[tokio::test]
async fn sends_key_tools_and_location_and_parses_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint()))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Plan a trip to Santorini" }] }],
            "tools": [{ "googleMaps": {} }, { "googleSearch": {} }],
            "toolConfig": { "retrievalConfig": { "latLng": { "latitude": 37.98, "longitude": 23.72 } } },
            "systemInstruction": { "parts": [{ "text": "You are Safora" }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(santorini_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key").with_base_url(server.uri());
    let out = client
        .generate(&request(Some(Coordinates::new(37.98, 23.72))))
        .await
        .unwrap();

    assert_eq!(out.text.as_deref(), Some("Here is Santorini"));
    assert_eq!(out.chunks.len(), 2);
    assert_eq!(
        out.chunks[0].maps.as_ref().and_then(|m| m.title.as_deref()),
        Some("Oia")
    );
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint()))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let client = GeminiClient::new("bad").with_base_url(server.uri());
    let err = client.generate(&request(None)).await.unwrap_err();
    match err {
        ModelError::Status { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k").with_base_url(server.uri());
    let err = client.generate(&request(None)).await.unwrap_err();
    assert!(matches!(err, ModelError::Decode(_)));
}

#[tokio::test]
async fn session_over_http_derives_destination() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint()))
        .respond_with(ResponseTemplate::new(200).set_body_json(santorini_body()))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k").with_base_url(server.uri());
    let session = TravelSession::new(ResponseInterpreter::new(client).with_model(MODEL));
    let turn = session.submit("Plan a trip to Santorini").await.unwrap();

    assert_eq!(turn.reply.text, "Here is Santorini");
    assert_eq!(turn.reply.grounding_links.len(), 2);
    assert_eq!(turn.destinations.len(), 1);
    assert_eq!(session.focus(), Coordinates::new(36.4618, 25.3753));
}

#[tokio::test]
async fn session_over_http_falls_back_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(endpoint()))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k").with_base_url(server.uri());
    let session = TravelSession::new(ResponseInterpreter::new(client).with_model(MODEL));
    let turn = session.submit("hello").await.unwrap();

    assert!(turn.failed);
    assert_eq!(turn.reply.text, FALLBACK_REPLY);
    assert!(!session.is_loading());
}
