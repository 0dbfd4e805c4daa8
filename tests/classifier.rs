use std::time::Duration;

use delivery_handshake::classifier::{GeminiClassifier, PhotoClassifier, Verdict};
use delivery_handshake::config::ClassifierConfig;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const PHOTO: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

fn classifier(server: &MockServer, api_key: Option<&str>) -> GeminiClassifier {
    GeminiClassifier::new(&ClassifierConfig {
        endpoint: server.uri(),
        model: MODEL.to_string(),
        api_key: api_key.map(str::to_string),
        timeout: Duration::from_millis(500),
    })
    .unwrap()
}

fn model_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    }))
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn positive_verdict_is_accepted() {
    let server = MockServer::start().await;
    mount(
        &server,
        model_reply(r#"{"valid": true, "reason": "parcel next to door 12"}"#),
    )
    .await;

    let verdict = classifier(&server, Some("test-key")).classify(PHOTO).await;
    assert_eq!(
        verdict,
        Verdict::Accepted {
            reason: "parcel next to door 12".to_string()
        }
    );
}

#[tokio::test]
async fn fenced_negative_verdict_is_rejected() {
    let server = MockServer::start().await;
    mount(
        &server,
        model_reply("```json\n{\"valid\": false, \"reason\": \"door number not readable\"}\n```"),
    )
    .await;

    let verdict = classifier(&server, Some("test-key")).classify(PHOTO).await;
    assert_eq!(
        verdict,
        Verdict::Rejected {
            reason: "door number not readable".to_string()
        }
    );
}

#[tokio::test]
async fn request_carries_prompt_and_inline_image() {
    let server = MockServer::start().await;
    mount(&server, model_reply(r#"{"valid": true, "reason": "ok"}"#)).await;

    classifier(&server, Some("test-key")).classify(PHOTO).await;

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let parts = &body["contents"][0]["parts"];
    assert!(parts[0]["text"].as_str().unwrap().contains("door number"));
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[1]["inlineData"]["data"], "/9j/4AAQ");
    assert_eq!(
        body["generationConfig"]["responseMimeType"],
        "application/json"
    );
}

#[tokio::test]
async fn server_error_fails_closed() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

    let verdict = classifier(&server, Some("test-key")).classify(PHOTO).await;
    assert!(matches!(verdict, Verdict::Unavailable { .. }));
    assert!(!verdict.is_valid());
}

#[tokio::test]
async fn empty_candidates_fail_closed() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
    )
    .await;

    let verdict = classifier(&server, Some("test-key")).classify(PHOTO).await;
    assert!(matches!(verdict, Verdict::Unavailable { .. }));
}

#[tokio::test]
async fn unparseable_reply_fails_closed() {
    let server = MockServer::start().await;
    mount(&server, model_reply("Looks like a nice parcel to me.")).await;

    let verdict = classifier(&server, Some("test-key")).classify(PHOTO).await;
    assert!(matches!(verdict, Verdict::Unavailable { .. }));
}

#[tokio::test]
async fn slow_upstream_fails_closed() {
    let server = MockServer::start().await;
    mount(
        &server,
        model_reply(r#"{"valid": true, "reason": "ok"}"#).set_delay(Duration::from_secs(2)),
    )
    .await;

    let verdict = classifier(&server, Some("test-key")).classify(PHOTO).await;
    assert!(matches!(verdict, Verdict::Unavailable { .. }));
}

#[tokio::test]
async fn missing_api_key_never_calls_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let verdict = classifier(&server, None).classify(PHOTO).await;
    assert!(matches!(verdict, Verdict::Unavailable { .. }));
}
