//! HTTP-level tests for the generator and publisher clients
//!
//! Runs the OpenRouter generator and webhook publisher against wiremock
//! servers: request shape, success parsing, fenced-JSON replies, and error
//! mapping for non-2xx responses.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rotapress::config::{GeneratorConfig, PublisherConfig};
use rotapress::error::Error;
use rotapress::generator::{GenerationRequest, OpenRouterGenerator, PostGenerator};
use rotapress::publisher::{Publisher, WebhookPublisher};

fn generator_config(endpoint: String) -> GeneratorConfig {
    GeneratorConfig {
        endpoint,
        model: "deepseek/deepseek-chat".to_string(),
        api_key: Some("test-key".to_string()),
        timeout_secs: 5,
        temperature: 0.7,
        max_tokens: 1024,
    }
}

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
}

// ============================================================================
// Generator
// ============================================================================

#[tokio::test]
async fn test_generator_parses_plain_json_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "deepseek/deepseek-chat"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            r#"{"title": "Markets Rally", "meta_description": "m", "body": "<h2>Markets Rally</h2>"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let generator = OpenRouterGenerator::new(generator_config(server.uri())).unwrap();
    let request = GenerationRequest {
        topic: "Finance".to_string(),
        ..Default::default()
    };

    let post = generator.generate(&request).await.unwrap();
    assert_eq!(post.title, "Markets Rally");
    assert_eq!(post.body, "<h2>Markets Rally</h2>");
}

#[tokio::test]
async fn test_generator_parses_fenced_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            "Here is the post:\n```json\n{\"title\": \"T\", \"body\": \"B\"}\n```\n",
        )))
        .mount(&server)
        .await;

    let generator = OpenRouterGenerator::new(generator_config(server.uri())).unwrap();
    let request = GenerationRequest {
        topic: "Sport".to_string(),
        ..Default::default()
    };

    let post = generator.generate(&request).await.unwrap();
    assert_eq!(post.title, "T");
}

#[tokio::test]
async fn test_generator_maps_backend_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let generator = OpenRouterGenerator::new(generator_config(server.uri())).unwrap();
    let request = GenerationRequest {
        topic: "Sport".to_string(),
        ..Default::default()
    };

    let err = generator.generate(&request).await.unwrap_err();
    assert!(matches!(err, Error::Generation { .. }));
    assert!(err.is_recoverable());
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_generator_maps_error_with_multibyte_body() {
    let server = MockServer::start().await;

    // 300-byte body of 3-byte chars; truncation must stay on char boundaries
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("€".repeat(100)))
        .mount(&server)
        .await;

    let generator = OpenRouterGenerator::new(generator_config(server.uri())).unwrap();
    let request = GenerationRequest {
        topic: "Sport".to_string(),
        ..Default::default()
    };

    let err = generator.generate(&request).await.unwrap_err();
    assert!(matches!(err, Error::Generation { .. }));
    assert!(err.is_recoverable());
    assert!(err.to_string().contains('€'));
}

#[tokio::test]
async fn test_generator_rejects_unparseable_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_reply("sorry, I cannot do that")),
        )
        .mount(&server)
        .await;

    let generator = OpenRouterGenerator::new(generator_config(server.uri())).unwrap();
    let request = GenerationRequest {
        topic: "Sport".to_string(),
        ..Default::default()
    };

    assert!(generator.generate(&request).await.is_err());
}

// ============================================================================
// Publisher
// ============================================================================

#[tokio::test]
async fn test_publisher_posts_label_and_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("authorization", "Bearer hook-token"))
        .and(body_partial_json(json!({
            "label": "Markets Rally",
            "payload": "<h2>Markets Rally</h2>"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = WebhookPublisher::new(PublisherConfig {
        webhook_url: format!("{}/hook", server.uri()),
        auth_token: Some("hook-token".to_string()),
        timeout_secs: 5,
    })
    .unwrap();

    publisher
        .publish("Markets Rally", "<h2>Markets Rally</h2>")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_publisher_maps_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let publisher = WebhookPublisher::new(PublisherConfig {
        webhook_url: format!("{}/hook", server.uri()),
        auth_token: None,
        timeout_secs: 5,
    })
    .unwrap();

    let err = publisher.publish("Markets Rally", "<p>x</p>").await.unwrap_err();
    assert!(matches!(err, Error::Publish { .. }));
    assert!(err.is_recoverable());
}
