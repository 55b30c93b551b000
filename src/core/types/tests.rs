use serde_json::json;

use super::*;
use crate::core::error::HandlerError;

#[test]
fn test_http_event_accepts_api_gateway_shape() {
    let raw = json!({
        "resource": "/translate",
        "path": "/translate",
        "httpMethod": "POST",
        "headers": { "Content-Type": "application/json" },
        "requestContext": { "stage": "prod" },
        "body": "{\"text\":\"Hello\",\"target_language\":\"French\"}",
        "isBase64Encoded": false
    });

    let event: HttpEvent = serde_json::from_value(raw).expect("event should deserialize");

    assert_eq!(event.http_method, "POST");
    assert_eq!(
        event.body.as_deref(),
        Some("{\"text\":\"Hello\",\"target_language\":\"French\"}")
    );
    assert!(!event.is_preflight());
}

#[test]
fn test_http_event_tolerates_null_headers_and_body() {
    let event: HttpEvent = serde_json::from_value(json!({
        "httpMethod": "options",
        "headers": null,
        "body": null
    }))
    .expect("event should deserialize");

    assert!(event.headers.is_none());
    assert!(event.body.is_none());
    assert!(event.is_preflight());
}

#[test]
fn test_http_response_serializes_in_proxy_shape() {
    let response = HttpResponse {
        status_code: 200,
        headers: [("Content-Type".to_string(), "application/json".to_string())]
            .into_iter()
            .collect(),
        body: "{}".to_string(),
    };

    let value = serde_json::to_value(&response).expect("serialize response");
    assert_eq!(value["statusCode"], json!(200));
    assert_eq!(value["headers"]["Content-Type"], json!("application/json"));
    assert_eq!(value["body"], json!("{}"));
    assert_eq!(response.header("content-type"), Some("application/json"));
}

#[test]
fn test_translation_request_missing_fields_are_none() {
    let request: TranslationRequest =
        serde_json::from_str(r#"{"text":"Hello"}"#).expect("parse request");

    assert_eq!(request.text.as_deref(), Some("Hello"));
    assert_eq!(request.target_language, None);
}

#[test]
fn test_validate_rejects_missing_and_blank_fields() {
    let missing_language = TranslationRequest {
        text: Some("Hello".to_string()),
        target_language: None,
    };
    assert_eq!(
        missing_language.validate(),
        Err(HandlerError::invalid_field("target_language", "is required"))
    );

    let blank_text = TranslationRequest {
        text: Some("   ".to_string()),
        target_language: Some("French".to_string()),
    };
    assert_eq!(
        blank_text.validate(),
        Err(HandlerError::invalid_field("text", "must not be blank"))
    );
}

#[test]
fn test_validate_keeps_text_verbatim_and_trims_language() {
    let validated = TranslationRequest {
        text: Some("  Hello, world  ".to_string()),
        target_language: Some(" French ".to_string()),
    }
    .validate()
    .expect("request should validate");

    assert_eq!(validated.text, "  Hello, world  ");
    assert_eq!(validated.target_language, "French");
}

#[test]
fn test_completion_request_user_prompt_shape() {
    let request = CompletionRequest::user_prompt("claude-3-haiku-20240307", 1000, "hi");

    assert_eq!(request.model, "claude-3-haiku-20240307");
    assert_eq!(request.max_tokens, 1000);
    assert_eq!(
        request.messages,
        vec![Message {
            role: MessageRole::User,
            content: "hi".to_string(),
        }]
    );
}

#[test]
fn test_first_text_skips_non_text_segments() {
    let response = CompletionResponse {
        id: None,
        model: "claude-3-haiku-20240307".to_string(),
        content: vec![
            ContentPart::Other {
                kind: "thinking".to_string(),
            },
            ContentPart::Text {
                text: "Bonjour".to_string(),
            },
            ContentPart::Text {
                text: "ignored".to_string(),
            },
        ],
        finish_reason: Some(FinishReason::Stop),
        usage: Usage::default(),
    };

    assert_eq!(response.first_text(), Some("Bonjour"));
}

#[test]
fn test_first_text_none_when_no_text() {
    let response = CompletionResponse {
        id: None,
        model: "m".to_string(),
        content: Vec::new(),
        finish_reason: None,
        usage: Usage::default(),
    };

    assert_eq!(response.first_text(), None);
}
