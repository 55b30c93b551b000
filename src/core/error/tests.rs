use super::*;

#[test]
fn test_config_error_display_messages() {
    let missing = ConfigError::MissingCredential {
        env_var: "ANTHROPIC_API_KEY".to_string(),
    };
    assert_eq!(
        missing.to_string(),
        "credential missing [env=ANTHROPIC_API_KEY]"
    );

    let invalid = ConfigError::InvalidSetting {
        key: "PORT".to_string(),
        reason: "expected an integer in 1..=65535".to_string(),
    };
    assert_eq!(
        invalid.to_string(),
        "invalid setting PORT: expected an integer in 1..=65535"
    );

    assert_eq!(
        ConfigError::InvalidTimeout { timeout_ms: 0 }.to_string(),
        "invalid timeout: 0 ms"
    );
}

#[test]
fn test_provider_error_display_includes_context() {
    let status = ProviderError::Status {
        model: Some("claude-3-haiku-20240307".to_string()),
        status_code: 429,
        request_id: Some("req_abc".to_string()),
        message: "rate limited".to_string(),
    };
    assert_eq!(
        status.to_string(),
        "provider status error [model=claude-3-haiku-20240307, request_id=req_abc, status_code=429]: rate limited"
    );

    let transport = ProviderError::Transport {
        request_id: None,
        message: "connection refused".to_string(),
    };
    assert_eq!(
        transport.to_string(),
        "provider transport error: connection refused"
    );

    let rejected = ProviderError::CredentialsRejected {
        request_id: Some("req_1".to_string()),
        message: "invalid x-api-key".to_string(),
    };
    assert_eq!(
        rejected.to_string(),
        "provider credentials rejected [request_id=req_1]: invalid x-api-key"
    );
}

#[test]
fn test_handler_error_is_transparent_over_provider_error() {
    let provider = ProviderError::Protocol {
        model: None,
        request_id: None,
        message: "completion response contained no text content".to_string(),
    };
    let handler: HandlerError = provider.clone().into();

    assert_eq!(handler.to_string(), provider.to_string());
}

#[test]
fn test_classified_status_codes() {
    let mapping = StatusMapping::Classified;

    assert_eq!(
        HandlerError::MalformedBody {
            message: "expected value".to_string()
        }
        .status_code(mapping),
        400
    );
    assert_eq!(
        HandlerError::invalid_field("text", "is required").status_code(mapping),
        400
    );
    assert_eq!(
        HandlerError::BodyTooLarge { limit_bytes: 1024 }.status_code(mapping),
        413
    );
    assert_eq!(
        HandlerError::UnsupportedMethod {
            method: "PUT".to_string()
        }
        .status_code(mapping),
        405
    );
    assert_eq!(
        HandlerError::Provider(ProviderError::Transport {
            request_id: None,
            message: "timeout".to_string(),
        })
        .status_code(mapping),
        502
    );
    assert_eq!(
        HandlerError::Serialization {
            message: "boom".to_string()
        }
        .status_code(mapping),
        500
    );
}

#[test]
fn test_body_too_large_display() {
    assert_eq!(
        HandlerError::BodyTooLarge { limit_bytes: 52_428_800 }.to_string(),
        "request body exceeds 52428800 bytes"
    );
}

#[test]
fn test_uniform_status_mapping_collapses_to_500() {
    let errors = [
        HandlerError::MalformedBody {
            message: "eof".to_string(),
        },
        HandlerError::invalid_field("target_language", "must not be blank"),
        HandlerError::BodyTooLarge { limit_bytes: 64 },
        HandlerError::UnsupportedMethod {
            method: "GET".to_string(),
        },
        HandlerError::Provider(ProviderError::CredentialsRejected {
            request_id: None,
            message: "bad key".to_string(),
        }),
    ];

    for error in errors {
        assert_eq!(error.status_code(StatusMapping::Uniform), 500, "{error}");
    }
}

#[test]
fn test_status_mapping_parse() {
    assert_eq!(
        StatusMapping::parse("classified"),
        Some(StatusMapping::Classified)
    );
    assert_eq!(StatusMapping::parse(" Uniform "), Some(StatusMapping::Uniform));
    assert_eq!(StatusMapping::parse("strict"), None);
    assert_eq!(StatusMapping::default(), StatusMapping::Classified);
}

#[test]
fn test_srt_error_display_and_source() {
    assert_eq!(
        SrtError::InvalidBlock { block: 3 }.to_string(),
        "invalid SRT block format at block 3"
    );
    assert_eq!(
        SrtError::InvalidTimecode { block: 1 }.to_string(),
        "invalid time format at block 1"
    );

    let error = SrtError::Translation {
        language: "fr".to_string(),
        chunk: 2,
        chunks: 4,
        source: ProviderError::Transport {
            request_id: None,
            message: "connection reset".to_string(),
        },
    };
    assert_eq!(
        error.to_string(),
        "translation to fr failed at chunk 2/4: provider transport error: connection reset"
    );
    assert!(std::error::Error::source(&error).is_some());
}
