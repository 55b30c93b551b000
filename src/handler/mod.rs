//! Request handler: one HTTP event in, one HTTP response out.
//!
//! `OPTIONS` is answered locally. Every other method is parsed, validated,
//! turned into a single-message completion call and answered with
//! `{"translated_text": ...}` or the `{"error": ...}` envelope.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::HandlerConfig;
use crate::core::error::{ConfigError, HandlerError, ProviderError, StatusMapping};
use crate::core::traits::CompletionProvider;
use crate::core::types::{
    CompletionRequest, ErrorEnvelope, HttpEvent, HttpResponse, PreflightAck, TranslationRequest,
    TranslationResponse, ValidatedTranslation,
};
use crate::providers::anthropic::AnthropicClient;
use crate::transport::http::{HttpTransport, RetryPolicy};

pub const ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";
pub const ALLOW_METHODS: &str = "OPTIONS,POST";
pub const CONTENT_TYPE_JSON: &str = "application/json";

const FALLBACK_ERROR_BODY: &str = r#"{"error":"failed to serialize response"}"#;

pub fn build_translation_prompt(target_language: &str, text: &str) -> String {
    format!("Translate the following text to {target_language}: {text}")
}

/// Header set attached to every response, success or failure.
pub fn cors_headers(allow_origin: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "Access-Control-Allow-Origin".to_string(),
            allow_origin.to_string(),
        ),
        (
            "Access-Control-Allow-Headers".to_string(),
            ALLOW_HEADERS.to_string(),
        ),
        (
            "Access-Control-Allow-Methods".to_string(),
            ALLOW_METHODS.to_string(),
        ),
        ("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()),
    ])
}

/// Anthropic client wired with the configured timeout and retry budget.
pub fn build_provider(config: &HandlerConfig) -> Result<Arc<dyn CompletionProvider>, ConfigError> {
    let transport = HttpTransport::new(
        config.timeout_ms,
        RetryPolicy::with_max_attempts(config.max_attempts),
    )?;
    let client = AnthropicClient::with_transport(
        config.api_key.as_str(),
        config.base_url.as_str(),
        transport,
    )?;

    Ok(Arc::new(client))
}

/// Sends one translation prompt and returns the first text segment of the reply.
pub async fn request_translation(
    provider: &dyn CompletionProvider,
    model: &str,
    max_tokens: u32,
    target_language: &str,
    text: &str,
) -> Result<String, ProviderError> {
    let prompt = build_translation_prompt(target_language, text);
    let request = CompletionRequest::user_prompt(model, max_tokens, prompt);

    let response = provider.complete(&request).await?;
    let text = response.first_text().ok_or_else(|| ProviderError::Protocol {
        model: Some(response.model.clone()),
        request_id: response.id.clone(),
        message: "completion response contained no text content".to_string(),
    })?;

    Ok(text.to_string())
}

pub struct TranslationHandler {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    max_output_tokens: u32,
    allow_origin: String,
    status_mapping: StatusMapping,
}

impl TranslationHandler {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &HandlerConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            allow_origin: config.allow_origin.clone(),
            status_mapping: config.status_mapping,
        }
    }

    /// Builds an Anthropic-backed handler from configuration.
    pub fn from_config(config: &HandlerConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(build_provider(config)?, config))
    }

    pub async fn handle(&self, event: &HttpEvent) -> HttpResponse {
        if event.is_preflight() {
            return self.preflight();
        }

        debug!(method = %event.http_method, provider = self.provider.name(), "dispatching translation");

        match self.translate_event(event).await {
            Ok(response) => response,
            Err(error) => self.error_response(&error),
        }
    }

    pub fn preflight(&self) -> HttpResponse {
        self.json_response(200, &PreflightAck::default())
            .unwrap_or_else(|error| self.error_response(&error))
    }

    async fn translate_event(&self, event: &HttpEvent) -> Result<HttpResponse, HandlerError> {
        if !event.http_method.eq_ignore_ascii_case("POST") {
            return Err(HandlerError::UnsupportedMethod {
                method: event.http_method.clone(),
            });
        }

        let translation = parse_body(event.body.as_deref())?.validate()?;
        let translated_text = self.translate(&translation).await?;

        self.json_response(200, &TranslationResponse { translated_text })
    }

    async fn translate(&self, translation: &ValidatedTranslation) -> Result<String, HandlerError> {
        let text = request_translation(
            self.provider.as_ref(),
            &self.model,
            self.max_output_tokens,
            &translation.target_language,
            &translation.text,
        )
        .await?;

        Ok(text)
    }

    fn json_response<T: Serialize>(
        &self,
        status_code: u16,
        payload: &T,
    ) -> Result<HttpResponse, HandlerError> {
        let body = serde_json::to_string(payload).map_err(|error| HandlerError::Serialization {
            message: error.to_string(),
        })?;

        Ok(HttpResponse {
            status_code,
            headers: cors_headers(&self.allow_origin),
            body,
        })
    }

    /// Renders `error` into the `{"error": ...}` envelope with CORS headers.
    pub fn error_response(&self, error: &HandlerError) -> HttpResponse {
        let status_code = error.status_code(self.status_mapping);
        warn!(status_code, %error, "translation request failed");

        let envelope = ErrorEnvelope {
            error: error.to_string(),
        };
        let body =
            serde_json::to_string(&envelope).unwrap_or_else(|_| FALLBACK_ERROR_BODY.to_string());

        HttpResponse {
            status_code,
            headers: cors_headers(&self.allow_origin),
            body,
        }
    }
}

fn parse_body(body: Option<&str>) -> Result<TranslationRequest, HandlerError> {
    let body = body.ok_or_else(|| HandlerError::MalformedBody {
        message: "request body is empty".to_string(),
    })?;

    serde_json::from_str(body).map_err(|error| HandlerError::MalformedBody {
        message: error.to_string(),
    })
}
