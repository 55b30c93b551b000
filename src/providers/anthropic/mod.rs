use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::core::error::{ConfigError, ProviderError};
use crate::core::traits::CompletionProvider;
use crate::core::types::{CompletionRequest, CompletionResponse};
use crate::providers::anthropic_translate::{
    AnthropicTranslator, format_anthropic_error_message, parse_anthropic_error_envelope,
};
use crate::providers::translator_contract::ProviderTranslator;
use crate::transport::http::{HttpTransport, RetryPolicy};

pub const ANTHROPIC_DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const HEADER_API_KEY: &str = "x-api-key";
const HEADER_ANTHROPIC_VERSION: &str = "anthropic-version";
const HEADER_REQUEST_ID: &str = "request-id";

pub struct AnthropicClient {
    transport: HttpTransport,
    translator: AnthropicTranslator,
    base_url: String,
    headers: HeaderMap,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::with_base_url(api_key, ANTHROPIC_DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(DEFAULT_TIMEOUT_MS, RetryPolicy::default())?;
        Self::with_transport(api_key, base_url, transport)
    }

    pub fn with_transport(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        transport: HttpTransport,
    ) -> Result<Self, ConfigError> {
        let api_key = sanitize_api_key(api_key.into()).ok_or_else(|| {
            ConfigError::MissingCredential {
                env_var: ANTHROPIC_API_KEY_ENV.to_string(),
            }
        })?;

        Ok(Self {
            transport,
            translator: AnthropicTranslator,
            base_url: normalize_base_url(base_url),
            headers: build_headers(&api_key)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn normalize_transport_error(error: ProviderError, requested_model: &str) -> ProviderError {
        let (status_code, request_id, message) = match error {
            ProviderError::Status {
                status_code,
                request_id,
                message,
                ..
            } => (status_code, request_id, message),
            other => return other,
        };

        let (request_id, message) = match parse_anthropic_error_envelope(&message) {
            Some(envelope) => (
                request_id.or_else(|| envelope.request_id.clone()),
                format_anthropic_error_message(&envelope),
            ),
            None => (request_id, message),
        };

        if status_code == 401 {
            return ProviderError::CredentialsRejected {
                request_id,
                message,
            };
        }

        ProviderError::Status {
            model: Some(requested_model.to_string()),
            status_code,
            request_id,
            message,
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(
        &self,
        req: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = self.translator.encode_request(req)?;
        let request_id_header = HeaderName::from_static(HEADER_REQUEST_ID);

        debug!(model = %req.model, max_tokens = req.max_tokens, "sending anthropic messages request");

        let response_body: Value = self
            .transport
            .post_json(
                Some(req.model.as_str()),
                &self.messages_url(),
                &body,
                &self.headers,
                Some(&request_id_header),
            )
            .await
            .map_err(|error| Self::normalize_transport_error(error, &req.model))?;

        self.translator.decode_response(&response_body)
    }
}

fn build_headers(api_key: &str) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    let mut api_key_value =
        HeaderValue::from_str(api_key).map_err(|error| ConfigError::InvalidSetting {
            key: ANTHROPIC_API_KEY_ENV.to_string(),
            reason: format!("not a valid header value: {error}"),
        })?;
    api_key_value.set_sensitive(true);

    headers.insert(HeaderName::from_static(HEADER_API_KEY), api_key_value);
    headers.insert(
        HeaderName::from_static(HEADER_ANTHROPIC_VERSION),
        HeaderValue::from_static(ANTHROPIC_VERSION),
    );
    Ok(headers)
}

fn normalize_base_url(base_url: impl Into<String>) -> String {
    let value = base_url.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return ANTHROPIC_DEFAULT_BASE_URL.to_string();
    }

    trimmed.trim_end_matches('/').to_string()
}

fn sanitize_api_key(api_key: String) -> Option<String> {
    let trimmed = api_key.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
