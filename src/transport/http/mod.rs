use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::error::{ConfigError, ProviderError};

const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub retryable_status_codes: Vec<u16>,
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: "max_attempts must be >= 1".to_string(),
            });
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: "max_backoff_ms must be >= initial_backoff_ms".to_string(),
            });
        }
        if let Some(status) = self
            .retryable_status_codes
            .iter()
            .copied()
            .find(|status| !(100..=599).contains(status))
        {
            return Err(ConfigError::InvalidRetryPolicy {
                reason: format!("retryable status code must be in 100..=599: {status}"),
            });
        }
        Ok(())
    }

    fn should_retry_status(&self, status_code: u16) -> bool {
        self.retryable_status_codes.contains(&status_code)
    }

    fn backoff_duration_for_retry(&self, retry_index: u32) -> Duration {
        let shift = retry_index.min(63);
        let multiplier = 1_u64.checked_shl(shift).unwrap_or(u64::MAX);
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(multiplier)
            .min(self.max_backoff_ms);
        Duration::from_millis(backoff_ms)
    }
}

/// Single attempt; retries are opt-in through `max_attempts`.
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 100,
            max_backoff_ms: 2_000,
            retryable_status_codes: vec![408, 429, 500, 502, 503, 504, 529],
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    retry_policy: RetryPolicy,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(timeout_ms: u64, retry_policy: RetryPolicy) -> Result<Self, ConfigError> {
        Self::with_client(reqwest::Client::new(), timeout_ms, retry_policy)
    }

    pub fn with_client(
        client: reqwest::Client,
        timeout_ms: u64,
        retry_policy: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        Self::validate_timeout(timeout_ms)?;
        retry_policy.validate()?;

        Ok(Self {
            client,
            retry_policy,
            timeout_ms,
        })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// POSTs `body` as JSON and decodes a JSON response.
    ///
    /// `request_id_header` names the response header carrying the upstream
    /// request id; `x-request-id` is used when `None`.
    pub async fn post_json<TReq, TResp>(
        &self,
        model: Option<&str>,
        url: &str,
        body: &TReq,
        headers: &HeaderMap,
        request_id_header: Option<&HeaderName>,
    ) -> Result<TResp, ProviderError>
    where
        TReq: Serialize + ?Sized,
        TResp: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|error| ProviderError::Serialization {
            model: model.map(str::to_string),
            request_id: None,
            message: error.to_string(),
        })?;

        let request_id_header = request_id_header
            .cloned()
            .unwrap_or_else(|| HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER));
        let model_owned = model.map(str::to_string);

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let request_builder = self
                .client
                .post(url)
                .timeout(Duration::from_millis(self.timeout_ms))
                .headers(headers.clone())
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(payload.clone());

            match request_builder.send().await {
                Ok(response) => {
                    let status_code = response.status().as_u16();
                    let request_id = extract_request_id(response.headers(), &request_id_header);

                    if !response.status().is_success() {
                        let status_error = build_status_error(
                            model_owned.as_deref(),
                            status_code,
                            request_id,
                            response,
                        )
                        .await;

                        if attempt < self.retry_policy.max_attempts
                            && self.retry_policy.should_retry_status(status_code)
                        {
                            debug!(attempt, status_code, "retrying after status error");
                            self.sleep_before_retry(attempt).await;
                            continue;
                        }

                        return Err(status_error);
                    }

                    let parsed = response.json::<TResp>().await.map_err(|error| {
                        ProviderError::Serialization {
                            model: model_owned.clone(),
                            request_id,
                            message: error.to_string(),
                        }
                    })?;

                    return Ok(parsed);
                }
                Err(error) => {
                    let transport_error = ProviderError::Transport {
                        request_id: None,
                        message: error.to_string(),
                    };

                    if attempt < self.retry_policy.max_attempts && is_retryable_transport(&error) {
                        debug!(attempt, %error, "retrying after transport error");
                        self.sleep_before_retry(attempt).await;
                        continue;
                    }

                    return Err(transport_error);
                }
            }
        }
    }

    fn validate_timeout(timeout_ms: u64) -> Result<(), ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout { timeout_ms });
        }
        Ok(())
    }

    async fn sleep_before_retry(&self, attempt: u32) {
        let retry_index = attempt.saturating_sub(1);
        let backoff = self.retry_policy.backoff_duration_for_retry(retry_index);
        tokio::time::sleep(backoff).await;
    }
}

async fn build_status_error(
    model: Option<&str>,
    status_code: u16,
    request_id: Option<String>,
    response: Response,
) -> ProviderError {
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        Ok(_) => format!("http status {status_code}"),
        Err(error) => {
            format!("http status {status_code}; failed to read response body: {error}")
        }
    };

    ProviderError::Status {
        model: model.map(str::to_string),
        status_code,
        request_id,
        message,
    }
}

fn extract_request_id(headers: &HeaderMap, request_id_header: &HeaderName) -> Option<String> {
    headers
        .get(request_id_header)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn is_retryable_transport(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}
