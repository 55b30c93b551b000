use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("credential missing [env={env_var}]")]
    MissingCredential { env_var: String },
    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
    #[error("invalid timeout: {timeout_ms} ms")]
    InvalidTimeout { timeout_ms: u64 },
    #[error("invalid retry policy: {reason}")]
    InvalidRetryPolicy { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error(
        "provider credentials rejected{context}: {message}",
        context = format_context(None, .request_id.as_deref(), None)
    )]
    CredentialsRejected {
        request_id: Option<String>,
        message: String,
    },
    #[error(
        "provider transport error{context}: {message}",
        context = format_context(None, .request_id.as_deref(), None)
    )]
    Transport {
        request_id: Option<String>,
        message: String,
    },
    #[error(
        "provider status error{context}: {message}",
        context = format_context(.model.as_deref(), .request_id.as_deref(), Some(*.status_code))
    )]
    Status {
        model: Option<String>,
        status_code: u16,
        request_id: Option<String>,
        message: String,
    },
    #[error(
        "provider protocol error{context}: {message}",
        context = format_context(.model.as_deref(), .request_id.as_deref(), None)
    )]
    Protocol {
        model: Option<String>,
        request_id: Option<String>,
        message: String,
    },
    #[error(
        "provider serialization error{context}: {message}",
        context = format_context(.model.as_deref(), .request_id.as_deref(), None)
    )]
    Serialization {
        model: Option<String>,
        request_id: Option<String>,
        message: String,
    },
}

/// Failures surfaced by the request handler. Every variant is rendered into
/// the same `{"error": ...}` envelope; only the status code differs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("malformed request body: {message}")]
    MalformedBody { message: String },
    #[error("request body exceeds {limit_bytes} bytes")]
    BodyTooLarge { limit_bytes: usize },
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("unsupported method: {method}")]
    UnsupportedMethod { method: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("response serialization error: {message}")]
    Serialization { message: String },
}

/// Failures of the subtitle pipeline. Block numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SrtError {
    #[error("invalid SRT block format at block {block}")]
    InvalidBlock { block: usize },
    #[error("invalid time format at block {block}")]
    InvalidTimecode { block: usize },
    #[error("invalid data dictionary: {message}")]
    InvalidDictionary { message: String },
    #[error("translation to {language} failed at chunk {chunk}/{chunks}: {source}")]
    Translation {
        language: String,
        chunk: usize,
        chunks: usize,
        source: ProviderError,
    },
}

/// How handler errors are turned into HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusMapping {
    /// Client, upstream and internal failures get distinct codes.
    #[default]
    Classified,
    /// Every failure is a 500, for callers that only check for success.
    Uniform,
}

impl StatusMapping {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "classified" => Some(Self::Classified),
            "uniform" => Some(Self::Uniform),
            _ => None,
        }
    }
}

impl HandlerError {
    pub fn status_code(&self, mapping: StatusMapping) -> u16 {
        if mapping == StatusMapping::Uniform {
            return 500;
        }

        match self {
            Self::MalformedBody { .. } | Self::InvalidField { .. } => 400,
            Self::BodyTooLarge { .. } => 413,
            Self::UnsupportedMethod { .. } => 405,
            Self::Provider(_) => 502,
            Self::Serialization { .. } => 500,
        }
    }

    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

fn format_context(
    model: Option<&str>,
    request_id: Option<&str>,
    status_code: Option<u16>,
) -> String {
    let mut context = Vec::new();

    if let Some(model) = model {
        context.push(format!("model={model}"));
    }
    if let Some(request_id) = request_id {
        context.push(format!("request_id={request_id}"));
    }
    if let Some(status_code) = status_code {
        context.push(format!("status_code={status_code}"));
    }

    if context.is_empty() {
        String::new()
    } else {
        format!(" [{}]", context.join(", "))
    }
}

#[cfg(test)]
mod tests;
