use async_trait::async_trait;

use crate::core::error::ProviderError;
use crate::core::types::{CompletionRequest, CompletionResponse};

/// Completion provider contract used by the request handler.
///
/// Implementations own auth, transport and wire translation; the handler only
/// sees canonical request/response types.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Executes a single non-streaming completion.
    async fn complete(&self, req: &CompletionRequest)
    -> Result<CompletionResponse, ProviderError>;
}

#[cfg(test)]
mod tests;
