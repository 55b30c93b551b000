use crate::core::error::ProviderError;
use crate::core::types::{CompletionRequest, CompletionResponse};

/// Internal provider-layer translation contract.
///
/// `CompletionProvider` is the handler-facing extension point (auth, transport).
/// This contract is crate-private and maps canonical completion types to a
/// provider wire payload and back.
pub(crate) trait ProviderTranslator {
    /// Provider protocol payload used for outbound request encoding.
    type RequestPayload;

    /// Provider protocol payload used for inbound response decoding.
    type ResponsePayload;

    fn encode_request(
        &self,
        req: &CompletionRequest,
    ) -> Result<Self::RequestPayload, ProviderError>;

    fn decode_response(
        &self,
        payload: &Self::ResponsePayload,
    ) -> Result<CompletionResponse, ProviderError>;
}
