use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::*;
use crate::core::types::{ContentPart, FinishReason, Usage};

#[derive(Clone, Default)]
struct EchoProvider {
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

#[async_trait]
impl CompletionProvider for EchoProvider {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn complete(
        &self,
        req: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls
            .lock()
            .expect("calls lock should not be poisoned")
            .push(req.clone());

        let text = req
            .messages
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: None,
            model: req.model.clone(),
            content: vec![ContentPart::Text { text }],
            finish_reason: Some(FinishReason::Stop),
            usage: Usage::default(),
        })
    }
}

#[tokio::test]
async fn test_provider_is_object_safe_behind_arc() {
    let echo = EchoProvider::default();
    let provider: Arc<dyn CompletionProvider> = Arc::new(echo.clone());

    let response = provider
        .complete(&CompletionRequest::user_prompt("echo-model", 8, "ping"))
        .await
        .expect("echo should succeed");

    assert_eq!(provider.name(), "echo");
    assert_eq!(response.model, "echo-model");
    assert_eq!(response.first_text(), Some("ping"));
    assert_eq!(echo.calls.lock().expect("calls lock").len(), 1);
}
