use serde_json::{Map, Value, json};

use crate::core::error::ProviderError;
use crate::core::types::{
    CompletionRequest, CompletionResponse, ContentPart, FinishReason, Usage,
};
use crate::providers::translator_contract::ProviderTranslator;

/*
Anthropic Messages mapping:
- Encoded: model, max_tokens, messages (string content per message).
- Decoded: id, model, content blocks (text kept, other types recorded by kind),
  stop_reason, usage.input_tokens/output_tokens.
- Hard errors: empty model, max_tokens of 0, empty messages, non-object payload,
  missing or malformed content array, text block without text.
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnthropicErrorEnvelope {
    pub error_type: Option<String>,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct AnthropicTranslator;

impl ProviderTranslator for AnthropicTranslator {
    type RequestPayload = Value;
    type ResponsePayload = Value;

    fn encode_request(
        &self,
        req: &CompletionRequest,
    ) -> Result<Self::RequestPayload, ProviderError> {
        encode_anthropic_request(req)
    }

    fn decode_response(
        &self,
        payload: &Self::ResponsePayload,
    ) -> Result<CompletionResponse, ProviderError> {
        decode_anthropic_response(payload)
    }
}

pub(crate) fn encode_anthropic_request(req: &CompletionRequest) -> Result<Value, ProviderError> {
    if req.model.trim().is_empty() {
        return Err(protocol_error(None, "missing model"));
    }
    if req.max_tokens == 0 {
        return Err(protocol_error(
            Some(&req.model),
            "max_tokens must be at least 1 for Anthropic",
        ));
    }
    if req.messages.is_empty() {
        return Err(protocol_error(Some(&req.model), "empty messages"));
    }

    let messages = req
        .messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role.as_str(),
                "content": message.content,
            })
        })
        .collect();

    let mut body = Map::new();
    body.insert("model".to_string(), Value::String(req.model.clone()));
    body.insert("max_tokens".to_string(), Value::Number(req.max_tokens.into()));
    body.insert("messages".to_string(), Value::Array(messages));

    Ok(Value::Object(body))
}

pub(crate) fn decode_anthropic_response(payload: &Value) -> Result<CompletionResponse, ProviderError> {
    let root = payload
        .as_object()
        .ok_or_else(|| protocol_error(None, "anthropic response payload must be a JSON object"))?;

    let model = root
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or("<unknown-model>")
        .to_string();

    let content_blocks = root
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| protocol_error(Some(&model), "anthropic response missing content array"))?;

    let mut content = Vec::with_capacity(content_blocks.len());
    for block in content_blocks {
        let block_obj = block.as_object().ok_or_else(|| {
            protocol_error(Some(&model), "anthropic content block must be object")
        })?;
        let block_type = block_obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| protocol_error(Some(&model), "anthropic content block missing type"))?;

        if block_type == "text" {
            let text = block_obj
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| protocol_error(Some(&model), "text content block missing text"))?;
            content.push(ContentPart::Text {
                text: text.to_string(),
            });
        } else {
            content.push(ContentPart::Other {
                kind: block_type.to_string(),
            });
        }
    }

    let finish_reason = root
        .get("stop_reason")
        .and_then(Value::as_str)
        .map(map_finish_reason);

    Ok(CompletionResponse {
        id: root.get("id").and_then(Value::as_str).map(str::to_string),
        usage: decode_usage(root.get("usage")),
        model,
        content,
        finish_reason,
    })
}

pub(crate) fn parse_anthropic_error_envelope(body: &str) -> Option<AnthropicErrorEnvelope> {
    let payload = serde_json::from_str::<Value>(body).ok()?;
    let root = payload.as_object()?;

    let error_obj = root.get("error")?.as_object()?;
    let message = error_obj
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)?;

    let error_type = error_obj
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string);
    let request_id = root
        .get("request_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(AnthropicErrorEnvelope {
        error_type,
        message,
        request_id,
    })
}

pub(crate) fn format_anthropic_error_message(envelope: &AnthropicErrorEnvelope) -> String {
    match &envelope.error_type {
        Some(error_type) => format!("anthropic error: {} [type={error_type}]", envelope.message),
        None => format!("anthropic error: {}", envelope.message),
    }
}

fn map_finish_reason(stop_reason: &str) -> FinishReason {
    match stop_reason {
        "end_turn" | "stop_sequence" => FinishReason::Stop,
        "max_tokens" => FinishReason::Length,
        "refusal" => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    }
}

// Usage is informational only; absent or odd values decode as unknown.
fn decode_usage(usage_value: Option<&Value>) -> Usage {
    let Some(usage_obj) = usage_value.and_then(Value::as_object) else {
        return Usage::default();
    };

    Usage {
        input_tokens: usage_obj.get("input_tokens").and_then(Value::as_u64),
        output_tokens: usage_obj.get("output_tokens").and_then(Value::as_u64),
    }
}

fn protocol_error(model: Option<&str>, message: impl Into<String>) -> ProviderError {
    ProviderError::Protocol {
        model: model.map(str::to_string),
        request_id: None,
        message: message.into(),
    }
}
