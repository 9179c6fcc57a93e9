//! Per-content-block translators
//!
//! One pure function per source block kind; each yields at most one target
//! part. Unsupported subtypes drop silently — no part, no error.

use axon_signature::SignatureStore;
use serde_json::Value;

use crate::protocol::antigravity::{FunctionCall, FunctionResponse, InlineData, Part};
use crate::protocol::claude::{ClaudeContentBlock, ClaudeImageSource};

/// Signature stamped on function calls when no continuity is available
pub(crate) const SKIP_SIGNATURE_SENTINEL: &str = "skip_thought_signature_validator";

/// State threaded through the content blocks of one request
pub(crate) struct TranslationState<'a> {
    /// Target model identifier
    pub model: &'a str,
    /// Continuity token store
    pub signatures: &'a SignatureStore,
    /// Most recent validated thought signature within the current message,
    /// stamped onto subsequent tool-use parts
    pub current_message_signature: Option<String>,
    /// Cleared when an unsigned thinking block is dropped; suppresses
    /// budget-based thinking config for the remainder of the request
    pub thought_translation_enabled: bool,
}

impl<'a> TranslationState<'a> {
    pub fn new(model: &'a str, signatures: &'a SignatureStore) -> Self {
        Self {
            model,
            signatures,
            current_message_signature: None,
            thought_translation_enabled: true,
        }
    }

    /// Reset per-message state at a message boundary
    pub fn start_message(&mut self) {
        self.current_message_signature = None;
    }
}

/// Translate one content block into at most one target part
pub(crate) fn translate_block(
    block: &ClaudeContentBlock,
    state: &mut TranslationState<'_>,
) -> Option<Part> {
    match block {
        ClaudeContentBlock::Text { text } => Some(Part::text(text.clone())),
        ClaudeContentBlock::Thinking {
            thinking,
            text,
            signature,
        } => translate_thinking(thinking, text, signature.as_deref(), state),
        ClaudeContentBlock::ToolUse { id, name, input } => {
            translate_tool_use(id, name, input, state)
        }
        ClaudeContentBlock::ToolResult {
            tool_use_id,
            content,
        } => translate_tool_result(tool_use_id, content.as_ref()),
        ClaudeContentBlock::Image { source } => translate_image(source),
        ClaudeContentBlock::Other => None,
    }
}

/// Resolve a thinking block's continuity signature and emit a thought part
///
/// Preference order: a store lookup by (model, thinking text), then a
/// client-supplied `"<model>#<token>"` signature whose token validates.
/// Without either the block is dropped and thought translation is disabled
/// for the rest of the request.
fn translate_thinking(
    thinking: &str,
    text: &str,
    client_signature: Option<&str>,
    state: &mut TranslationState<'_>,
) -> Option<Part> {
    let thinking_text = if thinking.is_empty() { text } else { thinking };

    let mut signature = String::new();
    if !thinking_text.is_empty()
        && let Some(cached) = state.signatures.lookup(state.model, thinking_text)
    {
        signature = cached;
    }

    if signature.is_empty()
        && let Some(client) = client_signature
        && let Some((model, token)) = client.split_once('#')
        && model == state.model
        && state.signatures.validate(state.model, token)
    {
        signature = token.to_owned();
    }

    if !state.signatures.validate(state.model, &signature) {
        tracing::warn!(model = state.model, "dropping unsigned thinking block");
        state.thought_translation_enabled = false;
        return None;
    }

    state.current_message_signature = Some(signature.clone());
    Some(Part {
        text: Some(thinking_text.to_owned()),
        thought: Some(true),
        thought_signature: Some(signature),
        ..Part::default()
    })
}

/// Emit a function-call part, stamping it with the current message's thought
/// signature when one validated, or the skip sentinel otherwise
fn translate_tool_use(
    id: &str,
    name: &str,
    input: &Value,
    state: &TranslationState<'_>,
) -> Option<Part> {
    // The wire requires a JSON object; tolerate string-encoded objects
    let args = match input {
        Value::Object(_) => input.clone(),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(parsed @ Value::Object(_)) => parsed,
            _ => return None,
        },
        _ => return None,
    };

    let signature = state
        .current_message_signature
        .as_deref()
        .filter(|signature| state.signatures.validate(state.model, signature))
        .unwrap_or(SKIP_SIGNATURE_SENTINEL);

    Some(Part {
        thought_signature: Some(signature.to_owned()),
        function_call: Some(FunctionCall {
            id: (!id.is_empty()).then(|| id.to_owned()),
            name: name.to_owned(),
            args,
        }),
        ..Part::default()
    })
}

/// Wrap a tool result as a function response
fn translate_tool_result(tool_use_id: &str, content: Option<&Value>) -> Option<Part> {
    if tool_use_id.is_empty() {
        return None;
    }

    let mut response = serde_json::Map::new();
    if let Some(content) = content {
        let result = match content {
            // A single-element block array unwraps to its sole element
            Value::Array(items) if items.len() == 1 => items[0].clone(),
            other => other.clone(),
        };
        response.insert("result".to_owned(), result);
    }

    Some(Part {
        function_response: Some(FunctionResponse {
            id: tool_use_id.to_owned(),
            name: function_name_from_tool_use_id(tool_use_id),
            response: Value::Object(response),
        }),
        ..Part::default()
    })
}

/// Derive the function name from a tool-use id by stripping its trailing two
/// dash-delimited segments (`call-abc-123-456` → `call-abc`), the source
/// format's id-encoding convention
pub(crate) fn function_name_from_tool_use_id(tool_use_id: &str) -> String {
    let segments: Vec<&str> = tool_use_id.split('-').collect();
    if segments.len() > 1 {
        segments[..segments.len() - 2].join("-")
    } else {
        tool_use_id.to_owned()
    }
}

/// Only base64-encoded image sources are supported
fn translate_image(source: &ClaudeImageSource) -> Option<Part> {
    if source.source_type != "base64" {
        return None;
    }
    Some(Part {
        inline_data: Some(InlineData {
            mime_type: source.media_type.clone(),
            data: source.data.clone(),
        }),
        ..Part::default()
    })
}
