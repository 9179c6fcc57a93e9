//! Claude Messages API wire format types (source dialect)
//!
//! Fields default aggressively: the upstream clients in the wild omit and
//! mistype liberally, and a missing field should degrade to a dropped block
//! rather than a failed request.

use serde::{Deserialize, Serialize};

// -- Request types --

/// Claude messages API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeRequest {
    /// Model identifier (informational; the gateway routes by its own model)
    #[serde(default)]
    pub model: String,
    /// System prompt (top-level, not in messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<ClaudeSystem>,
    /// Conversation messages
    #[serde(default)]
    pub messages: Vec<ClaudeMessage>,
    /// Tool definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ClaudeTool>>,
    /// Extended thinking directive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ClaudeThinking>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<f64>,
    /// Request metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClaudeMetadata>,
}

/// System prompt: plain string shorthand or an array of typed items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaudeSystem {
    /// Plain text
    Text(String),
    /// Ordered typed items; only `text` entries contribute
    Items(Vec<ClaudeSystemItem>),
}

/// Typed entry in a system item array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeSystemItem {
    /// Item type (only "text" entries contribute)
    #[serde(rename = "type", default)]
    pub item_type: String,
    /// Text payload
    #[serde(default)]
    pub text: String,
}

/// Claude message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeMessage {
    /// Role ("user" or "assistant")
    #[serde(default)]
    pub role: String,
    /// Content blocks
    pub content: ClaudeContent,
}

/// Claude content can be a string or an array of content blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaudeContent {
    /// Plain text (shorthand)
    Text(String),
    /// Array of content blocks
    Blocks(Vec<ClaudeContentBlock>),
}

/// Content block in a Claude message
///
/// A closed sum: a new block kind is a deliberate, compile-checked addition
/// to every match over this enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeContentBlock {
    /// Text content
    Text {
        /// The text string
        #[serde(default)]
        text: String,
    },
    /// Extended thinking content
    Thinking {
        /// Thinking text
        #[serde(default)]
        thinking: String,
        /// Some clients put the thinking text here instead
        #[serde(default)]
        text: String,
        /// Client-supplied continuity signature (`"<model>#<token>"`)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    /// Tool use request from the assistant
    ToolUse {
        /// Tool use identifier
        #[serde(default)]
        id: String,
        /// Tool name
        #[serde(default)]
        name: String,
        /// Tool input as JSON (occasionally string-encoded JSON)
        #[serde(default)]
        input: serde_json::Value,
    },
    /// Tool result from the user
    ToolResult {
        /// Tool use ID this result responds to
        #[serde(default)]
        tool_use_id: String,
        /// Result content: string, block array, or object
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<serde_json::Value>,
    },
    /// Image content
    Image {
        /// Image source
        source: ClaudeImageSource,
    },
    /// Unknown block kinds are tolerated and dropped during translation
    #[serde(other)]
    Other,
}

/// Claude image source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeImageSource {
    /// Source type; only "base64" is translatable
    #[serde(rename = "type", default)]
    pub source_type: String,
    /// Media type (e.g. "image/png")
    #[serde(default)]
    pub media_type: String,
    /// Base64-encoded data
    #[serde(default)]
    pub data: String,
}

/// Claude tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeTool {
    /// Tool name
    #[serde(default)]
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for input parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
    /// Behavior tag forwarded verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,
}

/// Extended thinking directive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeThinking {
    /// Mode: "disabled", "enabled", or "adaptive"
    #[serde(rename = "type", default)]
    pub mode: String,
    /// Token budget; negative values request dynamic budgeting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_tokens: Option<i64>,
}

/// Claude request metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeMetadata {
    /// Opaque user/session identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_accepts_string_shorthand() {
        let msg: ClaudeMessage =
            serde_json::from_value(serde_json::json!({"role": "user", "content": "hi"})).unwrap();
        assert!(matches!(msg.content, ClaudeContent::Text(ref t) if t == "hi"));
    }

    #[test]
    fn content_accepts_block_arrays() {
        let msg: ClaudeMessage = serde_json::from_value(serde_json::json!({
            "role": "assistant",
            "content": [
                {"type": "text", "text": "hello"},
                {"type": "tool_use", "id": "call-a-1-2", "name": "lookup", "input": {}}
            ]
        }))
        .unwrap();
        let ClaudeContent::Blocks(blocks) = msg.content else {
            panic!("expected blocks");
        };
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[1], ClaudeContentBlock::ToolUse { .. }));
    }

    #[test]
    fn unknown_block_kinds_deserialize_to_other() {
        let block: ClaudeContentBlock =
            serde_json::from_value(serde_json::json!({"type": "document", "data": "..."})).unwrap();
        assert!(matches!(block, ClaudeContentBlock::Other));
    }

    #[test]
    fn system_accepts_both_shapes() {
        let text: ClaudeSystem = serde_json::from_value(serde_json::json!("be brief")).unwrap();
        assert!(matches!(text, ClaudeSystem::Text(_)));

        let items: ClaudeSystem =
            serde_json::from_value(serde_json::json!([{"type": "text", "text": "be brief"}])).unwrap();
        assert!(matches!(items, ClaudeSystem::Items(ref list) if list.len() == 1));
    }
}
