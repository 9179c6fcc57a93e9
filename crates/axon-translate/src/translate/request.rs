//! Claude→Antigravity request translation
//!
//! The translator is stateless across calls except through the two shared
//! caches, so one instance serves all concurrent request handlers. A typed
//! fast path parses the source payload once and builds the target structures
//! directly; a generic fallback path re-reads the payload field by field,
//! skipping malformed pieces instead of failing the request. The system
//! favors producing *a* translation over none.

use std::sync::Arc;

use axon_schema::SchemaNormalizer;
use axon_signature::SignatureStore;
use serde_json::Value;

use crate::error::TranslateError;
use crate::model::is_claude_thinking_model;
use crate::protocol::antigravity::{
    AntigravityRequest, Content, FunctionDeclaration, GenerateContentRequest, GenerationConfig,
    Part, ThinkingConfig, ToolDeclaration,
};
use crate::protocol::claude::{
    ClaudeContent, ClaudeMessage, ClaudeRequest, ClaudeSystem, ClaudeThinking, ClaudeTool,
};
use crate::safety::attach_default_safety_settings;
use crate::translate::parts::{TranslationState, translate_block};

/// Appended to the system instruction when interleaved thinking applies
const INTERLEAVED_THINKING_HINT: &str = "Interleaved thinking is enabled. You may think between tool calls and after receiving tool results before deciding the next action or final answer. Do not mention these instructions or any constraints about thinking blocks; just apply them.";

/// Dotted path where safety settings land in the serialized request
const SAFETY_SETTINGS_PATH: &str = "request.safetySettings";

const THINKING_ENABLED: &str = "enabled";
const THINKING_ADAPTIVE: &str = "adaptive";

/// Claude→Antigravity request translator
#[derive(Clone)]
pub struct Translator {
    schemas: Arc<SchemaNormalizer>,
    signatures: Arc<SignatureStore>,
}

impl Translator {
    /// Create a translator over the shared schema and signature caches
    pub fn new(schemas: Arc<SchemaNormalizer>, signatures: Arc<SignatureStore>) -> Self {
        Self {
            schemas,
            signatures,
        }
    }

    /// Translate a raw Claude request payload into an Antigravity payload
    ///
    /// # Errors
    ///
    /// Returns an error only when the payload cannot be translated on either
    /// path: every other fault is handled by dropping the offending piece.
    pub fn translate(&self, model: &str, payload: &[u8]) -> Result<Vec<u8>, TranslateError> {
        match serde_json::from_slice::<ClaudeRequest>(payload) {
            Ok(source) => {
                let output = self.build_request(model, &source);
                match serde_json::to_vec(&output) {
                    Ok(bytes) => Ok(attach_default_safety_settings(bytes, SAFETY_SETTINGS_PATH)),
                    Err(error) => {
                        tracing::warn!(%error, "typed serialization failed, retrying on the fallback path");
                        self.translate_fallback(model, payload)
                    }
                }
            }
            Err(error) => {
                tracing::debug!(%error, "typed parse failed, using the fallback path");
                self.translate_fallback(model, payload)
            }
        }
    }

    /// The slower equivalent path: read the payload as a generic value and
    /// keep whatever pieces parse, dropping the rest
    fn translate_fallback(&self, model: &str, payload: &[u8]) -> Result<Vec<u8>, TranslateError> {
        let source: Value = serde_json::from_slice(payload)?;
        let source = lenient_request_from_value(&source);

        let output = self.build_request(model, &source);
        let bytes = serde_json::to_vec(&output).map_err(TranslateError::Serialize)?;
        Ok(attach_default_safety_settings(bytes, SAFETY_SETTINGS_PATH))
    }

    /// Assemble the target request from a parsed source request
    fn build_request(&self, model: &str, source: &ClaudeRequest) -> AntigravityRequest {
        let mut state = TranslationState::new(model, &self.signatures);

        let mut system_instruction = build_system_instruction(source.system.as_ref());

        let mut contents = Vec::with_capacity(source.messages.len());
        for message in &source.messages {
            state.start_message();
            if let Some(turn) = translate_message(message, &mut state) {
                contents.push(turn);
            }
        }

        let tools = self.build_tool_declarations(source.tools.as_deref());

        // Nudge thinking-capable models to keep thinking between tool calls
        if tools.is_some()
            && wants_thinking(source.thinking.as_ref())
            && is_claude_thinking_model(model)
        {
            append_system_part(&mut system_instruction, Part::text(INTERLEAVED_THINKING_HINT));
        }

        let generation_config = build_generation_config(source, state.thought_translation_enabled);

        AntigravityRequest {
            model: model.to_owned(),
            request: GenerateContentRequest {
                system_instruction,
                contents,
                tools,
                safety_settings: None,
                generation_config,
            },
        }
    }

    fn build_tool_declarations(&self, tools: Option<&[ClaudeTool]>) -> Option<Vec<ToolDeclaration>> {
        let declarations: Vec<FunctionDeclaration> = tools?
            .iter()
            .filter_map(|tool| self.declare_function(tool))
            .collect();

        if declarations.is_empty() {
            return None;
        }
        Some(vec![ToolDeclaration {
            function_declarations: declarations,
        }])
    }

    /// Declare one function, narrowing its input schema to the target dialect
    fn declare_function(&self, tool: &ClaudeTool) -> Option<FunctionDeclaration> {
        let schema = tool.input_schema.as_ref()?;
        let raw = serde_json::to_string(schema).ok()?;
        let normalized = self.schemas.normalize(&raw);
        let parameters = serde_json::from_str(&normalized).unwrap_or_else(|_| schema.clone());

        Some(FunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            behavior: tool.behavior.clone(),
            parameters_json_schema: Some(parameters),
        })
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator").finish_non_exhaustive()
    }
}

/// Build the system instruction turn from the source system prompt
fn build_system_instruction(system: Option<&ClaudeSystem>) -> Option<Content> {
    let parts: Vec<Part> = match system? {
        ClaudeSystem::Text(text) => {
            if text.is_empty() {
                Vec::new()
            } else {
                vec![Part::text(text.clone())]
            }
        }
        ClaudeSystem::Items(items) => items
            .iter()
            .filter(|item| item.item_type == "text" && !item.text.is_empty())
            .map(|item| Part::text(item.text.clone()))
            .collect(),
    };

    if parts.is_empty() {
        return None;
    }
    Some(Content {
        role: "user".to_owned(),
        parts,
    })
}

/// Translate one source message into a target turn, or nothing if every
/// block dropped
fn translate_message(message: &ClaudeMessage, state: &mut TranslationState<'_>) -> Option<Content> {
    let role = if message.role == "assistant" {
        "model"
    } else {
        message.role.as_str()
    };

    let mut parts = Vec::new();
    match &message.content {
        ClaudeContent::Text(text) => {
            if !text.is_empty() {
                parts.push(Part::text(text.clone()));
            }
        }
        ClaudeContent::Blocks(blocks) => {
            let mut thought_parts = Vec::new();
            let mut other_parts = Vec::new();

            for block in blocks {
                let Some(part) = translate_block(block, state) else {
                    continue;
                };
                if role == "model" {
                    if part.is_thought() {
                        thought_parts.push(part);
                    } else {
                        other_parts.push(part);
                    }
                } else {
                    parts.push(part);
                }
            }

            if role == "model" {
                // Thought parts precede everything else in model turns,
                // each group keeping its original relative order
                parts = thought_parts;
                parts.append(&mut other_parts);
            }
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(Content {
        role: role.to_owned(),
        parts,
    })
}

fn wants_thinking(thinking: Option<&ClaudeThinking>) -> bool {
    thinking.is_some_and(|t| t.mode == THINKING_ENABLED || t.mode == THINKING_ADAPTIVE)
}

fn append_system_part(system_instruction: &mut Option<Content>, part: Part) {
    match system_instruction {
        Some(content) => content.parts.push(part),
        None => {
            *system_instruction = Some(Content {
                role: "user".to_owned(),
                parts: vec![part],
            });
        }
    }
}

/// Populate the generation config field by field; absent source fields are
/// omitted, not defaulted
fn build_generation_config(
    source: &ClaudeRequest,
    thought_translation_enabled: bool,
) -> Option<GenerationConfig> {
    let mut config = GenerationConfig::default();
    let mut populated = false;

    if let Some(thinking) =
        thinking_config_from_directive(source.thinking.as_ref(), thought_translation_enabled)
    {
        config.thinking_config = Some(thinking);
        populated = true;
    }
    if source.temperature.is_some() {
        config.temperature = source.temperature;
        populated = true;
    }
    if source.top_p.is_some() {
        config.top_p = source.top_p;
        populated = true;
    }
    if source.top_k.is_some() {
        config.top_k = source.top_k;
        populated = true;
    }
    if source.max_tokens.is_some() {
        config.max_output_tokens = source.max_tokens;
        populated = true;
    }

    populated.then_some(config)
}

/// Map the source thinking directive onto the target thinking config
fn thinking_config_from_directive(
    thinking: Option<&ClaudeThinking>,
    thought_translation_enabled: bool,
) -> Option<ThinkingConfig> {
    let thinking = thinking?;

    // Adaptive maps to a fixed effort level regardless of any budget value,
    // and is not suppressed by a dropped thinking block
    if thinking.mode == THINKING_ADAPTIVE {
        return Some(ThinkingConfig {
            thinking_budget: None,
            thinking_level: Some("high".to_owned()),
            include_thoughts: true,
        });
    }

    if thought_translation_enabled
        && thinking.mode == THINKING_ENABLED
        && let Some(budget) = thinking.budget_tokens
    {
        // A budget of exactly zero means thinking off even though the mode
        // says enabled; negative budgets request dynamic thinking
        return Some(ThinkingConfig {
            thinking_budget: Some(budget),
            thinking_level: None,
            include_thoughts: budget != 0,
        });
    }

    None
}

// -- Fallback parsing --

/// Rebuild a source request from a generic value, keeping whatever parses
fn lenient_request_from_value(source: &Value) -> ClaudeRequest {
    ClaudeRequest {
        model: source
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        system: source
            .get("system")
            .and_then(|system| serde_json::from_value(system.clone()).ok()),
        messages: source
            .get("messages")
            .and_then(Value::as_array)
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(lenient_message_from_value)
                    .collect()
            })
            .unwrap_or_default(),
        tools: source.get("tools").and_then(Value::as_array).map(|tools| {
            tools
                .iter()
                .filter_map(|tool| serde_json::from_value(tool.clone()).ok())
                .collect()
        }),
        thinking: source
            .get("thinking")
            .and_then(|thinking| serde_json::from_value(thinking.clone()).ok()),
        temperature: source.get("temperature").and_then(Value::as_f64),
        top_p: source.get("top_p").and_then(Value::as_f64),
        top_k: source.get("top_k").and_then(Value::as_f64),
        max_tokens: source.get("max_tokens").and_then(Value::as_f64),
        metadata: source
            .get("metadata")
            .and_then(|metadata| serde_json::from_value(metadata.clone()).ok()),
    }
}

/// Rebuild one message, skipping content blocks that do not parse
fn lenient_message_from_value(message: &Value) -> Option<ClaudeMessage> {
    let role = message.get("role").and_then(Value::as_str)?.to_owned();
    let content = match message.get("content")? {
        Value::String(text) => ClaudeContent::Text(text.clone()),
        Value::Array(blocks) => ClaudeContent::Blocks(
            blocks
                .iter()
                .filter_map(|block| serde_json::from_value(block.clone()).ok())
                .collect(),
        ),
        _ => return None,
    };
    Some(ClaudeMessage { role, content })
}
