//! Model family helpers

/// Whether a model identifier names a thinking-capable Claude variant
///
/// The upstream catalog exposes these with a `-thinking` suffix
/// (e.g. `claude-sonnet-4-5-thinking`).
pub fn is_claude_thinking_model(model: &str) -> bool {
    let model = model.to_ascii_lowercase();
    model.starts_with("claude") && model.ends_with("-thinking")
}
