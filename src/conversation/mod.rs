use crate::models::chat::ChatMessage;

/// Only the most recent turns are forwarded upstream; older history is
/// dropped silently (the caller owns the full transcript).
pub const HISTORY_LIMIT: usize = 10;

/// Assembles the ordered message list sent to the backend:
/// `[system] + last HISTORY_LIMIT history turns + [user]`.
///
/// An empty `message` is forwarded as-is; the backend treats it as a valid
/// (if unhelpful) turn.
pub fn build(message: &str, history: &[ChatMessage], system_prompt: &str) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(HISTORY_LIMIT);
    let recent = &history[start..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend_from_slice(recent);
    messages.push(ChatMessage::user(message));
    messages
}
