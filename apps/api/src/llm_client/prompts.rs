// Shared prompt helpers for the inference backends.
// Use-case system prompts live in generation::prompts.

/// Number of user-prompt characters echoed back by the mock tier.
pub const MOCK_PREVIEW_CHARS: usize = 50;

/// Returns at most `max_chars` characters of `text` without splitting a code point.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
