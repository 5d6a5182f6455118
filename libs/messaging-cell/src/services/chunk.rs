/// Upper bound on characters in one text message object.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Splits `text` into pieces of at most `max_chars` characters, breaking
/// after a newline when one is available so digest lines stay whole.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let hard_end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        let cut = match rest[..hard_end].rfind('\n') {
            Some(nl) if nl > 0 => nl + 1,
            _ => hard_end,
        };

        pieces.push(rest[..cut].trim_end_matches('\n').to_string());
        rest = &rest[cut..];
    }

    if !rest.is_empty() || pieces.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}
