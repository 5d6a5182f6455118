/// Pulls the patient name out of a `prefix - Name 2 (notes)` style title.
///
/// Everything after the first `-` (or the whole title when there is none) is
/// cut at the first digit, `(` or `（`, and trimmed. Session counts and room
/// annotations therefore never end up in the name. An empty result means
/// there is no candidate.
pub fn extract_name(title: &str) -> String {
    let tail = match title.split_once('-') {
        Some((_, after)) => after,
        None => title,
    };
    let tail = tail.trim();

    let end = tail
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() || *c == '(' || *c == '（')
        .map(|(i, _)| i)
        .unwrap_or(tail.len());

    tail[..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotated_titles() {
        assert_eq!(extract_name("8外- 張駿之 2 (1F)"), "張駿之");
        assert_eq!(extract_name("門診-王小明(新患)"), "王小明");
        assert_eq!(extract_name("8外- 李家森"), "李家森");
        assert_eq!(extract_name("居家-陳大文（2樓）"), "陳大文");
        assert_eq!(extract_name("門診 - 林小華 2+1"), "林小華");
    }

    #[test]
    fn test_only_first_hyphen_splits() {
        assert_eq!(extract_name("門診-王-小明 1"), "王-小明");
    }

    #[test]
    fn test_no_hyphen_uses_whole_title() {
        assert_eq!(extract_name("  午休  "), "午休");
        assert_eq!(extract_name("王小明 2"), "王小明");
    }

    #[test]
    fn test_no_candidate() {
        assert_eq!(extract_name("-"), "");
        assert_eq!(extract_name("12345"), "");
        assert_eq!(extract_name("門診- 2"), "");
        assert_eq!(extract_name(""), "");
    }
}
