//! Backslash-escape substitution.
//!
//! String and regex literals keep their escape sequences verbatim while
//! being scanned; this pass expands them to their literal meaning before
//! the image is stored in the token.

/// Expand backslash escapes in `text`.
///
/// Recognised sequences: `\n`, `\r`, `\t`, `\b`, `\f`, `\0`, `\\`, `\"`,
/// `\'` and `` \` ``. An unrecognised escape keeps the escaped character
/// with the backslash dropped. A trailing lone backslash cannot occur —
/// the tokenizer rejects truncated escapes before this pass runs.
pub fn replace_escape_sequences(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('r') => output.push('\r'),
            Some('t') => output.push('\t'),
            Some('b') => output.push('\u{0008}'),
            Some('f') => output.push('\u{000C}'),
            Some('0') => output.push('\0'),
            Some(other) => output.push(other),
            None => output.push('\\'),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_escapes() {
        assert_eq!(replace_escape_sequences("a\\nb"), "a\nb");
        assert_eq!(replace_escape_sequences("a\\tb"), "a\tb");
        assert_eq!(replace_escape_sequences("a\\rb"), "a\rb");
    }

    #[test]
    fn test_quote_and_backslash() {
        assert_eq!(replace_escape_sequences("say \\\"hi\\\""), "say \"hi\"");
        assert_eq!(replace_escape_sequences("c:\\\\temp"), "c:\\temp");
        assert_eq!(replace_escape_sequences("\\`tick\\`"), "`tick`");
    }

    #[test]
    fn test_unknown_escape_keeps_character() {
        assert_eq!(replace_escape_sequences("\\q"), "q");
    }

    #[test]
    fn test_no_escapes_is_identity() {
        assert_eq!(replace_escape_sequences("plain text"), "plain text");
    }
}
