//! Core tokenizer — a single left-to-right scan over the source text.
//!
//! Tracks running line/column counters (column resets to 0 on a newline),
//! classifies characters into whitespace / operator / digit / word, and
//! fails fast with a [`LexicalError`] on the first malformed literal.

use rill_types::{LexicalError, Token, TokenCategory};

use crate::escape::replace_escape_sequences;
use crate::tables::{is_keyword, is_operator_char, is_operator_prefix, OPERATORS};

/// The Rill tokenizer.
pub struct Tokenizer {
    source: Vec<char>,
    file_name: String,
    tokens: Vec<Token>,
    index: usize,
    line: u32,
    column: u32,
}

impl Tokenizer {
    /// Create a tokenizer over `source`.
    pub fn new(source: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            source: source.into().chars().collect(),
            file_name: file_name.into(),
            tokens: Vec::new(),
            index: 0,
            line: 1,
            column: 0,
        }
    }

    /// Scan `source` and return the token sequence in one call.
    pub fn scan_text(
        source: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Result<Vec<Token>, LexicalError> {
        let mut tokenizer = Tokenizer::new(source, file_name);
        tokenizer.scan()?;
        Ok(tokenizer.into_tokens())
    }

    /// The tokens produced so far.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Consume the tokenizer, yielding its tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    // ─────────────────────────────────────────────────────────────
    // Character helpers
    // ─────────────────────────────────────────────────────────────

    fn is_at_end(&self) -> bool {
        self.index >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.index).copied()
    }

    fn bump(&mut self) -> char {
        let ch = self.source[self.index];
        self.index += 1;
        self.column += 1;
        ch
    }

    fn error(&self, message: impl Into<String>) -> LexicalError {
        LexicalError::new(message, self.file_name.clone(), self.line, self.column)
    }

    fn push(&mut self, image: String, column: u32, category: TokenCategory) {
        self.tokens.push(Token::new(
            image,
            self.file_name.clone(),
            self.line,
            column,
            category,
        ));
    }

    fn is_digit(ch: char) -> bool {
        ch.is_ascii_digit()
    }

    fn is_word_char(ch: char) -> bool {
        !ch.is_whitespace() && !Self::is_digit(ch) && !is_operator_char(ch)
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan the entire source into tokens.
    pub fn scan(&mut self) -> Result<(), LexicalError> {
        while !self.is_at_end() {
            let ch = self.bump();

            if ch.is_whitespace() {
                if ch == '\n' {
                    self.line += 1;
                    self.column = 0;
                }
            } else if ch == '#' {
                while !self.is_at_end() && self.peek() != Some('\n') {
                    self.bump();
                }
            } else if ch == '"' {
                self.scan_string()?;
            } else if ch == '`' {
                self.scan_regex()?;
            } else if is_operator_char(ch) {
                self.scan_operator(ch);
            } else if Self::is_digit(ch) {
                self.scan_number(ch)?;
            } else {
                self.scan_word(ch);
            }
        }

        Ok(())
    }

    /// Greedy operator scan: extend while the text is still a prefix of a
    /// table entry, then back off to the longest complete operator.
    fn scan_operator(&mut self, first: char) {
        let start_column = self.column;
        let mut op = String::from(first);

        while let Some(next) = self.peek() {
            let mut candidate = op.clone();
            candidate.push(next);
            if !is_operator_prefix(&candidate) {
                break;
            }
            op.push(self.bump());
        }

        while op.chars().count() > 1 && !OPERATORS.contains(&op.as_str()) {
            op.pop();
            self.index -= 1;
            self.column -= 1;
        }

        self.push(op, start_column, TokenCategory::Operator);
    }

    fn scan_string(&mut self) -> Result<(), LexicalError> {
        let start_column = self.column;
        let raw = self.scan_delimited('"', "string literal")?;
        let image = replace_escape_sequences(&raw);
        self.push(image, start_column, TokenCategory::String);
        Ok(())
    }

    fn scan_regex(&mut self) -> Result<(), LexicalError> {
        let start_column = self.column;
        let raw = self.scan_delimited('`', "regular expression literal")?;
        let image = replace_escape_sequences(&raw);
        self.push(image, start_column, TokenCategory::Regex);
        Ok(())
    }

    /// Consume characters up to the closing `delimiter`, keeping escape
    /// sequences verbatim for the later substitution pass.
    fn scan_delimited(&mut self, delimiter: char, what: &str) -> Result<String, LexicalError> {
        let mut raw = String::new();

        while !self.is_at_end() && self.peek() != Some(delimiter) {
            let ch = self.bump();

            if ch == '\n' {
                return Err(self.error(format!("Found new line inside {what}.")));
            }
            if ch == '\\' {
                raw.push(ch);
                if self.is_at_end() {
                    return Err(self.error(
                        "Expecting escape character, encountered end-of-file.",
                    ));
                }
                raw.push(self.bump());
            } else {
                raw.push(ch);
            }
        }

        if self.is_at_end() {
            return Err(self.error(format!("Unterminated {what}.")));
        }
        self.bump();

        Ok(raw)
    }

    fn scan_number(&mut self, first: char) -> Result<(), LexicalError> {
        let start_column = self.column;
        let mut digit = String::from(first);

        let base_digits: Option<fn(char) -> bool> = if first == '0' {
            match self.peek() {
                Some('b') => Some(|ch| ch == '0' || ch == '1'),
                Some('t') => Some(|ch| ('0'..='2').contains(&ch)),
                Some('c') => Some(|ch| ('0'..='7').contains(&ch)),
                Some('x') => Some(|ch| ch.is_ascii_hexdigit()),
                _ => None,
            }
        } else {
            None
        };

        if let Some(in_base) = base_digits {
            digit.push(self.bump());
            while let Some(next) = self.peek() {
                if !in_base(next) {
                    break;
                }
                digit.push(self.bump());
            }
        } else {
            self.scan_decimal_tail(&mut digit)?;
        }

        self.push(digit, start_column, TokenCategory::Digit);
        Ok(())
    }

    /// Continue a decimal literal: remaining integer digits, an optional
    /// fraction, and an optional exponent with a mandatory explicit sign.
    fn scan_decimal_tail(&mut self, digit: &mut String) -> Result<(), LexicalError> {
        while matches!(self.peek(), Some(ch) if Self::is_digit(ch)) {
            digit.push(self.bump());
        }

        if self.peek() == Some('.') {
            digit.push(self.bump());
            if !matches!(self.peek(), Some(ch) if Self::is_digit(ch)) {
                return Err(self.error("Expecting decimal digits."));
            }
            while matches!(self.peek(), Some(ch) if Self::is_digit(ch)) {
                digit.push(self.bump());
            }
        }

        if self.peek() == Some('e') {
            digit.push(self.bump());
            let sign = match self.peek() {
                Some(sign @ ('+' | '-')) => sign,
                _ => {
                    return Err(self.error("Expecting 'e' followed by decimal digits."));
                }
            };
            self.bump();
            digit.push(sign);
            if !matches!(self.peek(), Some(ch) if Self::is_digit(ch)) {
                return Err(self.error("Expecting 'e' followed by decimal digits."));
            }
            while matches!(self.peek(), Some(ch) if Self::is_digit(ch)) {
                digit.push(self.bump());
            }
        }

        Ok(())
    }

    /// Accumulate a word (anything that is not whitespace/digit/operator),
    /// then classify it as a keyword or identifier.
    fn scan_word(&mut self, first: char) {
        let start_column = self.column;
        let mut word = String::from(first);

        while let Some(next) = self.peek() {
            if !Self::is_digit(next) && !Self::is_word_char(next) {
                break;
            }
            word.push(self.bump());
        }

        let category = if is_keyword(&word) {
            TokenCategory::Keyword
        } else {
            TokenCategory::Identifier
        };
        self.push(word, start_column, category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<Token> {
        Tokenizer::scan_text(source, "test.rill").expect("scan should succeed")
    }

    fn images(source: &str) -> Vec<String> {
        scan(source).iter().map(|t| t.image().to_string()).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = scan("val counter = nil");
        assert_eq!(tokens[0].category(), TokenCategory::Keyword);
        assert_eq!(tokens[1].category(), TokenCategory::Identifier);
        assert_eq!(tokens[2].category(), TokenCategory::Operator);
        assert_eq!(tokens[3].category(), TokenCategory::Keyword);
    }

    #[test]
    fn test_greedy_operators() {
        assert_eq!(images("a == b != c :: d !: e"), vec!["a", "==", "b", "!=", "c", "::", "d", "!:", "e"]);
    }

    #[test]
    fn test_vector_operators_are_single_tokens() {
        assert_eq!(images("a .+ b .<< c .>> d"), vec!["a", ".+", "b", ".<<", "c", ".>>", "d"]);
    }

    #[test]
    fn test_operator_backoff_to_longest_complete() {
        // `.<` is a prefix of `.<<` but not an operator itself.
        assert_eq!(images("a.<b"), vec!["a", ".", "<", "b"]);
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = scan("x\n  yy");
        assert_eq!(tokens[0].line(), 1);
        assert_eq!(tokens[1].line(), 2);
        assert_eq!(tokens[1].column(), 3);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(images("x # the rest vanishes\ny"), vec!["x", "y"]);
    }

    #[test]
    fn test_string_literal_with_escapes() {
        let tokens = scan("\"line\\none\"");
        assert_eq!(tokens[0].category(), TokenCategory::String);
        assert_eq!(tokens[0].image(), "line\none");
    }

    #[test]
    fn test_regex_literal() {
        let tokens = scan("`[a-z]+`");
        assert_eq!(tokens[0].category(), TokenCategory::Regex);
        assert_eq!(tokens[0].image(), "[a-z]+");
    }

    #[test]
    fn test_newline_inside_string_fails() {
        let err = Tokenizer::scan_text("\"ab\ncd\"", "t.rill").unwrap_err();
        assert!(err.message.contains("new line inside string"));
    }

    #[test]
    fn test_truncated_escape_fails() {
        let err = Tokenizer::scan_text("\"ab\\", "t.rill").unwrap_err();
        assert!(err.message.contains("escape character"));
    }

    #[test]
    fn test_unterminated_string_fails() {
        let err = Tokenizer::scan_text("\"abc", "t.rill").unwrap_err();
        assert!(err.message.contains("Unterminated"));
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(images("12 3.5 2e+10 0b101 0t21 0c17 0xff"), vec![
            "12", "3.5", "2e+10", "0b101", "0t21", "0c17", "0xff",
        ]);
        for token in scan("12 3.5 2e+10 0b101") {
            assert_eq!(token.category(), TokenCategory::Digit);
        }
    }

    #[test]
    fn test_fraction_requires_digits() {
        let err = Tokenizer::scan_text("1.", "t.rill").unwrap_err();
        assert!(err.message.contains("decimal digits"));
    }

    #[test]
    fn test_exponent_requires_explicit_sign() {
        let err = Tokenizer::scan_text("2e3", "t.rill").unwrap_err();
        assert!(err.message.contains("'e' followed by"));
    }

    #[test]
    fn test_scan_is_deterministic() {
        let first = scan("val x = [1, 2] .+ 3");
        let second = scan("val x = [1, 2] .+ 3");
        assert_eq!(first, second);
    }
}
