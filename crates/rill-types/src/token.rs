//! Tokens produced by the Rill tokenizer.
//!
//! A [`Token`] keeps the raw source image alongside its category and its
//! file/line/column address. The address travels with every AST node so
//! runtime errors can point back at the source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to a token during scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Keyword,
    Identifier,
    Operator,
    String,
    Digit,
    Regex,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword => f.write_str("keyword"),
            Self::Identifier => f.write_str("identifier"),
            Self::Operator => f.write_str("operator"),
            Self::String => f.write_str("string"),
            Self::Digit => f.write_str("digit"),
            Self::Regex => f.write_str("regex"),
        }
    }
}

/// A single token: source image, category, and source address.
///
/// Tokens are immutable after scanning, with one exception: identifier
/// tokens grow dotted segments while the parser folds a qualified name
/// (`a.b.c`) into a single image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    image: String,
    file_name: String,
    line: u32,
    column: u32,
    category: TokenCategory,
}

impl Token {
    /// Create a new token.
    pub fn new(
        image: impl Into<String>,
        file_name: impl Into<String>,
        line: u32,
        column: u32,
        category: TokenCategory,
    ) -> Self {
        Self {
            image: image.into(),
            file_name: file_name.into(),
            line,
            column,
            category,
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn category(&self) -> TokenCategory {
        self.category
    }

    /// Append a dotted segment while folding a qualified name.
    pub fn append_to_image(&mut self, suffix: &str) {
        self.image.push_str(suffix);
    }

    /// Replace the image wholesale (used when qualifying enum/mod members).
    pub fn set_image(&mut self, image: impl Into<String>) {
        self.image = image.into();
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [line {}, column {}] ({})",
            self.image, self.line, self.column, self.file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(image: &str) -> Token {
        Token::new(image, "test.rill", 3, 7, TokenCategory::Identifier)
    }

    #[test]
    fn test_accessors() {
        let t = token("count");
        assert_eq!(t.image(), "count");
        assert_eq!(t.file_name(), "test.rill");
        assert_eq!(t.line(), 3);
        assert_eq!(t.column(), 7);
        assert_eq!(t.category(), TokenCategory::Identifier);
    }

    #[test]
    fn test_append_to_image_builds_qualified_name() {
        let mut t = token("math");
        t.append_to_image(".floor");
        assert_eq!(t.image(), "math.floor");
    }

    #[test]
    fn test_set_image() {
        let mut t = token("red");
        t.set_image("Color.red");
        assert_eq!(t.image(), "Color.red");
    }

    #[test]
    fn test_display_includes_address() {
        let t = token("count");
        assert_eq!(t.to_string(), "count [line 3, column 7] (test.rill)");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(TokenCategory::Keyword.to_string(), "keyword");
        assert_eq!(TokenCategory::Digit.to_string(), "digit");
        assert_eq!(TokenCategory::Regex.to_string(), "regex");
    }
}
