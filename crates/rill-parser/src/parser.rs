//! Parser infrastructure: token cursor, consume helpers, entry point.

use rill_types::ast::Program;
use rill_types::{ParseError, Token, TokenCategory};

/// Result alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// The Rill parser.
///
/// Consumes the token sequence produced by the tokenizer and builds the
/// ordered list of global statements. The first grammar violation aborts
/// the parse.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// Create a parser over a token sequence.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    /// Parse the whole token sequence into a program.
    pub fn parse(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    // ── Token cursor ──────────────────────────────────────────────────────

    pub(crate) fn is_at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub(crate) fn advance(&mut self) {
        self.index += 1;
    }

    /// The most recently consumed token, used to anchor end-of-input errors.
    pub(crate) fn previous(&self) -> Option<Token> {
        if self.index == 0 {
            self.tokens.first().cloned()
        } else {
            self.tokens.get(self.index - 1).cloned()
        }
    }

    /// The current token; end-of-input is a parse error.
    pub(crate) fn peek(&self) -> ParseResult<&Token> {
        self.tokens.get(self.index).ok_or_else(|| {
            ParseError::new(self.previous(), "Encountered end-of-file.")
        })
    }

    /// Returns `true` when the current token has the given image and
    /// category.
    pub(crate) fn is_next(&self, image: &str, category: TokenCategory) -> bool {
        match self.tokens.get(self.index) {
            Some(token) => token.image() == image && token.category() == category,
            None => false,
        }
    }

    pub(crate) fn is_next_category(&self, category: TokenCategory) -> bool {
        matches!(self.tokens.get(self.index), Some(token) if token.category() == category)
    }

    /// Consume a token by exact image.
    pub(crate) fn consume_image(&mut self, image: &str) -> ParseResult<Token> {
        let Some(token) = self.tokens.get(self.index) else {
            return Err(ParseError::new(
                self.previous(),
                format!("Expecting \"{image}\", encountered end-of-code."),
            ));
        };
        if token.image() != image {
            return Err(ParseError::new(
                self.previous(),
                format!(
                    "Expecting \"{image}\", encountered \"{}\"",
                    token.image()
                ),
            ));
        }

        let token = token.clone();
        self.advance();
        Ok(token)
    }

    /// Consume a token by category.
    pub(crate) fn consume_category(&mut self, category: TokenCategory) -> ParseResult<Token> {
        let Some(token) = self.tokens.get(self.index) else {
            return Err(ParseError::new(
                self.previous(),
                format!("Expecting {category}, encountered end-of-code."),
            ));
        };
        if token.category() != category {
            return Err(ParseError::new(
                Some(token.clone()),
                format!("Expecting {category}, encountered {}", token.category()),
            ));
        }

        let token = token.clone();
        self.advance();
        Ok(token)
    }

    /// Consume an identifier, folding dotted segments (`a.b.c`) into one
    /// token image so qualified names behave as a single variable name.
    pub(crate) fn get_identifier(&mut self) -> ParseResult<Token> {
        let mut token = self.consume_category(TokenCategory::Identifier)?;
        while self.is_next(".", TokenCategory::Operator) {
            self.consume_image(".")?;
            let segment = self.consume_category(TokenCategory::Identifier)?;
            token.append_to_image(&format!(".{}", segment.image()));
        }
        Ok(token)
    }

    /// Consume a trailing `;` when present.
    pub(crate) fn eat_semicolon(&mut self) -> ParseResult<()> {
        if self.is_next(";", TokenCategory::Operator) {
            self.consume_image(";")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_lexer::Tokenizer;

    fn parser_for(source: &str) -> Parser {
        Parser::new(Tokenizer::scan_text(source, "cursor.rill").unwrap())
    }

    #[test]
    fn test_consume_image() {
        let mut parser = parser_for("( )");
        assert_eq!(parser.consume_image("(").unwrap().image(), "(");
        assert_eq!(parser.consume_image(")").unwrap().image(), ")");
        assert!(parser.is_at_end());
    }

    #[test]
    fn test_consume_image_mismatch() {
        let mut parser = parser_for("]");
        let err = parser.consume_image("(").unwrap_err();
        assert!(err.message.contains("Expecting \"(\""));
        assert!(err.message.contains("\"]\""));
    }

    #[test]
    fn test_consume_at_end_of_code() {
        let mut parser = parser_for("x");
        parser.advance();
        let err = parser.consume_image(";").unwrap_err();
        assert!(err.message.contains("end-of-code"));
    }

    #[test]
    fn test_qualified_identifier_folds() {
        let mut parser = parser_for("core.io.write");
        let token = parser.get_identifier().unwrap();
        assert_eq!(token.image(), "core.io.write");
        assert!(parser.is_at_end());
    }

    #[test]
    fn test_identifier_stops_before_non_identifier() {
        let mut parser = parser_for("items[0]");
        let token = parser.get_identifier().unwrap();
        assert_eq!(token.image(), "items");
        assert!(parser.is_next("[", TokenCategory::Operator));
    }
}
