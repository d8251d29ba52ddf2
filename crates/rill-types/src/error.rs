//! Diagnostic and error types shared across the interpreter.
//!
//! Lexing and parsing fail fast with [`LexicalError`] / [`ParseError`].
//! Uncaught runtime conditions are reported to embedders as a
//! [`Diagnostic`], which serializes to JSON so front ends never have to
//! parse free-form strings.

use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a reported condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Malformed token stream.
    Lexical,
    /// Grammar violation.
    Parse,
    /// Internal runtime failure (bad operand types, arity, unresolved name).
    Runtime,
    /// A user-level `throw` that reached the program root.
    Uncaught,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => f.write_str("Lexical Error"),
            Self::Parse => f.write_str("Parser Error"),
            Self::Runtime => f.write_str("Runtime Error"),
            Self::Uncaught => f.write_str("Uncaught Error"),
        }
    }
}

/// Fatal scanning error: unterminated literal, bad numeric syntax, or a
/// truncated escape. Aborts the scan of the current input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} (line {line}, column {column})")]
pub struct LexicalError {
    pub message: String,
    pub file_name: String,
    pub line: u32,
    pub column: u32,
}

impl LexicalError {
    pub fn new(message: impl Into<String>, file_name: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            file_name: file_name.into(),
            line,
            column,
        }
    }
}

/// Fatal parse error carrying the offending token, when one exists —
/// end-of-input errors point at the last consumed token instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseError {
    pub token: Option<Token>,
    pub message: String,
}

impl ParseError {
    pub fn new(token: Option<Token>, message: impl Into<String>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(f, "{} at {}", self.message, token),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// A structured report of a fatal condition, handed to embedders for
/// rendering. The core never prints these itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Diagnostic {
    /// Create a diagnostic without a source address.
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            file_name: None,
            line: None,
            column: None,
        }
    }

    /// Attach the source address of the offending token.
    pub fn with_address(mut self, token: &Token) -> Self {
        self.file_name = Some(token.file_name().to_string());
        self.line = Some(token.line());
        self.column = Some(token.column());
        self
    }
}

impl From<LexicalError> for Diagnostic {
    fn from(err: LexicalError) -> Self {
        Self {
            category: ErrorCategory::Lexical,
            message: err.message,
            file_name: Some(err.file_name),
            line: Some(err.line),
            column: Some(err.column),
        }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        let diagnostic = Diagnostic::new(ErrorCategory::Parse, err.message);
        match err.token {
            Some(token) => diagnostic.with_address(&token),
            None => diagnostic,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.category, self.message)?;
        if let (Some(file), Some(line), Some(column)) =
            (&self.file_name, self.line, self.column)
        {
            write!(f, " [line {line}, column {column}] ({file})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenCategory;

    #[test]
    fn test_lexical_error_display() {
        let err = LexicalError::new("Found new line inside string literal.", "x.rill", 4, 12);
        assert_eq!(
            err.to_string(),
            "Found new line inside string literal. (line 4, column 12)"
        );
    }

    #[test]
    fn test_parse_error_display_with_token() {
        let token = Token::new("}", "x.rill", 2, 1, TokenCategory::Operator);
        let err = ParseError::new(Some(token), "Expecting expression, encountered \"}\"");
        assert!(err.to_string().contains("line 2, column 1"));
    }

    #[test]
    fn test_parse_error_display_without_token() {
        let err = ParseError::new(None, "Expecting \")\", encountered end-of-code.");
        assert_eq!(err.to_string(), "Expecting \")\", encountered end-of-code.");
    }

    #[test]
    fn test_diagnostic_from_lexical_error() {
        let err = LexicalError::new("Expecting decimal digits.", "y.rill", 9, 3);
        let diagnostic = Diagnostic::from(err);
        assert_eq!(diagnostic.category, ErrorCategory::Lexical);
        assert_eq!(diagnostic.line, Some(9));
        assert_eq!(diagnostic.column, Some(3));
    }

    #[test]
    fn test_diagnostic_with_address() {
        let token = Token::new("throw", "z.rill", 7, 5, TokenCategory::Keyword);
        let diagnostic =
            Diagnostic::new(ErrorCategory::Uncaught, "boom").with_address(&token);
        assert_eq!(diagnostic.file_name.as_deref(), Some("z.rill"));
        assert_eq!(
            diagnostic.to_string(),
            "[Uncaught Error]: boom [line 7, column 5] (z.rill)"
        );
    }

    #[test]
    fn test_diagnostic_json_round_trip() {
        let diagnostic = Diagnostic::new(ErrorCategory::Runtime, "Expression is not a function.");
        let json = serde_json::to_string(&diagnostic).unwrap();
        assert!(json.contains("\"category\":\"runtime\""));
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diagnostic);
    }
}
