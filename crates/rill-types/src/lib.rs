//! Shared types for the Rill interpreter.
//!
//! This crate holds the leaf types every other crate depends on: [`Token`]
//! and [`TokenCategory`], the AST node enums ([`ast::Expr`], [`ast::Stmt`]),
//! and the diagnostic types ([`LexicalError`], [`ParseError`],
//! [`Diagnostic`]).

pub mod ast;
pub mod error;
pub mod token;

pub use error::{Diagnostic, ErrorCategory, LexicalError, ParseError};
pub use token::{Token, TokenCategory};
