//! Rill parser: builds the AST from a token sequence.
//!
//! Two intertwined grammars: expressions via precedence climbing
//! (`logicOr` down to `primary`) and keyword-led statements. Parsing is
//! deterministic and fails fast with [`rill_types::ParseError`].

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser};
