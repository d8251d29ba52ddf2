//! Non-local control-flow signals.
//!
//! `break`, `continue`, `ret` and `throw` propagate as the error arm of
//! [`EvalResult`] through every evaluation frame until the nearest
//! applicable boundary: loops catch Break/Continue, function calls catch
//! Return, `catch...handle` catches Throw, and only the program driver
//! sees Halt. Runtime failures are Throws with a `Runtime` category, so
//! one recovery mechanism serves both.

use crate::value::Value;
use rill_types::{Diagnostic, ErrorCategory, Token};

/// Result alias threaded through the evaluator.
pub type EvalResult<T> = Result<T, Signal>;

/// A throw in flight: the carried value, the source address of the raise
/// site, and whether it came from `throw` or from the runtime itself.
#[derive(Debug, Clone)]
pub struct ThrowSignal {
    pub address: Token,
    pub value: Value,
    pub category: ErrorCategory,
}

impl ThrowSignal {
    /// Convert into a report for the embedder.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.category, self.value.to_display_string())
            .with_address(&self.address)
    }
}

/// A propagating control-flow signal.
#[derive(Debug, Clone)]
pub enum Signal {
    Break { address: Token },
    Continue { address: Token },
    Return { value: Value },
    Throw(ThrowSignal),
    /// `halt` — stop the program cleanly.
    Halt,
}

impl Signal {
    /// A runtime failure: a catchable Throw carrying a message string.
    pub fn runtime_error(address: &Token, message: impl Into<String>) -> Self {
        Signal::Throw(ThrowSignal {
            address: address.clone(),
            value: Value::String(message.into()),
            category: ErrorCategory::Runtime,
        })
    }

    /// A user-level `throw`.
    pub fn thrown(address: &Token, value: Value) -> Self {
        Signal::Throw(ThrowSignal {
            address: address.clone(),
            value,
            category: ErrorCategory::Uncaught,
        })
    }

    /// Describe a signal that escaped to the program root.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Signal::Break { address } => Diagnostic::new(
                ErrorCategory::Runtime,
                "Invalid break statement signal caught.",
            )
            .with_address(address),
            Signal::Continue { address } => Diagnostic::new(
                ErrorCategory::Runtime,
                "Invalid continue statement signal caught.",
            )
            .with_address(address),
            Signal::Return { .. } => Diagnostic::new(
                ErrorCategory::Runtime,
                "Invalid return statement signal caught.",
            ),
            Signal::Throw(throw) => throw.to_diagnostic(),
            Signal::Halt => Diagnostic::new(ErrorCategory::Runtime, "Halted."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_types::TokenCategory;

    fn token() -> Token {
        Token::new("throw", "sig.rill", 2, 4, TokenCategory::Keyword)
    }

    #[test]
    fn test_runtime_error_is_catchable_throw() {
        let signal = Signal::runtime_error(&token(), "Expression is not a function.");
        let Signal::Throw(throw) = &signal else {
            panic!("runtime errors must be throws");
        };
        assert_eq!(throw.category, ErrorCategory::Runtime);
        assert_eq!(
            throw.value.to_display_string(),
            "Expression is not a function."
        );
    }

    #[test]
    fn test_thrown_keeps_value_and_address() {
        let signal = Signal::thrown(&token(), Value::Number(5.0));
        let Signal::Throw(throw) = signal else {
            panic!("expected throw");
        };
        assert_eq!(throw.category, ErrorCategory::Uncaught);
        assert_eq!(throw.address.line(), 2);
    }

    #[test]
    fn test_break_diagnostic_names_invalid_placement() {
        let diagnostic = Signal::Break { address: token() }.to_diagnostic();
        assert!(diagnostic.message.contains("Invalid break"));
        assert_eq!(diagnostic.line, Some(2));
    }
}
