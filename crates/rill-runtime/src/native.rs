//! Argument validation helpers for native functions.
//!
//! Natives perform their own arity and type checking and fail by
//! returning a Runtime-category Throw with a descriptive message. The
//! helpers here produce the conventional message shapes so every native
//! reports the same way.

use crate::signal::{EvalResult, Signal};
use crate::value::Value;
use rill_types::Token;

/// Fail unless exactly `expected` arguments were passed.
pub fn expect_arity(address: &Token, args: &[Value], expected: usize) -> EvalResult<()> {
    if args.len() != expected {
        return Err(Signal::runtime_error(
            address,
            format!("Expecting {expected} argument, got {}", args.len()),
        ));
    }
    Ok(())
}

/// The argument at `index`, as a number.
pub fn number_arg(address: &Token, args: &[Value], index: usize) -> EvalResult<f64> {
    match args.get(index) {
        Some(Value::Number(value)) => Ok(*value),
        _ => Err(Signal::runtime_error(address, "Argument type is not of number.")),
    }
}

/// The argument at `index`, as a string.
pub fn string_arg<'a>(address: &Token, args: &'a [Value], index: usize) -> EvalResult<&'a str> {
    match args.get(index) {
        Some(Value::String(value)) => Ok(value),
        _ => Err(Signal::runtime_error(address, "Argument type is not of string.")),
    }
}

/// The argument at `index`, as a shared array handle.
pub fn array_arg<'a>(
    address: &Token,
    args: &'a [Value],
    index: usize,
) -> EvalResult<&'a crate::value::ArrayRef> {
    match args.get(index) {
        Some(Value::Array(value)) => Ok(value),
        _ => Err(Signal::runtime_error(address, "Argument type is not of array.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use rill_types::TokenCategory;

    fn address() -> Token {
        Token::new("nat", "native.rill", 1, 1, TokenCategory::Identifier)
    }

    fn message(signal: Signal) -> String {
        match signal {
            Signal::Throw(throw) => throw.value.to_display_string(),
            other => panic!("expected throw, got {other:?}"),
        }
    }

    #[test]
    fn test_arity_message_shape() {
        let err = expect_arity(&address(), &[Value::Nil], 2).unwrap_err();
        assert_eq!(message(err), "Expecting 2 argument, got 1");
    }

    #[test]
    fn test_number_arg() {
        let args = vec![Value::Number(4.0), Value::Bool(true)];
        assert_eq!(number_arg(&address(), &args, 0).unwrap(), 4.0);
        let err = number_arg(&address(), &args, 1).unwrap_err();
        assert_eq!(message(err), "Argument type is not of number.");
    }

    #[test]
    fn test_string_arg() {
        let args = vec![Value::String("hi".into())];
        assert_eq!(string_arg(&address(), &args, 0).unwrap(), "hi");
        assert!(string_arg(&address(), &args, 1).is_err());
    }

    #[test]
    fn test_array_arg() {
        let args = vec![Value::array(vec![Value::Number(1.0)])];
        assert!(array_arg(&address(), &args, 0).is_ok());
        let err = array_arg(&address(), &[Value::Nil], 0).unwrap_err();
        assert_eq!(message(err), "Argument type is not of array.");
    }
}
