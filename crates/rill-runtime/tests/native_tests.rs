//! Tests for the native-function calling convention: embedders register
//! `Value::Native` bindings and scripts call them like any function.

use rill_runtime::native::{array_arg, expect_arity, number_arg};
use rill_runtime::{
    EvalResult, Evaluator, Interpreter, RuntimeConfig, SymbolTable, Value,
};
use rill_types::Token;

fn native_hypot(
    address: &Token,
    _scope: &SymbolTable,
    args: &[Value],
    _unsafe_mode: bool,
) -> EvalResult<Value> {
    expect_arity(address, args, 2)?;
    let a = number_arg(address, args, 0)?;
    let b = number_arg(address, args, 1)?;
    Ok(Value::Number((a * a + b * b).sqrt()))
}

/// Simulated multiple return: a short array wraps the tuple.
fn native_minmax(
    address: &Token,
    _scope: &SymbolTable,
    args: &[Value],
    _unsafe_mode: bool,
) -> EvalResult<Value> {
    expect_arity(address, args, 1)?;
    let handle = array_arg(address, args, 0)?;
    let elements = handle
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone();

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for element in &elements {
        let Value::Number(n) = element else {
            return Err(rill_runtime::Signal::runtime_error(
                address,
                "Argument type is not of number.",
            ));
        };
        min = min.min(*n);
        max = max.max(*n);
    }

    Ok(Value::array(vec![Value::Number(min), Value::Number(max)]))
}

/// Re-enters the evaluator by invoking the callback closure it was
/// handed.
fn native_apply(
    address: &Token,
    scope: &SymbolTable,
    args: &[Value],
    unsafe_mode: bool,
) -> EvalResult<Value> {
    expect_arity(address, args, 2)?;
    let evaluator = Evaluator::new(RuntimeConfig {
        test_mode: false,
        unsafe_mode,
    });
    evaluator.call_value(address, &args[0], &[args[1].clone()], scope)
}

fn interpreter_with_host() -> Interpreter {
    let interpreter = Interpreter::default();
    interpreter
        .globals()
        .declare("host.hypot", Value::Native(native_hypot));
    interpreter
        .globals()
        .declare("host.minmax", Value::Native(native_minmax));
    interpreter
        .globals()
        .declare("host.apply", Value::Native(native_apply));
    interpreter
}

#[test]
fn test_native_call_through_qualified_name() {
    let value = interpreter_with_host()
        .run("host.hypot(3, 4)", "native.rill")
        .unwrap();
    assert_eq!(value, Value::Number(5.0));
}

#[test]
fn test_native_arity_failure_is_catchable() {
    let value = interpreter_with_host()
        .run("catch host.hypot(1) handle e { e }", "native.rill")
        .unwrap();
    assert_eq!(value, Value::String("Expecting 2 argument, got 1".into()));
}

#[test]
fn test_native_type_failure_message() {
    let diagnostic = interpreter_with_host()
        .run("host.hypot(\"a\", 2)", "native.rill")
        .unwrap_err();
    assert_eq!(diagnostic.message, "Argument type is not of number.");
}

#[test]
fn test_native_multi_value_result_is_an_array() {
    let value = interpreter_with_host()
        .run("host.minmax([3, 1, 2])", "native.rill")
        .unwrap();
    assert_eq!(
        value,
        Value::array(vec![Value::Number(1.0), Value::Number(3.0)])
    );
}

#[test]
fn test_native_reenters_evaluator_through_closure() {
    let value = interpreter_with_host()
        .run(
            "val double = func(n) n * 2\nhost.apply(double, 21)",
            "native.rill",
        )
        .unwrap();
    assert_eq!(value, Value::Number(42.0));
}

#[test]
fn test_type_of_native_binding() {
    let value = interpreter_with_host()
        .run("type host.hypot", "native.rill")
        .unwrap();
    assert_eq!(value, Value::String("native".into()));
}
