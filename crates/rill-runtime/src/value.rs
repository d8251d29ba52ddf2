//! The dynamic value model.
//!
//! A [`Value`] is a closed tagged union; re-assignment may change the
//! variant, so the language is dynamically typed per slot. Arrays,
//! functions and regexes are shared handles — assigning one copies the
//! handle, not the contents, and mutation through any alias is visible
//! through all of them.

use crate::scope::SymbolTable;
use crate::signal::EvalResult;
use rill_types::ast::Expr;
use rill_types::Token;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The native-function calling convention: address of the call site, the
/// caller's scope, the evaluated arguments, and the unsafe-mode flag.
/// Natives fail by returning a Runtime-category Throw.
pub type NativeFn = fn(&Token, &SymbolTable, &[Value], bool) -> EvalResult<Value>;

/// Shared handle type for array values.
pub type ArrayRef = Arc<RwLock<Vec<Value>>>;

/// Read an array handle, recovering from a poisoned lock.
pub(crate) fn array_read(array: &RwLock<Vec<Value>>) -> RwLockReadGuard<'_, Vec<Value>> {
    array.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write an array handle, recovering from a poisoned lock.
pub(crate) fn array_write(array: &RwLock<Vec<Value>>) -> RwLockWriteGuard<'_, Vec<Value>> {
    array.write().unwrap_or_else(PoisonError::into_inner)
}

/// A compiled regex literal; equality and display use the pattern text.
#[derive(Debug)]
pub struct RegexValue {
    pattern: String,
    compiled: regex::Regex,
}

impl RegexValue {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: pattern.to_string(),
            compiled: regex::Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }
}

/// A function value: parameter names, the body, and the scope frame that
/// was current at the declaration site (lexical capture).
#[derive(Debug)]
pub struct Closure {
    pub address: Token,
    pub parameters: Vec<Token>,
    pub body: Arc<Expr>,
    pub scope: SymbolTable,
}

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Array(ArrayRef),
    Function(Arc<Closure>),
    Regex(Arc<RegexValue>),
    Native(NativeFn),
}

impl Value {
    /// Build an array value from elements.
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Arc::new(RwLock::new(elements)))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Value::Regex(_))
    }

    /// The runtime type tag, as reported by `type`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Regex(_) => "regex",
            Value::Native(_) => "native",
        }
    }

    /// The implicit-truthiness coercion used by `&&`, `||` and the
    /// conditional constructs. A Number counts as true only when it is
    /// strictly negative — reproduced from the reference behavior, not a
    /// conventional nonzero test.
    pub fn boolean_equivalent(&self) -> bool {
        match self {
            Value::Bool(value) => *value,
            Value::Number(value) => *value < 0.0,
            Value::String(value) => !value.is_empty(),
            Value::Array(array) => !array_read(array).is_empty(),
            Value::Function(_) | Value::Regex(_) | Value::Native(_) => true,
            Value::Nil => false,
        }
    }

    /// Language equality: defined only between same-variant pairs (plus
    /// nil-vs-nil); cross-variant comparison is always false. Numbers use
    /// an epsilon comparison; arrays compare element-wise; functions and
    /// natives compare by identity; regexes by pattern text.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => (a - b).abs() < f64::EPSILON,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a.pattern() == b.pattern(),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => {
                std::ptr::eq(*a as *const (), *b as *const ())
            }
            (Value::Array(a), Value::Array(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let left = array_read(a);
                let right = array_read(b);
                left.len() == right.len()
                    && left.iter().zip(right.iter()).all(|(x, y)| x.equals(y))
            }
            _ => false,
        }
    }

    /// The generic to-string coercion used by string concatenation and
    /// `render`.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Bool(value) => value.to_string(),
            Value::Number(value) => value.to_string(),
            Value::String(value) => value.clone(),
            Value::Regex(regex) => regex.pattern().to_string(),
            Value::Function(closure) => format!(
                "<func [{}, {}]: {}>",
                closure.address.line(),
                closure.address.column(),
                closure.address.file_name()
            ),
            Value::Native(_) => "<native func>".to_string(),
            Value::Array(array) => {
                let rendered: Vec<String> = array_read(array)
                    .iter()
                    .map(Value::to_display_string)
                    .collect();
                format!("[{}]", rendered.join(", "))
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Bool(value) => write!(f, "Bool({value})"),
            Value::Number(value) => write!(f, "Number({value})"),
            Value::String(value) => write!(f, "String({value:?})"),
            Value::Array(array) => write!(f, "Array({:?})", &*array_read(array)),
            Value::Function(closure) => {
                write!(f, "Function(<{} params>)", closure.parameters.len())
            }
            Value::Regex(regex) => write!(f, "Regex({:?})", regex.pattern()),
            Value::Native(_) => f.write_str("Native(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_variant_equality_is_false() {
        assert!(!Value::Number(0.0).equals(&Value::Nil));
        assert!(!Value::Bool(false).equals(&Value::Number(0.0)));
        assert!(!Value::String("1".into()).equals(&Value::Number(1.0)));
    }

    #[test]
    fn test_nil_equals_nil() {
        assert!(Value::Nil.equals(&Value::Nil));
    }

    #[test]
    fn test_number_equality_uses_epsilon() {
        let a = Value::Number(0.1 + 0.2);
        // 0.1 + 0.2 is not bit-equal to 0.3 but lands within machine epsilon.
        assert!(a.equals(&Value::Number(0.3)) || (0.1f64 + 0.2 - 0.3).abs() >= f64::EPSILON);
        assert!(Value::Number(2.0).equals(&Value::Number(2.0)));
        assert!(!Value::Number(2.0).equals(&Value::Number(2.1)));
    }

    #[test]
    fn test_array_equality_is_element_wise() {
        let a = Value::array(vec![Value::Number(1.0), Value::Number(2.0)]);
        let b = Value::array(vec![Value::Number(1.0), Value::Number(2.0)]);
        let c = Value::array(vec![Value::Number(1.0)]);
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
    }

    #[test]
    fn test_array_aliasing_is_observable() {
        let a = Value::array(vec![Value::Number(1.0)]);
        let alias = a.clone();
        if let Value::Array(handle) = &a {
            array_write(handle).push(Value::Number(2.0));
        }
        if let Value::Array(handle) = &alias {
            assert_eq!(array_read(handle).len(), 2);
        } else {
            panic!("alias should still be an array");
        }
    }

    #[test]
    fn test_boolean_equivalent_negative_number_quirk() {
        assert!(Value::Number(-1.0).boolean_equivalent());
        assert!(!Value::Number(1.0).boolean_equivalent());
        assert!(!Value::Number(0.0).boolean_equivalent());
    }

    #[test]
    fn test_boolean_equivalent_other_variants() {
        assert!(!Value::Nil.boolean_equivalent());
        assert!(Value::Bool(true).boolean_equivalent());
        assert!(!Value::Bool(false).boolean_equivalent());
        assert!(Value::String("x".into()).boolean_equivalent());
        assert!(!Value::String(String::new()).boolean_equivalent());
        assert!(Value::array(vec![Value::Nil]).boolean_equivalent());
        assert!(!Value::array(Vec::new()).boolean_equivalent());
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(Value::Nil.to_display_string(), "nil");
        assert_eq!(Value::Number(2.5).to_display_string(), "2.5");
        assert_eq!(Value::Bool(true).to_display_string(), "true");
        assert_eq!(
            Value::array(vec![Value::Number(1.0), Value::String("a".into())])
                .to_display_string(),
            "[1, a]"
        );
    }

    #[test]
    fn test_regex_equality_by_pattern() {
        let a = Value::Regex(Arc::new(RegexValue::new("[0-9]+").unwrap()));
        let b = Value::Regex(Arc::new(RegexValue::new("[0-9]+").unwrap()));
        assert!(a.equals(&b));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Number(0.0).type_name(), "number");
        assert_eq!(Value::array(Vec::new()).type_name(), "array");
    }
}
