//! Rill runtime: the dynamic value model, scope chain, signals, and the
//! tree-walking evaluator, plus the [`Interpreter`] driver that wires
//! lexing and parsing in front of them.
//!
//! The driver's contract towards embedders: evaluate one program against
//! a fresh or existing scope; on an uncaught throw, surface the carried
//! value and its source address as a [`rill_types::Diagnostic`]; always
//! drain the task registry before returning, so background tasks are
//! never abandoned holding locks or half-mutated state.

pub mod context;
pub mod eval;
pub mod native;
pub mod scope;
pub mod signal;
pub mod value;

pub use context::{RuntimeConfig, SourceRegistry};
pub use eval::Evaluator;
pub use scope::{LockGuard, SymbolTable, ValueCell};
pub use signal::{EvalResult, Signal, ThrowSignal};
pub use value::{ArrayRef, Closure, NativeFn, RegexValue, Value};

use rill_parser::Parser;
use rill_types::ast::Program;
use rill_types::Diagnostic;

/// One interpreter instance: capability flags, the loaded-source
/// registry, and the global scope programs evaluate against.
pub struct Interpreter {
    evaluator: Evaluator,
    sources: SourceRegistry,
    globals: SymbolTable,
}

impl Interpreter {
    /// Create an interpreter with a fresh global scope.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            evaluator: Evaluator::new(config),
            sources: SourceRegistry::new(),
            globals: SymbolTable::new(),
        }
    }

    /// The global scope; embedders pre-register natives here.
    pub fn globals(&self) -> &SymbolTable {
        &self.globals
    }

    pub fn config(&self) -> RuntimeConfig {
        self.evaluator.config()
    }

    /// Lex, parse and evaluate one source. Re-running a source that was
    /// already loaded is a no-op (content-hash dedup). The result is the
    /// last global statement's value.
    pub fn run(&self, source: &str, file_name: &str) -> Result<Value, Diagnostic> {
        if !self.sources.register(source) {
            return Ok(Value::Nil);
        }

        let tokens = match rill_lexer::Tokenizer::scan_text(source, file_name) {
            Ok(tokens) => tokens,
            Err(error) => {
                self.globals.wait_for_tasks();
                return Err(error.into());
            }
        };

        let program = match Parser::new(tokens).parse() {
            Ok(program) => program,
            Err(error) => {
                self.globals.wait_for_tasks();
                return Err(error.into());
            }
        };

        self.run_program(&program)
    }

    /// Evaluate an already-parsed program against the global scope,
    /// draining the task registry on every path out.
    pub fn run_program(&self, program: &Program) -> Result<Value, Diagnostic> {
        match self.evaluator.eval_program(program, &self.globals) {
            Ok(value) => {
                self.globals.wait_for_tasks();
                Ok(value)
            }
            Err(Signal::Halt) => {
                self.globals.wait_for_tasks();
                Ok(Value::Nil)
            }
            Err(signal) => {
                self.globals.wait_for_tasks();
                Err(signal.to_diagnostic())
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
