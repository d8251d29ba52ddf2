//! The tree-walking evaluator.
//!
//! Walks AST nodes against a [`SymbolTable`], producing a [`Value`] or
//! propagating a [`Signal`]. Operator semantics are defined per concrete
//! (left, right) type pair; unsupported pairs raise a runtime error
//! naming both operand type tags.

use crate::context::RuntimeConfig;
use crate::scope::SymbolTable;
use crate::signal::{EvalResult, Signal};
use crate::value::{array_read, array_write, Closure, RegexValue, Value};
use rill_types::ast::{Declaration, Expr, Stmt, WhenCase};
use rill_types::Token;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// The evaluator: a small, copyable bundle of capability flags. All the
/// mutable state lives in the scope chain it walks.
#[derive(Clone, Copy)]
pub struct Evaluator {
    config: RuntimeConfig,
}

impl Evaluator {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Evaluate an ordered sequence of statements; the program's value is
    /// the last statement's value.
    pub fn eval_program(&self, statements: &[Stmt], scope: &SymbolTable) -> EvalResult<Value> {
        let mut value = Value::Nil;
        for statement in statements {
            value = self.eval_stmt(statement, scope)?;
        }
        Ok(value)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval_stmt(&self, statement: &Stmt, scope: &SymbolTable) -> EvalResult<Value> {
        match statement {
            Stmt::Break { address } => Err(Signal::Break {
                address: address.clone(),
            }),
            Stmt::Continue { address } => Err(Signal::Continue {
                address: address.clone(),
            }),
            Stmt::Halt { .. } => Err(Signal::Halt),
            Stmt::Empty { .. } => Ok(Value::Nil),

            Stmt::Return { value, .. } => {
                let value = self.eval_expr(value, scope)?;
                Err(Signal::Return { value })
            }
            Stmt::Throw { address, value } => {
                let value = self.eval_expr(value, scope)?;
                Err(Signal::thrown(address, value))
            }

            Stmt::Delete { variables, .. } => {
                for variable in variables {
                    scope.remove(variable.image());
                }
                Ok(Value::Nil)
            }

            Stmt::Enum { name, members, .. } | Stmt::Mod { name, members, .. } => {
                for (member, value) in members {
                    let qualified = format!("{}.{}", name.image(), member.image());
                    let value = self.eval_expr(value, scope)?;
                    scope.declare(&qualified, value);
                }
                Ok(Value::Nil)
            }

            Stmt::Test {
                name,
                assertion,
                body,
                ..
            } => self.eval_test(name, assertion.as_ref(), body, scope),

            Stmt::Use {
                address,
                library,
                version,
            } => self.eval_use(address, library, version, scope),

            Stmt::Wait { .. } => {
                scope.wait_for_tasks();
                Ok(Value::Nil)
            }

            Stmt::Expression { expr } => self.eval_expr(expr, scope),
        }
    }

    /// `test` runs only in test mode: a nil assertion passes on a truthy
    /// body, a non-nil assertion passes when it equals the body's value.
    fn eval_test(
        &self,
        name: &Expr,
        assertion: Option<&Expr>,
        body: &Expr,
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        if !self.config.test_mode {
            return Ok(Value::Nil);
        }

        let started = Instant::now();
        let assertion = match assertion {
            Some(expr) => self.eval_expr(expr, scope)?,
            None => Value::Nil,
        };
        let value = self.eval_expr(body, scope)?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let passed = if assertion.is_nil() {
            value.boolean_equivalent()
        } else {
            assertion.equals(&value)
        };

        let name = self.eval_expr(name, scope)?;
        let verdict = if passed { "[ SUCCESS ]" } else { "[ FAILED  ]" };
        println!("{verdict} {elapsed_ms:.3} ms\t{}", name.to_display_string());

        Ok(Value::Nil)
    }

    /// `use` validates the requirement; resolving the library against disk
    /// belongs to the module loader, not the core.
    fn eval_use(
        &self,
        address: &Token,
        library: &Expr,
        version: &Expr,
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        let library = self.eval_expr(library, scope)?.to_display_string();
        let version = self.eval_expr(version, scope)?.to_display_string();

        let well_formed = version.split('.').count() == 3
            && version
                .split('.')
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
        if !well_formed {
            return Err(Signal::runtime_error(
                address,
                format!("Invalid semantic version '{version}' for library {library}"),
            ));
        }

        Ok(Value::Nil)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval_expr(&self, expression: &Expr, scope: &SymbolTable) -> EvalResult<Value> {
        match expression {
            Expr::NumberLiteral { value, .. } => Ok(Value::Number(*value)),
            Expr::StringLiteral { value, .. } => Ok(Value::String(value.clone())),
            Expr::BooleanLiteral { value, .. } => Ok(Value::Bool(*value)),
            Expr::NilLiteral { .. } => Ok(Value::Nil),
            Expr::MaybeLiteral { .. } => Ok(Value::Bool(rand::random::<bool>())),

            Expr::RegexLiteral { address, pattern } => match RegexValue::new(pattern) {
                Ok(regex) => Ok(Value::Regex(Arc::new(regex))),
                Err(error) => Err(Signal::runtime_error(
                    address,
                    format!("Invalid regular expression: {error}"),
                )),
            },

            Expr::ArrayLiteral { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element, scope)?);
                }
                Ok(Value::array(values))
            }

            Expr::VariableAccess { name } => scope.get(name.image()).ok_or_else(|| {
                Signal::runtime_error(name, format!("Cannot resolve symbol: {}", name.image()))
            }),

            Expr::ArrayAccess {
                address,
                array,
                index,
            } => {
                let origin = self.eval_expr(array, scope)?;
                let index = self.eval_expr(index, scope)?;
                self.eval_index(address, &origin, &index)
            }

            Expr::Block { statements, .. } => {
                let local = scope.child();
                self.eval_program(statements, &local)
            }

            Expr::Grouped { inner, .. } => self.eval_expr(inner, scope),

            Expr::Unary {
                address,
                op,
                operand,
            } => {
                let value = self.eval_expr(operand, scope)?;
                self.eval_unary(address, op, &value)
            }

            Expr::Binary {
                address,
                left,
                op,
                right,
            } => self.eval_binary_expr(address, left, op, right, scope),

            Expr::NilCoalescing { left, right, .. } => {
                let value = self.eval_expr(left, scope)?;
                if value.is_nil() {
                    self.eval_expr(right, scope)
                } else {
                    Ok(value)
                }
            }

            Expr::Render {
                newline,
                error_stream,
                value,
                ..
            } => {
                let value = self.eval_expr(value, scope)?;
                let mut text = value.to_display_string();
                if *newline {
                    text.push('\n');
                }
                if *error_stream {
                    let mut err = std::io::stderr().lock();
                    let _ = err.write_all(text.as_bytes());
                    let _ = err.flush();
                } else {
                    let mut out = std::io::stdout().lock();
                    let _ = out.write_all(text.as_bytes());
                    let _ = out.flush();
                }
                Ok(value)
            }

            Expr::CatchHandle {
                address,
                catch,
                handler,
                handle,
                finalizer,
            } => self.eval_catch_handle(
                address,
                catch,
                handler,
                handle,
                finalizer.as_deref(),
                scope,
            ),

            Expr::IfElse {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.eval_expr(condition, scope)?.boolean_equivalent() {
                    self.eval_expr(then_branch, scope)
                } else {
                    match else_branch {
                        Some(branch) => self.eval_expr(branch, scope),
                        None => Ok(Value::Nil),
                    }
                }
            }

            Expr::Unless {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if !self.eval_expr(condition, scope)?.boolean_equivalent() {
                    self.eval_expr(then_branch, scope)
                } else {
                    match else_branch {
                        Some(branch) => self.eval_expr(branch, scope),
                        None => Ok(Value::Nil),
                    }
                }
            }

            Expr::Random {
                then_branch,
                else_branch,
                ..
            } => {
                if rand::random::<bool>() {
                    self.eval_expr(then_branch, scope)
                } else {
                    match else_branch {
                        Some(branch) => self.eval_expr(branch, scope),
                        None => Ok(Value::Nil),
                    }
                }
            }

            Expr::When {
                subject,
                cases,
                default_case,
                ..
            } => self.eval_when(subject, cases, default_case.as_deref(), scope),

            Expr::While {
                condition, body, ..
            } => self.eval_while(condition, body, scope),

            Expr::Loop {
                initial,
                condition,
                post,
                body,
                ..
            } => self.eval_loop(initial, condition, post, body, scope),

            Expr::FunctionDeclaration {
                address,
                parameters,
                body,
            } => Ok(Value::Function(Arc::new(Closure {
                address: address.clone(),
                parameters: parameters.clone(),
                body: Arc::clone(body),
                scope: scope.clone(),
            }))),

            Expr::FunctionCall {
                address,
                callee,
                arguments,
            } => {
                let callee = self.eval_expr(callee, scope)?;
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.eval_expr(argument, scope)?);
                }
                self.call_value(address, &callee, &args, scope)
            }

            Expr::TypeOf { value, .. } => {
                let value = self.eval_expr(value, scope)?;
                Ok(Value::String(value.type_name().to_string()))
            }

            Expr::SizeOf { value, .. } => {
                let value = self.eval_expr(value, scope)?;
                let size = match &value {
                    Value::Array(array) => array_read(array).len() as f64,
                    Value::String(text) => text.chars().count() as f64,
                    Value::Regex(regex) => regex.pattern().chars().count() as f64,
                    Value::Bool(_) | Value::Number(_) => 1.0,
                    _ => 0.0,
                };
                Ok(Value::Number(size))
            }

            Expr::Parallel { address, body } => self.eval_parallel(address, body, scope),

            Expr::Lock {
                variable, body, ..
            } => {
                // Guard releases on every exit path, signals included.
                let _guard = scope.lock_acquire(variable.image());
                self.eval_expr(body, scope)
            }

            Expr::VariableDeclaration {
                declarations,
                native_path,
                ..
            } => self.eval_declaration(declarations, native_path.as_deref(), scope),

            Expr::StatementExpr { statement, .. } => self.eval_stmt(statement, scope),
        }
    }

    // ── Control constructs ────────────────────────────────────────────────

    fn eval_catch_handle(
        &self,
        address: &Token,
        catch: &Expr,
        handler: &Token,
        handle: &Expr,
        finalizer: Option<&Expr>,
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        let local = scope.child();

        let value = match self.eval_expr(catch, &local) {
            Ok(value) => value,
            Err(Signal::Throw(signal)) => {
                if local.has(handler.image()) {
                    return Err(Signal::runtime_error(
                        address,
                        "Handle name for catch-handle is already in-use.",
                    ));
                }
                local.declare(handler.image(), signal.value);
                self.eval_expr(handle, &local)?
            }
            Err(other) => return Err(other),
        };

        if let Some(finalizer) = finalizer {
            self.eval_expr(finalizer, &local)?;
        }

        Ok(value)
    }

    /// `when` evaluates its subject once and runs the first case whose
    /// guard equals it.
    fn eval_when(
        &self,
        subject: &Expr,
        cases: &[WhenCase],
        default_case: Option<&Expr>,
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        let subject = self.eval_expr(subject, scope)?;

        for case in cases {
            let guard = self.eval_expr(&case.condition, scope)?;
            if guard.equals(&subject) {
                return self.eval_expr(&case.body, scope);
            }
        }

        match default_case {
            Some(default_case) => self.eval_expr(default_case, scope),
            None => Ok(Value::Nil),
        }
    }

    fn eval_while(&self, condition: &Expr, body: &Expr, scope: &SymbolTable) -> EvalResult<Value> {
        let mut value = Value::Nil;

        while self.eval_expr(condition, scope)?.boolean_equivalent() {
            match self.eval_expr(body, scope) {
                Ok(result) => value = result,
                Err(Signal::Break { .. }) => break,
                Err(Signal::Continue { .. }) => continue,
                Err(signal) => return Err(signal),
            }
        }

        Ok(value)
    }

    fn eval_loop(
        &self,
        initial: &Expr,
        condition: &Expr,
        post: &Expr,
        body: &Expr,
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        let mut value = Value::Nil;
        self.eval_expr(initial, scope)?;

        while self.eval_expr(condition, scope)?.boolean_equivalent() {
            match self.eval_expr(body, scope) {
                Ok(result) => value = result,
                Err(Signal::Break { .. }) => break,
                Err(Signal::Continue { .. }) => {
                    self.eval_expr(post, scope)?;
                    continue;
                }
                Err(signal) => return Err(signal),
            }
            self.eval_expr(post, scope)?;
        }

        Ok(value)
    }

    /// Schedule the body on a worker thread sharing the scope chain; the
    /// handle lands in the task registry for `wait`. An uncaught signal in
    /// the task is reported on the error stream without cancelling
    /// siblings.
    fn eval_parallel(
        &self,
        _address: &Token,
        body: &Arc<Expr>,
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        let evaluator = *self;
        let body = Arc::clone(body);
        let task_scope = scope.clone();

        let handle = thread::spawn(move || {
            if let Err(signal) = evaluator.eval_expr(&body, &task_scope) {
                if !matches!(signal, Signal::Halt) {
                    eprintln!("{}", signal.to_diagnostic());
                }
            }
        });
        scope.add_task(handle);

        Ok(Value::Nil)
    }

    /// `val`/`import`: platform-filtered bindings in the current frame.
    /// Native-bound declarations record the names; resolving the path is
    /// the module loader's concern, so the names bind to nil here.
    fn eval_declaration(
        &self,
        declarations: &[Declaration],
        native_path: Option<&str>,
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        let platform = current_platform();

        for declaration in declarations {
            if !declaration.platforms.is_empty()
                && !declaration.platforms.iter().any(|p| p == platform)
            {
                continue;
            }

            let value = if native_path.is_some() {
                Value::Nil
            } else {
                self.eval_expr(&declaration.value, scope)?
            };
            scope.declare(declaration.name.image(), value);
        }

        Ok(Value::Nil)
    }

    // ── Calls ─────────────────────────────────────────────────────────────

    /// Dispatch a call on an evaluated callee. Natives re-enter through
    /// the fixed calling convention; function values get a child frame
    /// parented at their captured scope, and a propagating Return converts
    /// into the call's value here and nowhere else.
    pub fn call_value(
        &self,
        address: &Token,
        callee: &Value,
        args: &[Value],
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        match callee {
            Value::Native(native) => native(address, scope, args, self.config.unsafe_mode),
            Value::Function(closure) => self.call_closure(address, closure, args),
            _ => Err(Signal::runtime_error(address, "Expression is not a function.")),
        }
    }

    fn call_closure(
        &self,
        address: &Token,
        closure: &Closure,
        args: &[Value],
    ) -> EvalResult<Value> {
        if args.len() != closure.parameters.len() {
            return Err(Signal::runtime_error(
                address,
                format!(
                    "Argument count mismatch, expecting {}, got {}.",
                    closure.parameters.len(),
                    args.len()
                ),
            ));
        }

        let frame = closure.scope.child();
        for (parameter, value) in closure.parameters.iter().zip(args.iter().cloned()) {
            frame.declare(parameter.image(), value);
        }

        match self.eval_expr(&closure.body, &frame) {
            Err(Signal::Return { value }) => Ok(value),
            other => other,
        }
    }

    // ── Index access ──────────────────────────────────────────────────────

    fn eval_index(&self, address: &Token, origin: &Value, index: &Value) -> EvalResult<Value> {
        match origin {
            Value::String(text) => {
                let Value::Number(index) = index else {
                    return Err(Signal::runtime_error(
                        address,
                        "Accessing string with non-number index is not allowed.",
                    ));
                };
                let position = *index as isize;
                text.chars()
                    .nth(usize::try_from(position).map_err(|_| {
                        Signal::runtime_error(address, "Index is out of bounds.")
                    })?)
                    .map(|ch| Value::String(ch.to_string()))
                    .ok_or_else(|| Signal::runtime_error(address, "Index is out of bounds."))
            }
            Value::Array(array) => {
                let Value::Number(index) = index else {
                    return Err(Signal::runtime_error(
                        address,
                        "Accessing array with non-number index is not allowed.",
                    ));
                };
                let position = *index as isize;
                let elements = array_read(array);
                usize::try_from(position)
                    .ok()
                    .and_then(|i| elements.get(i).cloned())
                    .ok_or_else(|| Signal::runtime_error(address, "Index is out of bounds."))
            }
            _ => Err(Signal::runtime_error(
                address,
                "Accessing non-array and non-string object is invalid.",
            )),
        }
    }

    // ── Unary operators ───────────────────────────────────────────────────

    fn eval_unary(&self, address: &Token, op: &str, value: &Value) -> EvalResult<Value> {
        match value {
            Value::Number(number) => match op {
                "+" => Ok(Value::Number(*number)),
                "-" => Ok(Value::Number(-number)),
                "~" => Ok(Value::Number(!(number.trunc() as u64) as f64)),
                _ => Err(Signal::runtime_error(address, "Invalid unary expression operation.")),
            },
            Value::String(text) => match op {
                "~" => Ok(Value::String(text.chars().rev().collect())),
                _ => Err(Signal::runtime_error(address, "Invalid unary expression operation.")),
            },
            Value::Bool(value) if op == "!" => Ok(Value::Bool(!value)),
            _ => Err(Signal::runtime_error(address, "Invalid unary expression operation.")),
        }
    }

    // ── Binary operators ──────────────────────────────────────────────────

    fn eval_binary_expr(
        &self,
        address: &Token,
        left: &Expr,
        op: &str,
        right: &Expr,
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        // Assignment targets are recognised before operand evaluation.
        if op == "=" {
            if let Expr::VariableAccess { name } = left {
                let value = self.eval_expr(right, scope)?;
                scope.assign(name.image(), value.clone());
                return Ok(value);
            }
            if let Expr::ArrayAccess {
                address: access_address,
                array,
                index,
            } = left
            {
                return self.eval_index_assign(access_address, array, index, right, scope);
            }
        }

        let left = self.eval_expr(left, scope)?;
        let right = self.eval_expr(right, scope)?;
        self.eval_binary(address, op, &left, &right)
    }

    fn eval_index_assign(
        &self,
        address: &Token,
        array: &Expr,
        index: &Expr,
        right: &Expr,
        scope: &SymbolTable,
    ) -> EvalResult<Value> {
        let origin = self.eval_expr(array, scope)?;
        let Value::Array(handle) = &origin else {
            return Err(Signal::runtime_error(
                address,
                "Object is not an array, cannot update value in specified index.",
            ));
        };

        let index = self.eval_expr(index, scope)?;
        let Value::Number(index) = index else {
            return Err(Signal::runtime_error(address, "Specified index is not a number."));
        };

        let value = self.eval_expr(right, scope)?;
        let mut elements = array_write(handle);
        let position = usize::try_from(index as isize)
            .map_err(|_| Signal::runtime_error(address, "Index is out of bounds."))?;
        if position >= elements.len() {
            return Err(Signal::runtime_error(address, "Index is out of bounds."));
        }
        elements[position] = value;
        drop(elements);

        Ok(origin)
    }

    /// Pairwise operator dispatch. Equality is global — same-variant only,
    /// cross-variant false — everything else routes by operand class:
    /// numbers, arrays, strings, booleans, regexes.
    pub fn eval_binary(
        &self,
        address: &Token,
        op: &str,
        left: &Value,
        right: &Value,
    ) -> EvalResult<Value> {
        if op == "==" {
            return Ok(Value::Bool(left.equals(right)));
        }
        if op == "!=" {
            return Ok(Value::Bool(!left.equals(right)));
        }

        if left.is_number() && right.is_number() {
            return self.eval_number_binary(address, op, left, right);
        }
        if left.is_array() || right.is_array() {
            return self.eval_array_binary(address, op, left, right);
        }
        if (left.is_string() || right.is_string()) && op != "::" && op != "!:" {
            return self.eval_string_binary(address, op, left, right);
        }
        if left.is_bool() || right.is_bool() {
            return self.eval_bool_binary(address, op, left, right);
        }
        if left.is_regex() || right.is_regex() {
            return self.eval_regex_binary(address, op, left, right);
        }

        Err(type_error(address, left, right))
    }

    fn eval_number_binary(
        &self,
        address: &Token,
        op: &str,
        left: &Value,
        right: &Value,
    ) -> EvalResult<Value> {
        let (Value::Number(a), Value::Number(b)) = (left, right) else {
            return Err(type_error(address, left, right));
        };
        let (a, b) = (*a, *b);

        match op {
            "<" => Ok(Value::Bool(a < b)),
            ">" => Ok(Value::Bool(a > b)),
            "<=" => Ok(Value::Bool(a <= b)),
            ">=" => Ok(Value::Bool(a >= b)),
            _ => numeric_arith(address, op, a, b).map(Value::Number),
        }
    }

    /// String rules: `+` concatenates through the generic to-string
    /// coercion; `-` removes the right operand as a substring until none
    /// remains; `*` with a number runs the doubling loop; comparisons
    /// against a number compare the string's length.
    fn eval_string_binary(
        &self,
        address: &Token,
        op: &str,
        left: &Value,
        right: &Value,
    ) -> EvalResult<Value> {
        match op {
            "+" => Ok(Value::String(format!(
                "{}{}",
                left.to_display_string(),
                right.to_display_string()
            ))),
            "-" => {
                let mut output = left.to_display_string();
                let needle = right.to_display_string();
                while !needle.is_empty() && output.contains(&needle) {
                    output = output.replace(&needle, "");
                }
                Ok(Value::String(output))
            }
            "*" => {
                let (count, base) = match (left, right) {
                    (Value::Number(n), Value::String(s)) => (*n, s),
                    (Value::String(s), Value::Number(n)) => (*n, s),
                    _ => return Err(type_error(address, left, right)),
                };
                // Self-concatenation, count - 1 times: "ab" * 3 doubles
                // twice to "abababab". Reproduced from the reference
                // behavior; this is not an n-copies repeat.
                let count = count.trunc().max(0.0) as u64;
                let mut output = base.clone();
                for _ in 1..count {
                    let doubled = output.clone();
                    output.push_str(&doubled);
                }
                Ok(Value::String(output))
            }
            "<" | ">" | "<=" | ">=" => {
                let (a, b) = match (left, right) {
                    (Value::String(s), Value::Number(n)) => (s.chars().count() as f64, *n),
                    (Value::Number(n), Value::String(s)) => (*n, s.chars().count() as f64),
                    _ => {
                        return Err(Signal::runtime_error(
                            address,
                            format!("Unknown operator for string: {op}"),
                        ))
                    }
                };
                let result = match op {
                    "<" => a < b,
                    ">" => a > b,
                    "<=" => a <= b,
                    _ => a >= b,
                };
                Ok(Value::Bool(result))
            }
            _ => Err(Signal::runtime_error(
                address,
                format!("Unknown operator for string: {op}"),
            )),
        }
    }

    /// `&&`/`||` operate on boolean equivalence and evaluate both
    /// operands; short-circuit laziness lives in the conditional
    /// constructs, not here.
    fn eval_bool_binary(
        &self,
        address: &Token,
        op: &str,
        left: &Value,
        right: &Value,
    ) -> EvalResult<Value> {
        match op {
            "&&" => Ok(Value::Bool(
                left.boolean_equivalent() && right.boolean_equivalent(),
            )),
            "||" => Ok(Value::Bool(
                left.boolean_equivalent() || right.boolean_equivalent(),
            )),
            _ => Err(Signal::runtime_error(
                address,
                format!("Unsupported operation for boolean: {op}"),
            )),
        }
    }

    fn eval_regex_binary(
        &self,
        address: &Token,
        op: &str,
        left: &Value,
        right: &Value,
    ) -> EvalResult<Value> {
        let matched = match (left, right) {
            (Value::Regex(regex), Value::String(text))
            | (Value::String(text), Value::Regex(regex)) => regex.is_match(text),
            _ => {
                return Err(Signal::runtime_error(
                    address,
                    "Unsupported operation for regular expression matching.",
                ))
            }
        };

        match op {
            "::" => Ok(Value::Bool(matched)),
            "!:" => Ok(Value::Bool(!matched)),
            _ => Err(Signal::runtime_error(
                address,
                "Unsupported operation for regular expression matching.",
            )),
        }
    }

    /// Array rules: two all-numeric arrays combine element-wise; `+` with
    /// a number appends/prepends that element in place through the shared
    /// handle; the dotted operators broadcast a scalar over the elements.
    /// Anything else is a type error naming both operand types.
    fn eval_array_binary(
        &self,
        address: &Token,
        op: &str,
        left: &Value,
        right: &Value,
    ) -> EvalResult<Value> {
        if let (Value::Array(a), Value::Array(b)) = (left, right) {
            let left_items = numeric_elements(address, a)?;
            let right_items = numeric_elements(address, b)?;
            if left_items.len() != right_items.len() {
                return Err(Signal::runtime_error(address, "Vectors must be of the same size."));
            }

            let mut result = Vec::with_capacity(left_items.len());
            for (x, y) in left_items.into_iter().zip(right_items) {
                result.push(Value::Number(numeric_arith(address, op, x, y)?));
            }
            return Ok(Value::array(result));
        }

        // Scalar broadcast: element `op` scalar, whichever side the
        // scalar sits on.
        if let Some(scalar_op) = op.strip_prefix('.') {
            let (array, scalar) = match (left, right) {
                (Value::Array(array), Value::Number(n)) => (array, *n),
                (Value::Number(n), Value::Array(array)) => (array, *n),
                _ => return Err(type_error(address, left, right)),
            };
            let elements = numeric_elements(address, array)?;
            let mut result = Vec::with_capacity(elements.len());
            for element in elements {
                result.push(Value::Number(numeric_arith(address, scalar_op, element, scalar)?));
            }
            return Ok(Value::array(result));
        }

        if op == "+" {
            if let (Value::Array(array), Value::Number(n)) = (left, right) {
                array_write(array).push(Value::Number(*n));
                return Ok(left.clone());
            }
            if let (Value::Number(n), Value::Array(array)) = (left, right) {
                array_write(array).insert(0, Value::Number(*n));
                return Ok(right.clone());
            }
        }

        Err(type_error(address, left, right))
    }
}

/// The platform tag used by `val`/`import` platform restriction lists.
fn current_platform() -> &'static str {
    if cfg!(target_os = "linux") {
        "linux"
    } else if cfg!(target_os = "macos") {
        "darwin"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "any"
    }
}

fn type_error(address: &Token, left: &Value, right: &Value) -> Signal {
    Signal::runtime_error(
        address,
        format!(
            "Unsupported operation for type '{}' and '{}'.",
            left.type_name(),
            right.type_name()
        ),
    )
}

/// Scalar arithmetic shared by number-number operations and the
/// element-wise array rules. `%` and the bitwise family truncate both
/// operands to integers first; `\` divides right by left.
fn numeric_arith(address: &Token, op: &str, a: f64, b: f64) -> Result<f64, Signal> {
    match op {
        "+" => Ok(a + b),
        "-" => Ok(a - b),
        "*" => Ok(a * b),
        "/" => Ok(a / b),
        "\\" => Ok(b / a),
        "%" => {
            let divisor = b.trunc() as i64;
            if divisor == 0 {
                return Err(Signal::runtime_error(address, "Division by zero."));
            }
            Ok(((a.trunc() as i64) % divisor) as f64)
        }
        "&" => Ok(((a.trunc() as i64) & (b.trunc() as i64)) as f64),
        "|" => Ok(((a.trunc() as i64) | (b.trunc() as i64)) as f64),
        "^" => Ok(((a.trunc() as i64) ^ (b.trunc() as i64)) as f64),
        "<<" => Ok((a.trunc() as u64).wrapping_shl(b.trunc() as u32) as f64),
        ">>" => Ok((a.trunc() as u64).wrapping_shr(b.trunc() as u32) as f64),
        _ => Err(Signal::runtime_error(address, format!("Unknown operator: {op}"))),
    }
}

/// Collect an all-numeric array's elements, or fail naming the offence.
fn numeric_elements(
    address: &Token,
    array: &std::sync::RwLock<Vec<Value>>,
) -> Result<Vec<f64>, Signal> {
    let elements = array_read(array);
    let mut numbers = Vec::with_capacity(elements.len());
    for element in elements.iter() {
        let Value::Number(n) = element else {
            return Err(Signal::runtime_error(
                address,
                "Unsupported binary operation for array that contains non-numbers.",
            ));
        };
        numbers.push(*n);
    }
    Ok(numbers)
}
