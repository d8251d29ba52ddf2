//! AST node definitions for the Rill language.
//!
//! Expressions and statements are closed enums so the evaluator can match
//! exhaustively. Every variant carries the [`Token`] at which it begins —
//! the node's address — for error reporting. Sub-trees that may cross a
//! thread boundary (function bodies, `parallel` bodies) are held behind
//! `Arc` so closures and spawned tasks can share them.

use crate::token::Token;
use std::sync::Arc;

/// A parsed program: the ordered sequence of global statements.
pub type Program = Vec<Stmt>;

/// One guard case of a `when` expression: `if (condition) body`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenCase {
    pub condition: Expr,
    pub body: Expr,
}

/// One name introduced by a `val`/`import` declaration.
///
/// `platforms` restricts the declaration to the named platforms; an empty
/// list means unrestricted.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: Token,
    pub platforms: Vec<String>,
    pub value: Expr,
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumberLiteral {
        address: Token,
        value: f64,
    },
    StringLiteral {
        address: Token,
        value: String,
    },
    BooleanLiteral {
        address: Token,
        value: bool,
    },
    NilLiteral {
        address: Token,
    },
    /// `maybe` — a boolean drawn at random on every evaluation.
    MaybeLiteral {
        address: Token,
    },
    RegexLiteral {
        address: Token,
        pattern: String,
    },
    ArrayLiteral {
        address: Token,
        elements: Vec<Expr>,
    },
    /// Variable access; qualified names (`a.b.c`) arrive folded into the
    /// token image.
    VariableAccess {
        name: Token,
    },
    ArrayAccess {
        address: Token,
        array: Box<Expr>,
        index: Box<Expr>,
    },
    /// `{ stmt* }` — value-producing; yields the last statement's value.
    Block {
        address: Token,
        statements: Vec<Stmt>,
    },
    Grouped {
        address: Token,
        inner: Box<Expr>,
    },
    Unary {
        address: Token,
        op: String,
        operand: Box<Expr>,
    },
    /// Binary operation; the operator is carried as its source image.
    Binary {
        address: Token,
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    /// `left ? right` — right evaluates only when left is nil.
    NilCoalescing {
        address: Token,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `render [!] [%] expr` — print, `!` appends a newline, `%` targets
    /// the error stream.
    Render {
        address: Token,
        newline: bool,
        error_stream: bool,
        value: Box<Expr>,
    },
    /// `catch expr handle name expr [then expr]`.
    CatchHandle {
        address: Token,
        catch: Box<Expr>,
        handler: Token,
        handle: Box<Expr>,
        finalizer: Option<Box<Expr>>,
    },
    IfElse {
        address: Token,
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    /// `unless` — an `if` with a negated condition.
    Unless {
        address: Token,
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    /// `random expr [else expr]` — picks a branch by coin flip.
    Random {
        address: Token,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    /// `when (subject) { if (c) b, ..., else d }`.
    When {
        address: Token,
        subject: Box<Expr>,
        cases: Vec<WhenCase>,
        default_case: Option<Box<Expr>>,
    },
    While {
        address: Token,
        condition: Box<Expr>,
        body: Box<Expr>,
    },
    /// Three-clause `loop (init; cond; post) body`.
    Loop {
        address: Token,
        initial: Box<Expr>,
        condition: Box<Expr>,
        post: Box<Expr>,
        body: Box<Expr>,
    },
    /// `func(params) body` — a function literal; evaluation captures the
    /// current scope.
    FunctionDeclaration {
        address: Token,
        parameters: Vec<Token>,
        body: Arc<Expr>,
    },
    FunctionCall {
        address: Token,
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    /// `type expr` — the runtime type name as a string.
    TypeOf {
        address: Token,
        value: Box<Expr>,
    },
    /// `size expr` — length of a string/array, 0 for nil.
    SizeOf {
        address: Token,
        value: Box<Expr>,
    },
    /// `parallel expr` — schedule the body on a worker, fire-and-forget.
    Parallel {
        address: Token,
        body: Arc<Expr>,
    },
    /// `lock (name) expr` — hold the named value's lock around the body.
    Lock {
        address: Token,
        variable: Token,
        body: Box<Expr>,
    },
    /// `val [..] decls` / `import` — introduces bindings, optionally bound
    /// to a native-library symbol path.
    VariableDeclaration {
        address: Token,
        declarations: Vec<Declaration>,
        native_path: Option<String>,
    },
    /// `@ stmt` — a single statement in expression position.
    StatementExpr {
        address: Token,
        statement: Box<Stmt>,
    },
}

impl Expr {
    /// The token at which this node begins.
    pub fn address(&self) -> &Token {
        match self {
            Expr::NumberLiteral { address, .. }
            | Expr::StringLiteral { address, .. }
            | Expr::BooleanLiteral { address, .. }
            | Expr::NilLiteral { address }
            | Expr::MaybeLiteral { address }
            | Expr::RegexLiteral { address, .. }
            | Expr::ArrayLiteral { address, .. }
            | Expr::ArrayAccess { address, .. }
            | Expr::Block { address, .. }
            | Expr::Grouped { address, .. }
            | Expr::Unary { address, .. }
            | Expr::Binary { address, .. }
            | Expr::NilCoalescing { address, .. }
            | Expr::Render { address, .. }
            | Expr::CatchHandle { address, .. }
            | Expr::IfElse { address, .. }
            | Expr::Unless { address, .. }
            | Expr::Random { address, .. }
            | Expr::When { address, .. }
            | Expr::While { address, .. }
            | Expr::Loop { address, .. }
            | Expr::FunctionDeclaration { address, .. }
            | Expr::FunctionCall { address, .. }
            | Expr::TypeOf { address, .. }
            | Expr::SizeOf { address, .. }
            | Expr::Parallel { address, .. }
            | Expr::Lock { address, .. }
            | Expr::VariableDeclaration { address, .. }
            | Expr::StatementExpr { address, .. } => address,
            Expr::VariableAccess { name } => name,
        }
    }
}

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Break {
        address: Token,
    },
    Continue {
        address: Token,
    },
    /// `delete a, b` — remove bindings from the scope chain.
    Delete {
        address: Token,
        variables: Vec<Token>,
    },
    /// `enum Name { a = 1, b = 2 }` — defines `Name.a`, `Name.b`.
    Enum {
        address: Token,
        name: Token,
        members: Vec<(Token, Expr)>,
    },
    Halt {
        address: Token,
    },
    /// `mod name { item: expr }` — defines `name.item` members.
    Mod {
        address: Token,
        name: Token,
        members: Vec<(Token, Expr)>,
    },
    Return {
        address: Token,
        value: Expr,
    },
    Throw {
        address: Token,
        value: Expr,
    },
    /// `test (name) [if (assert)] body` — active only in test mode.
    Test {
        address: Token,
        name: Expr,
        assertion: Option<Expr>,
        body: Expr,
    },
    /// `use library [@ version]` — a library requirement declaration.
    Use {
        address: Token,
        library: Expr,
        version: Expr,
    },
    /// `wait` — block until all registered parallel tasks complete.
    Wait {
        address: Token,
    },
    Empty {
        address: Token,
    },
    Expression {
        expr: Expr,
    },
}

impl Stmt {
    /// The token at which this statement begins.
    pub fn address(&self) -> &Token {
        match self {
            Stmt::Break { address }
            | Stmt::Continue { address }
            | Stmt::Delete { address, .. }
            | Stmt::Enum { address, .. }
            | Stmt::Halt { address }
            | Stmt::Mod { address, .. }
            | Stmt::Return { address, .. }
            | Stmt::Throw { address, .. }
            | Stmt::Test { address, .. }
            | Stmt::Use { address, .. }
            | Stmt::Wait { address }
            | Stmt::Empty { address } => address,
            Stmt::Expression { expr } => expr.address(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenCategory;

    fn tok(image: &str, category: TokenCategory) -> Token {
        Token::new(image, "ast.rill", 1, 1, category)
    }

    #[test]
    fn test_expr_address_literal() {
        let address = tok("42", TokenCategory::Digit);
        let expr = Expr::NumberLiteral {
            address: address.clone(),
            value: 42.0,
        };
        assert_eq!(expr.address(), &address);
    }

    #[test]
    fn test_expr_address_variable_is_its_name() {
        let name = tok("counter", TokenCategory::Identifier);
        let expr = Expr::VariableAccess { name: name.clone() };
        assert_eq!(expr.address(), &name);
    }

    #[test]
    fn test_stmt_address_falls_through_to_expression() {
        let address = tok("1", TokenCategory::Digit);
        let stmt = Stmt::Expression {
            expr: Expr::NumberLiteral {
                address: address.clone(),
                value: 1.0,
            },
        };
        assert_eq!(stmt.address(), &address);
    }

    #[test]
    fn test_nodes_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Expr>();
        assert_send_sync::<Stmt>();
    }

    #[test]
    fn test_structural_equality() {
        let make = || Expr::Binary {
            address: tok("+", TokenCategory::Operator),
            left: Box::new(Expr::NumberLiteral {
                address: tok("1", TokenCategory::Digit),
                value: 1.0,
            }),
            op: "+".to_string(),
            right: Box::new(Expr::NumberLiteral {
                address: tok("2", TokenCategory::Digit),
                value: 2.0,
            }),
        };
        assert_eq!(make(), make());
    }
}
