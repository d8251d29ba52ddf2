//! Expression parsing.
//!
//! Precedence climbing, lowest first:
//! `logicOr → logicAnd → bitwiseOr → bitwiseXor → bitwiseAnd →
//! nilCoalescing → equality → comparison → shift → term → factor →
//! primary`, every level left-associative. Primary dispatches on the
//! leading token to the keyword-led constructs, then wraps postfix
//! call/index chains left-to-right.

use rill_types::ast::{Declaration, Expr, WhenCase};
use rill_types::{ParseError, TokenCategory};
use std::sync::Arc;

use crate::parser::{ParseResult, Parser};

impl Parser {
    /// Parse one expression.
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        self.expr_logic_or()
    }

    // ── Precedence chain ──────────────────────────────────────────────────

    fn binary_level(
        &mut self,
        operators: &[&str],
        next: fn(&mut Parser) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expression = next(self)?;

        loop {
            let Some(op) = operators
                .iter()
                .find(|op| self.is_next(op, TokenCategory::Operator))
                .copied()
            else {
                break;
            };

            let address = self.consume_image(op)?;
            let right = next(self)?;
            expression = Expr::Binary {
                address,
                left: Box::new(expression),
                op: op.to_string(),
                right: Box::new(right),
            };
        }

        Ok(expression)
    }

    fn expr_logic_or(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["||"], Self::expr_logic_and)
    }

    fn expr_logic_and(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["&&"], Self::expr_bitwise_or)
    }

    fn expr_bitwise_or(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["|", ".|"], Self::expr_bitwise_xor)
    }

    fn expr_bitwise_xor(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["^", ".^"], Self::expr_bitwise_and)
    }

    fn expr_bitwise_and(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["&", ".&"], Self::expr_nil_coalescing)
    }

    /// `left ? right` — the only level with its own node kind.
    fn expr_nil_coalescing(&mut self) -> ParseResult<Expr> {
        let mut expression = self.expr_equality()?;

        while self.is_next("?", TokenCategory::Operator) {
            let address = self.consume_image("?")?;
            let right = self.expr_equality()?;
            expression = Expr::NilCoalescing {
                address,
                left: Box::new(expression),
                right: Box::new(right),
            };
        }

        Ok(expression)
    }

    fn expr_equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["==", "!=", "=", "::", "!:"], Self::expr_comparison)
    }

    fn expr_comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["<", "<=", ">", ">="], Self::expr_shift)
    }

    fn expr_shift(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["<<", ">>", ".<<", ".>>"], Self::expr_term)
    }

    fn expr_term(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["+", "-", ".+", ".-"], Self::expr_factor)
    }

    fn expr_factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(&["*", "/", "\\", "%", ".*", "./", ".%"], Self::expr_primary)
    }

    // ── Primary dispatch ──────────────────────────────────────────────────

    fn expr_primary(&mut self) -> ParseResult<Expr> {
        let mut expression = if self.is_next("+", TokenCategory::Operator)
            || self.is_next("-", TokenCategory::Operator)
            || self.is_next("~", TokenCategory::Operator)
            || self.is_next("!", TokenCategory::Operator)
        {
            let address = self.consume_category(TokenCategory::Operator)?;
            let op = address.image().to_string();
            Expr::Unary {
                address,
                op,
                operand: Box::new(self.expression()?),
            }
        } else if self.is_next("(", TokenCategory::Operator) {
            let address = self.consume_image("(")?;
            let inner = self.expression()?;
            self.consume_image(")")?;
            Expr::Grouped {
                address,
                inner: Box::new(inner),
            }
        } else if self.is_next("@", TokenCategory::Operator) {
            self.expr_single_statement()?
        } else if self.is_next("{", TokenCategory::Operator) {
            self.expr_block()?
        } else if self.is_next("render", TokenCategory::Keyword) {
            self.expr_render()?
        } else if self.is_next("catch", TokenCategory::Keyword) {
            self.expr_catch_handle()?
        } else if self.is_next("if", TokenCategory::Keyword) {
            self.expr_if()?
        } else if self.is_next("while", TokenCategory::Keyword) {
            self.expr_while()?
        } else if self.is_next("loop", TokenCategory::Keyword) {
            self.expr_loop()?
        } else if self.is_next("unless", TokenCategory::Keyword) {
            self.expr_unless()?
        } else if self.is_next("random", TokenCategory::Keyword) {
            self.expr_random()?
        } else if self.is_next("when", TokenCategory::Keyword) {
            self.expr_when()?
        } else if self.is_next("func", TokenCategory::Keyword) {
            self.expr_function_decl()?
        } else if self.is_next("type", TokenCategory::Keyword) {
            self.expr_type()?
        } else if self.is_next("size", TokenCategory::Keyword) {
            self.expr_size()?
        } else if self.is_next("parallel", TokenCategory::Keyword) {
            self.expr_parallel()?
        } else if self.is_next("lock", TokenCategory::Keyword) {
            self.expr_lock()?
        } else if self.is_next("val", TokenCategory::Keyword) {
            self.expr_val()?
        } else if self.is_next("[", TokenCategory::Operator) {
            self.expr_array()?
        } else if self.is_next_category(TokenCategory::Identifier) {
            Expr::VariableAccess {
                name: self.get_identifier()?,
            }
        } else {
            self.expr_literal()?
        };

        // Postfix chains: f(x)[0](y) applies left-to-right.
        while self.is_next("(", TokenCategory::Operator)
            || self.is_next("[", TokenCategory::Operator)
        {
            while self.is_next("(", TokenCategory::Operator) {
                self.consume_image("(")?;
                let mut arguments = Vec::new();

                while !self.is_next(")", TokenCategory::Operator) {
                    if !arguments.is_empty() {
                        self.consume_image(",")?;
                    }
                    arguments.push(self.expression()?);
                }
                self.consume_image(")")?;

                expression = Expr::FunctionCall {
                    address: expression.address().clone(),
                    callee: Box::new(expression),
                    arguments,
                };
            }

            while self.is_next("[", TokenCategory::Operator) {
                let address = self.consume_image("[")?;
                let index = self.expression()?;
                self.consume_image("]")?;

                expression = Expr::ArrayAccess {
                    address,
                    array: Box::new(expression),
                    index: Box::new(index),
                };
            }
        }

        Ok(expression)
    }

    fn expr_literal(&mut self) -> ParseResult<Expr> {
        if self.is_next("true", TokenCategory::Keyword) {
            return Ok(Expr::BooleanLiteral {
                address: self.consume_image("true")?,
                value: true,
            });
        }
        if self.is_next("false", TokenCategory::Keyword) {
            return Ok(Expr::BooleanLiteral {
                address: self.consume_image("false")?,
                value: false,
            });
        }
        if self.is_next("maybe", TokenCategory::Keyword) {
            return Ok(Expr::MaybeLiteral {
                address: self.consume_image("maybe")?,
            });
        }
        if self.is_next("nil", TokenCategory::Keyword) {
            return Ok(Expr::NilLiteral {
                address: self.consume_image("nil")?,
            });
        }
        if self.is_next_category(TokenCategory::String) {
            let token = self.consume_category(TokenCategory::String)?;
            let value = token.image().to_string();
            return Ok(Expr::StringLiteral {
                address: token,
                value,
            });
        }
        if self.is_next_category(TokenCategory::Digit) {
            let token = self.consume_category(TokenCategory::Digit)?;
            let value = rill_lexer::numeric::translate_digit(token.image()).ok_or_else(|| {
                ParseError::new(
                    Some(token.clone()),
                    format!("Invalid numeric literal \"{}\"", token.image()),
                )
            })?;
            return Ok(Expr::NumberLiteral {
                address: token,
                value,
            });
        }
        if self.is_next_category(TokenCategory::Regex) {
            let token = self.consume_category(TokenCategory::Regex)?;
            let pattern = token.image().to_string();
            return Ok(Expr::RegexLiteral {
                address: token,
                pattern,
            });
        }

        let address = self.peek()?.clone();
        Err(ParseError::new(
            Some(address.clone()),
            format!("Expecting expression, encountered {}", address.image()),
        ))
    }

    // ── Keyword-led constructs ────────────────────────────────────────────

    fn expr_array(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("[")?;
        let mut elements = Vec::new();

        while !self.is_next("]", TokenCategory::Operator) {
            if !elements.is_empty() {
                self.consume_image(",")?;
            }
            elements.push(self.expression()?);
        }
        self.consume_image("]")?;

        Ok(Expr::ArrayLiteral { address, elements })
    }

    fn expr_block(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("{")?;
        let mut statements = Vec::new();

        while !self.is_next("}", TokenCategory::Operator) {
            statements.push(self.statement()?);
        }
        self.consume_image("}")?;

        Ok(Expr::Block {
            address,
            statements,
        })
    }

    fn expr_render(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("render")?;
        let mut newline = false;
        let mut error_stream = false;

        if self.is_next("!", TokenCategory::Operator) {
            self.consume_image("!")?;
            newline = true;
        }
        if self.is_next("%", TokenCategory::Operator) {
            self.consume_image("%")?;
            error_stream = true;
        }

        Ok(Expr::Render {
            address,
            newline,
            error_stream,
            value: Box::new(self.expression()?),
        })
    }

    fn expr_catch_handle(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("catch")?;
        let catch = self.expression()?;
        self.consume_image("handle")?;

        let handler = self.get_identifier()?;
        let handle = self.expression()?;

        let finalizer = if self.is_next("then", TokenCategory::Keyword) {
            self.consume_image("then")?;
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        Ok(Expr::CatchHandle {
            address,
            catch: Box::new(catch),
            handler,
            handle: Box::new(handle),
            finalizer,
        })
    }

    fn expr_if(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("if")?;
        self.consume_image("(")?;
        let condition = self.expression()?;
        self.consume_image(")")?;

        let then_branch = self.expression()?;
        let else_branch = if self.is_next("else", TokenCategory::Keyword) {
            self.consume_image("else")?;
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        Ok(Expr::IfElse {
            address,
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn expr_unless(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("unless")?;
        self.consume_image("(")?;
        let condition = self.expression()?;
        self.consume_image(")")?;

        let then_branch = self.expression()?;
        let else_branch = if self.is_next("else", TokenCategory::Keyword) {
            self.consume_image("else")?;
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        Ok(Expr::Unless {
            address,
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn expr_random(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("random")?;
        let then_branch = self.expression()?;
        let else_branch = if self.is_next("else", TokenCategory::Keyword) {
            self.consume_image("else")?;
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        Ok(Expr::Random {
            address,
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn expr_while(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("while")?;
        self.consume_image("(")?;
        let condition = self.expression()?;
        self.consume_image(")")?;

        Ok(Expr::While {
            address,
            condition: Box::new(condition),
            body: Box::new(self.expression()?),
        })
    }

    /// `loop (init; cond; post) body`, or the bare infinite form, which
    /// desugars to `while (true)`.
    fn expr_loop(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("loop")?;

        if self.is_next("(", TokenCategory::Operator) {
            self.consume_image("(")?;
            let initial = self.expression()?;
            self.consume_image(";")?;
            let condition = self.expression()?;
            self.consume_image(";")?;
            let post = self.expression()?;
            self.consume_image(")")?;

            return Ok(Expr::Loop {
                address,
                initial: Box::new(initial),
                condition: Box::new(condition),
                post: Box::new(post),
                body: Box::new(self.expression()?),
            });
        }

        Ok(Expr::While {
            address: address.clone(),
            condition: Box::new(Expr::BooleanLiteral {
                address,
                value: true,
            }),
            body: Box::new(self.expression()?),
        })
    }

    fn expr_when(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("when")?;
        self.consume_image("(")?;
        let subject = self.expression()?;
        self.consume_image(")")?;
        self.consume_image("{")?;

        let mut cases: Vec<WhenCase> = Vec::new();
        let mut default_case: Option<Box<Expr>> = None;

        while !self.is_next("}", TokenCategory::Operator) {
            if !cases.is_empty() {
                self.consume_image(",")?;
            }

            if self.is_next("if", TokenCategory::Keyword) {
                self.consume_image("if")?;
                self.consume_image("(")?;
                let condition = self.expression()?;
                self.consume_image(")")?;

                cases.push(WhenCase {
                    condition,
                    body: self.expression()?,
                });
            } else if self.is_next("else", TokenCategory::Keyword) {
                if default_case.is_some() {
                    return Err(ParseError::new(
                        Some(address),
                        "Cannot have more than one (1) else for when expression.",
                    ));
                }
                self.consume_image("else")?;
                default_case = Some(Box::new(self.expression()?));
            } else {
                let token = self.peek()?.clone();
                return Err(ParseError::new(
                    Some(token.clone()),
                    format!(
                        "Expecting \"if\" or \"else\" in when expression, encountered \"{}\"",
                        token.image()
                    ),
                ));
            }
        }
        self.consume_image("}")?;

        Ok(Expr::When {
            address,
            subject: Box::new(subject),
            cases,
            default_case,
        })
    }

    fn expr_function_decl(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("func")?;
        self.consume_image("(")?;

        let mut parameters = Vec::new();
        while !self.is_next(")", TokenCategory::Operator) {
            if !parameters.is_empty() {
                self.consume_image(",")?;
            }
            parameters.push(self.get_identifier()?);
        }
        self.consume_image(")")?;

        Ok(Expr::FunctionDeclaration {
            address,
            parameters,
            body: Arc::new(self.expression()?),
        })
    }

    fn expr_type(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("type")?;
        Ok(Expr::TypeOf {
            address,
            value: Box::new(self.expression()?),
        })
    }

    fn expr_size(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("size")?;
        Ok(Expr::SizeOf {
            address,
            value: Box::new(self.expression()?),
        })
    }

    fn expr_parallel(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("parallel")?;
        Ok(Expr::Parallel {
            address,
            body: Arc::new(self.expression()?),
        })
    }

    fn expr_lock(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("lock")?;
        self.consume_image("(")?;
        let variable = self.get_identifier()?;
        self.consume_image(")")?;

        Ok(Expr::Lock {
            address,
            variable,
            body: Box::new(self.expression()?),
        })
    }

    fn expr_single_statement(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("@")?;
        let statement = self.statement()?;

        Ok(Expr::StatementExpr {
            address,
            statement: Box::new(statement),
        })
    }

    /// `val [("native/path")] [["platform", ...]] name [= expr], ...`
    fn expr_val(&mut self) -> ParseResult<Expr> {
        let address = self.consume_image("val")?;

        let native_path = if self.is_next("(", TokenCategory::Operator) {
            self.consume_image("(")?;
            let path = self.consume_category(TokenCategory::String)?;
            self.consume_image(")")?;
            Some(path.image().to_string())
        } else {
            None
        };

        let platforms = self.platform_list()?;

        let mut declarations = Vec::new();
        loop {
            if !declarations.is_empty() {
                self.consume_image(",")?;
            }

            let name = self.get_identifier()?;
            let value = if native_path.is_none() {
                self.consume_image("=")?;
                self.expression()?
            } else {
                Expr::NilLiteral {
                    address: name.clone(),
                }
            };

            declarations.push(Declaration {
                name,
                platforms: platforms.clone(),
                value,
            });

            if !self.is_next(",", TokenCategory::Operator) {
                break;
            }
        }

        Ok(Expr::VariableDeclaration {
            address,
            declarations,
            native_path,
        })
    }

    /// `["linux", "darwin", ...]` — shared platform restriction list.
    pub(crate) fn platform_list(&mut self) -> ParseResult<Vec<String>> {
        let mut platforms = Vec::new();

        if self.is_next("[", TokenCategory::Operator) {
            self.consume_image("[")?;
            while !self.is_at_end() {
                let os = self.consume_category(TokenCategory::String)?;
                platforms.push(os.image().to_string());

                if !self.is_next("]", TokenCategory::Operator) {
                    self.consume_image(",")?;
                } else {
                    break;
                }
            }
            self.consume_image("]")?;
        }

        Ok(platforms)
    }
}
