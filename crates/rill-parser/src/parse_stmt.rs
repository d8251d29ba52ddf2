//! Statement parsing.
//!
//! Each statement consumes its leading keyword then its own sub-grammar.
//! A trailing `;` is optional everywhere; a bare `;` is an empty
//! statement. Anything that is not a statement keyword parses as an
//! expression statement.

use rill_types::ast::{Declaration, Expr, Stmt};
use rill_types::TokenCategory;

use crate::parser::{ParseResult, Parser};

impl Parser {
    /// Parse one statement.
    pub(crate) fn statement(&mut self) -> ParseResult<Stmt> {
        if self.is_next("break", TokenCategory::Keyword) {
            return self.stmt_break();
        }
        if self.is_next("continue", TokenCategory::Keyword) {
            return self.stmt_continue();
        }
        if self.is_next("delete", TokenCategory::Keyword) {
            return self.stmt_delete();
        }
        if self.is_next("enum", TokenCategory::Keyword) {
            return self.stmt_enum();
        }
        if self.is_next("halt", TokenCategory::Keyword) {
            return self.stmt_halt();
        }
        if self.is_next("import", TokenCategory::Keyword) {
            return self.stmt_import();
        }
        if self.is_next("mod", TokenCategory::Keyword) {
            return self.stmt_mod();
        }
        if self.is_next("ret", TokenCategory::Keyword) {
            return self.stmt_ret();
        }
        if self.is_next("throw", TokenCategory::Keyword) {
            return self.stmt_throw();
        }
        if self.is_next("test", TokenCategory::Keyword) {
            return self.stmt_test();
        }
        if self.is_next("use", TokenCategory::Keyword) {
            return self.stmt_use();
        }
        if self.is_next("wait", TokenCategory::Keyword) {
            return self.stmt_wait();
        }
        if self.is_next(";", TokenCategory::Operator) {
            let address = self.consume_image(";")?;
            return Ok(Stmt::Empty { address });
        }

        let expr = self.expression()?;
        self.eat_semicolon()?;
        Ok(Stmt::Expression { expr })
    }

    fn stmt_break(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("break")?;
        self.eat_semicolon()?;
        Ok(Stmt::Break { address })
    }

    fn stmt_continue(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("continue")?;
        self.eat_semicolon()?;
        Ok(Stmt::Continue { address })
    }

    fn stmt_delete(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("delete")?;
        let mut variables = vec![self.get_identifier()?];

        while self.is_next(",", TokenCategory::Operator) {
            self.consume_image(",")?;
            variables.push(self.get_identifier()?);
        }
        self.eat_semicolon()?;

        Ok(Stmt::Delete { address, variables })
    }

    /// `enum Name { a = expr, b = expr }`
    fn stmt_enum(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("enum")?;
        let name = self.get_identifier()?;
        self.consume_image("{")?;

        let mut members = Vec::new();
        while !self.is_at_end() && !self.is_next("}", TokenCategory::Operator) {
            if !members.is_empty() {
                self.consume_image(",")?;
            }

            let item = self.consume_category(TokenCategory::Identifier)?;
            self.consume_image("=")?;
            members.push((item, self.expression()?));
        }
        self.consume_image("}")?;

        Ok(Stmt::Enum {
            address,
            name,
            members,
        })
    }

    fn stmt_halt(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("halt")?;
        self.eat_semicolon()?;
        Ok(Stmt::Halt { address })
    }

    /// `import name { a, b } from "path"` or `import name : a from "path"`.
    ///
    /// Desugars to a native-bound variable declaration whose member names
    /// are qualified with the module name.
    fn stmt_import(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("import")?;

        let name = if self.is_next_category(TokenCategory::Identifier) {
            self.get_identifier()?.image().to_string()
        } else {
            String::new()
        };

        let mut platforms = self.platform_list()?;
        let mut declarations = Vec::new();

        if self.is_next("{", TokenCategory::Operator) {
            self.consume_image("{")?;

            loop {
                if !declarations.is_empty() {
                    self.consume_image(",")?;
                }

                let mut variable = self.get_identifier()?;
                variable.set_image(format!("{name}.{}", variable.image()));

                // A per-member platform list extends the shared one.
                platforms.extend(self.platform_list()?);

                declarations.push(Declaration {
                    name: variable.clone(),
                    platforms: platforms.clone(),
                    value: Expr::NilLiteral { address: variable },
                });

                if !self.is_next(",", TokenCategory::Operator) {
                    break;
                }
            }
            self.consume_image("}")?;
        } else {
            self.consume_image(":")?;

            let variable = self.get_identifier()?;
            declarations.push(Declaration {
                name: variable.clone(),
                platforms: platforms.clone(),
                value: Expr::NilLiteral { address: variable },
            });
        }

        self.consume_image("from")?;
        let native_path = self.consume_category(TokenCategory::String)?;

        Ok(Stmt::Expression {
            expr: Expr::VariableDeclaration {
                address,
                declarations,
                native_path: Some(native_path.image().to_string()),
            },
        })
    }

    /// `mod name { item: expr ... }`
    fn stmt_mod(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("mod")?;
        let name = self.get_identifier()?;
        self.consume_image("{")?;

        let mut members = Vec::new();
        while !self.is_at_end() && !self.is_next("}", TokenCategory::Operator) {
            let item = self.consume_category(TokenCategory::Identifier)?;
            self.consume_image(":")?;
            members.push((item, self.expression()?));
        }
        self.consume_image("}")?;

        Ok(Stmt::Mod {
            address,
            name,
            members,
        })
    }

    fn stmt_ret(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("ret")?;
        let value = self.expression()?;
        self.eat_semicolon()?;

        Ok(Stmt::Return { address, value })
    }

    fn stmt_throw(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("throw")?;
        let value = self.expression()?;
        self.eat_semicolon()?;

        Ok(Stmt::Throw { address, value })
    }

    /// `test (name) [if (assert)] body`
    fn stmt_test(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("test")?;
        self.consume_image("(")?;
        let name = self.expression()?;
        self.consume_image(")")?;

        let assertion = if self.is_next("if", TokenCategory::Keyword) {
            self.consume_image("if")?;
            self.consume_image("(")?;
            let assertion = self.expression()?;
            self.consume_image(")")?;
            Some(assertion)
        } else {
            None
        };

        let body = self.expression()?;
        self.eat_semicolon()?;

        Ok(Stmt::Test {
            address,
            name,
            assertion,
            body,
        })
    }

    /// `use library [@ version]` — the version defaults to `1.0.0`.
    fn stmt_use(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("use")?;
        let library = self.expression()?;

        let version = if self.is_next("@", TokenCategory::Operator) {
            self.consume_image("@")?;
            self.expression()?
        } else {
            Expr::StringLiteral {
                address: address.clone(),
                value: "1.0.0".to_string(),
            }
        };
        self.eat_semicolon()?;

        Ok(Stmt::Use {
            address,
            library,
            version,
        })
    }

    fn stmt_wait(&mut self) -> ParseResult<Stmt> {
        let address = self.consume_image("wait")?;
        self.eat_semicolon()?;
        Ok(Stmt::Wait { address })
    }
}
