//! Expression analysis: a precedence climb that types every node as it is
//! built, inserting implicit casts wherever operand types disagree.

use crate::ast::{
    is_castable, is_valid_cast_type, merge_var_type, token_var_type, Ast, BinaryOp, NodeId,
    NodeKind, SymbolKind, UnaryOp, VarType,
};
use crate::token::{Token, TokenKind};

use super::{AResult, AnalyseError, Analyser};

impl Analyser {
    /// `<expression> ::= <additive-expression>`
    ///
    /// `need_const` marks contexts (const initialisers, case labels) where
    /// only constant-valued operands are legal.
    pub(crate) fn analyse_expr(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        need_const: bool,
    ) -> AResult<NodeId> {
        self.analyse_add_expr(ast, parent, need_const)
    }

    /// `<condition> ::= <expression> [<relational-operator> <expression>]`
    ///
    /// A bare expression compares against zero: `expr != 0`, with a float
    /// zero when the left side is a float.
    pub(crate) fn analyse_cond_expr(&mut self, ast: &mut Ast, parent: NodeId) -> AResult<NodeId> {
        let left = self.analyse_expr(ast, parent, false)?;

        let token = self.read();
        let op = match token.kind {
            TokenKind::Less => Some(BinaryOp::Less),
            TokenKind::LessEqual => Some(BinaryOp::LessEqual),
            TokenKind::Greater => Some(BinaryOp::Greater),
            TokenKind::GreaterEqual => Some(BinaryOp::GreaterEqual),
            TokenKind::NotEqual => Some(BinaryOp::NotEqual),
            TokenKind::Equal => Some(BinaryOp::Equal),
            _ => None,
        };

        let (op, right) = match op {
            Some(op) => (op, self.analyse_expr(ast, parent, false)?),
            None => {
                self.unread(1);
                let right = if ast.var_type(left) != VarType::Float {
                    ast.add(Some(parent), NodeKind::IntExpr { value: 0 })
                } else {
                    ast.add(Some(parent), NodeKind::FloatExpr { value: 0.0 })
                };
                (BinaryOp::NotEqual, right)
            }
        };

        let merged = merge_var_type(ast.var_type(left), ast.var_type(right));
        let left = self.cast_implicit(ast, parent, &token, left, merged, "")?;
        let right = self.cast_implicit(ast, parent, &token, right, merged, "")?;

        let expr = ast.add(Some(parent), NodeKind::BinaryExpr { op, left, right });
        ast.set_parent(left, expr);
        ast.set_parent(right, expr);
        Ok(expr)
    }

    /// `<additive> ::= <multiplicative> {('+'|'-') <multiplicative>}`
    fn analyse_add_expr(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        need_const: bool,
    ) -> AResult<NodeId> {
        let mut left = self.analyse_mul_expr(ast, parent, need_const)?;

        loop {
            let token = self.peek();
            let op = match token.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.read();

            let right = self.analyse_mul_expr(ast, parent, need_const)?;
            left = self.build_binary(ast, parent, &token, op, left, right)?;
        }

        Ok(left)
    }

    /// `<multiplicative> ::= <cast> {('*'|'/') <cast>}`
    fn analyse_mul_expr(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        need_const: bool,
    ) -> AResult<NodeId> {
        let mut left = self.analyse_cast_expr(ast, parent, need_const)?;

        loop {
            let token = self.peek();
            let op = match token.kind {
                TokenKind::Mul => BinaryOp::Mul,
                TokenKind::Div => BinaryOp::Div,
                _ => break,
            };
            self.read();

            let right = self.analyse_cast_expr(ast, parent, need_const)?;
            left = self.build_binary(ast, parent, &token, op, left, right)?;
        }

        Ok(left)
    }

    /// Merge the operand types, coerce both sides, and build the node.
    fn build_binary(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        token: &Token,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    ) -> AResult<NodeId> {
        let merged = merge_var_type(ast.var_type(left), ast.var_type(right));
        let left = self.cast_implicit(ast, parent, token, left, merged, "")?;
        let right = self.cast_implicit(ast, parent, token, right, merged, "")?;
        let expr = ast.add(Some(parent), NodeKind::BinaryExpr { op, left, right });
        ast.set_parent(left, expr);
        ast.set_parent(right, expr);
        Ok(expr)
    }

    /// `<cast> ::= {'(' <simple-type> ')'} <unary>`
    ///
    /// A parenthesis opens a cast only when the next token is a castable
    /// type specifier; otherwise it is left for the primary expression.
    fn analyse_cast_expr(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        need_const: bool,
    ) -> AResult<NodeId> {
        let mut casts: Vec<(VarType, Token)> = Vec::new();
        loop {
            if self.peek().kind != TokenKind::LParen {
                break;
            }
            let target = token_var_type(self.peek_at(1).kind);
            if !is_valid_cast_type(target) {
                break;
            }
            self.read();
            self.read();
            let token = self.read();
            if token.kind != TokenKind::RParen {
                return Err(AnalyseError::new(
                    "invalid cast expression, expect ')' after type",
                    token,
                ));
            }
            casts.push((target, token));
        }

        let mut expr = self.analyse_unary_expr(ast, parent, need_const)?;

        // innermost cast applies first
        for (target, token) in casts.into_iter().rev() {
            let from = ast.var_type(expr);
            if !is_castable(from, target) {
                return Err(AnalyseError::new(
                    format!("can not cast type from '{from}' to '{target}'"),
                    token,
                ));
            }
            let cast = ast.add(
                Some(parent),
                NodeKind::CastExpr {
                    target,
                    is_explicit: true,
                    expr,
                },
            );
            ast.set_parent(expr, cast);
            expr = cast;
        }

        Ok(expr)
    }

    /// `<unary> ::= ['+'|'-'] <primary>`
    fn analyse_unary_expr(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        need_const: bool,
    ) -> AResult<NodeId> {
        let token = self.peek();
        let op = match token.kind {
            TokenKind::Plus => UnaryOp::Positive,
            TokenKind::Minus => UnaryOp::Negative,
            _ => return self.analyse_primary_expr(ast, parent, need_const),
        };
        self.read();

        let expr = self.analyse_primary_expr(ast, parent, need_const)?;
        if ast.var_type(expr) == VarType::Str {
            return Err(AnalyseError::new(
                "cannot apply unary operator on string",
                token,
            ));
        }

        let unary = ast.add(Some(parent), NodeKind::UnaryExpr { op, expr });
        ast.set_parent(expr, unary);
        Ok(unary)
    }

    /// `<primary> ::= '(' <expression> ')' | <ident> | <literal> | <call>`
    fn analyse_primary_expr(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        need_const: bool,
    ) -> AResult<NodeId> {
        let token = self.read();
        match token.kind {
            TokenKind::LParen => {
                let expr = self.analyse_expr(ast, parent, need_const)?;
                let closing = self.read();
                if closing.kind != TokenKind::RParen {
                    return Err(AnalyseError::new("expect ')' after expression", closing));
                }
                let brace = ast.add(Some(parent), NodeKind::BraceExpr { expr });
                ast.set_parent(expr, brace);
                Ok(brace)
            }
            TokenKind::Int => Ok(ast.add(
                Some(parent),
                NodeKind::IntExpr {
                    value: token.int_value(),
                },
            )),
            TokenKind::Char => Ok(ast.add(
                Some(parent),
                NodeKind::CharExpr {
                    value: token.char_value(),
                },
            )),
            TokenKind::Float => Ok(ast.add(
                Some(parent),
                NodeKind::FloatExpr {
                    value: token.float_value(),
                },
            )),
            TokenKind::Str => Ok(ast.add(
                Some(parent),
                NodeKind::StrExpr {
                    value: token.string_value().to_string(),
                },
            )),
            TokenKind::Ident => {
                let name = token.string_value();
                match ast.symbol_kind(parent, name, true) {
                    t @ (SymbolKind::Var | SymbolKind::ConstVar) => {
                        if need_const && t != SymbolKind::ConstVar {
                            return Err(AnalyseError::new("expect const variable", token));
                        }
                        Ok(ast.add(
                            Some(parent),
                            NodeKind::IdentExpr {
                                name: name.to_string(),
                            },
                        ))
                    }
                    SymbolKind::Func => {
                        if need_const {
                            return Err(AnalyseError::new(
                                "expect const express but got function call",
                                token,
                            ));
                        }
                        self.unread(1);
                        self.analyse_func_call_expr(ast, parent, true)
                    }
                    SymbolKind::Nul => Err(AnalyseError::new(
                        "unknown identifier in primary expression",
                        token,
                    )),
                }
            }
            _ => Err(AnalyseError::new("expect primary expression", token)),
        }
    }

    /// `<assignment-expression> ::= <ident> '=' <expression>` — only legal
    /// inside `for` init and update clauses. The target must be a known
    /// non-const variable.
    pub(crate) fn analyse_assign_expr(&mut self, ast: &mut Ast, parent: NodeId) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::Ident {
            return Err(AnalyseError::new(
                "expect identifier in assignment expression",
                token,
            ));
        }
        let name = token.string_value().to_string();
        let decl = ast.symbol(parent, &name, true);
        let Some((var_type, is_const)) = decl.and_then(|d| match ast.kind(d) {
            NodeKind::VarDecl {
                var_type, is_const, ..
            } => Some((*var_type, *is_const)),
            _ => None,
        }) else {
            return Err(AnalyseError::new(
                "cannot find variable in assignment expression",
                token,
            ));
        };
        if is_const {
            return Err(AnalyseError::new(
                "cannot assign on const variable in assignment expression",
                token,
            ));
        }

        let token = self.read();
        if token.kind != TokenKind::Assign {
            return Err(AnalyseError::new(
                "expect '=' after identifier in assignment expression",
                token,
            ));
        }

        let expr = self.analyse_expr(ast, parent, false)?;
        let expr = self.cast_implicit(
            ast,
            parent,
            &token,
            expr,
            var_type,
            "invalid assignment expression, ",
        )?;

        let assign = ast.add(Some(parent), NodeKind::AssignExpr { name, expr });
        ast.set_parent(expr, assign);
        Ok(assign)
    }

    /// `<function-call> ::= <ident> '(' [<expr> {',' <expr>}] ')'`
    ///
    /// With `need_return` set (every value context) a `void` function is
    /// rejected. Arity must match; each argument is coerced to the declared
    /// parameter type.
    pub(crate) fn analyse_func_call_expr(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        need_return: bool,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::Ident {
            return Err(AnalyseError::new(
                "expect function name in function call expression",
                token,
            ));
        }
        let name = token.string_value().to_string();
        let decl = ast.symbol(parent, &name, true);
        let Some((params, ret_type)) = decl.and_then(|d| match ast.kind(d) {
            NodeKind::FuncDecl {
                params, ret_type, ..
            } => Some((params.clone(), *ret_type)),
            _ => None,
        }) else {
            return Err(AnalyseError::new(
                "identifier is not a function name in function call expression",
                token,
            ));
        };
        if need_return && ret_type == VarType::Void {
            return Err(AnalyseError::new(
                "function has no return in function call expression",
                token,
            ));
        }

        let token = self.read();
        if token.kind != TokenKind::LParen {
            return Err(AnalyseError::new(
                "expect '(' before parameters in function call expression",
                token,
            ));
        }

        let call = ast.add(
            Some(parent),
            NodeKind::FuncCallExpr {
                name,
                args: Vec::new(),
            },
        );
        let mut call_args = Vec::new();

        while self.peek().kind != TokenKind::RParen {
            let arg = self.analyse_expr(ast, call, false)?;
            call_args.push(arg);
            if self.peek().kind == TokenKind::Comma {
                self.read();
            }
        }

        let token = self.peek();
        if call_args.len() != params.len() {
            return Err(AnalyseError::new(
                format!(
                    "parameter number mismatch in function call expression, need {}, have {}",
                    params.len(),
                    call_args.len()
                ),
                token,
            ));
        }
        for (i, (&arg, &param)) in call_args.iter().zip(params.iter()).enumerate() {
            let param_type = ast.var_type(param);
            let arg = self.cast_implicit(
                ast,
                call,
                &token,
                arg,
                param_type,
                &format!("for {i}th function param in function call expression, "),
            )?;
            ast.call_add_arg(call, arg);
        }

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new(
                "expect ')' after parameters in function call expression",
                token,
            ));
        }

        Ok(call)
    }
}
