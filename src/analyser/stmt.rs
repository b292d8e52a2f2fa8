//! Statement analysis: blocks, conditionals, loops, jumps, and I/O, with
//! `can_break`/`can_continue` threading the jump-legality context.

use crate::ast::{
    is_valid_cast_type, token_var_type, Ast, AstType, BinaryOp, NodeId, NodeKind, SymbolKind,
    VarType,
};
use crate::token::TokenKind;

use super::{AResult, AnalyseError, Analyser};

/// What statement parsing produced: a node, a run of semicolons swallowed
/// where a statement could start, or no statement (an `else` seen where the
/// caller decides what it belongs to).
pub(crate) enum ParsedStmt {
    Stmt(NodeId),
    Semicolons,
    NoStmt,
}

impl Analyser {
    /// `'{' {<variable-declaration>} {<statement>} '}'` — its own scope;
    /// declarations come first and stop at the first non-declaration token.
    pub(crate) fn analyse_block_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        ret_type: VarType,
        can_break: bool,
        can_continue: bool,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::LBrace {
            return Err(AnalyseError::new("expect '{' at block begin", token));
        }

        let block = ast.add(
            Some(parent),
            NodeKind::BlockStmt {
                vars: Vec::new(),
                stmts: Vec::new(),
            },
        );

        loop {
            let token = self.peek();
            if token.kind != TokenKind::KwConst
                && !is_valid_cast_type(token_var_type(token.kind))
            {
                break;
            }
            let vars = self.analyse_var_decl(ast, block)?;
            for var in vars {
                ast.block_add_var(block, var);
            }
        }

        while self.peek().kind != TokenKind::RBrace {
            match self.analyse_stmt(ast, block, ret_type, can_break, can_continue)? {
                ParsedStmt::Stmt(stmt) => ast.block_add_stmt(block, stmt),
                ParsedStmt::Semicolons => {}
                ParsedStmt::NoStmt => break,
            }
        }

        let token = self.read();
        if token.kind != TokenKind::RBrace {
            return Err(AnalyseError::new("expect '}' at block end", token));
        }

        Ok(block)
    }

    /// Dispatch a statement on its leading token.
    pub(crate) fn analyse_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        ret_type: VarType,
        can_break: bool,
        can_continue: bool,
    ) -> AResult<ParsedStmt> {
        let token = self.peek();
        match token.kind {
            TokenKind::Semicolon => {
                self.skip_semicolons();
                Ok(ParsedStmt::Semicolons)
            }
            TokenKind::LBrace => {
                let block =
                    self.analyse_block_stmt(ast, parent, ret_type, can_break, can_continue)?;
                Ok(ParsedStmt::Stmt(block))
            }
            TokenKind::KwIf => Ok(ParsedStmt::Stmt(
                self.analyse_if_stmt(ast, parent, ret_type, can_break, can_continue)?,
            )),
            TokenKind::KwSwitch => Ok(ParsedStmt::Stmt(
                self.analyse_switch_stmt(ast, parent, ret_type, can_continue)?,
            )),
            TokenKind::KwWhile => Ok(ParsedStmt::Stmt(
                self.analyse_while_stmt(ast, parent, ret_type)?,
            )),
            TokenKind::KwDo => Ok(ParsedStmt::Stmt(self.analyse_do_stmt(ast, parent, ret_type)?)),
            TokenKind::KwFor => Ok(ParsedStmt::Stmt(
                self.analyse_for_stmt(ast, parent, ret_type)?,
            )),
            TokenKind::KwBreak => Ok(ParsedStmt::Stmt(
                self.analyse_break_stmt(ast, parent, can_break)?,
            )),
            TokenKind::KwContinue => Ok(ParsedStmt::Stmt(
                self.analyse_continue_stmt(ast, parent, can_continue)?,
            )),
            TokenKind::KwReturn => Ok(ParsedStmt::Stmt(
                self.analyse_return_stmt(ast, parent, ret_type)?,
            )),
            TokenKind::KwPrint => Ok(ParsedStmt::Stmt(self.analyse_print_stmt(ast, parent)?)),
            TokenKind::KwScan => Ok(ParsedStmt::Stmt(self.analyse_scan_stmt(ast, parent)?)),
            TokenKind::Ident => {
                let symbol = ast.symbol_kind(parent, token.string_value(), true);
                let stmt = match symbol {
                    SymbolKind::Var => self.analyse_assign_stmt(ast, parent)?,
                    SymbolKind::Func => self.analyse_func_call_stmt(ast, parent)?,
                    SymbolKind::ConstVar => {
                        return Err(AnalyseError::new("cannot change const variable", token))
                    }
                    SymbolKind::Nul => {
                        return Err(AnalyseError::new("unknown identifier in statement", token))
                    }
                };

                let semi = self.read();
                if semi.kind != TokenKind::Semicolon {
                    let message = if symbol == SymbolKind::Var {
                        "expect ';' after assignment"
                    } else {
                        "expect ';' after function call"
                    };
                    return Err(AnalyseError::new(message, semi));
                }
                Ok(ParsedStmt::Stmt(stmt))
            }
            TokenKind::KwElse => Ok(ParsedStmt::NoStmt),
            _ => Err(AnalyseError::new("invalid statement", token)),
        }
    }

    /// `'if' '(' <condition> ')' <stmt> ['else' <stmt>]`
    fn analyse_if_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        ret_type: VarType,
        can_break: bool,
        can_continue: bool,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwIf {
            return Err(AnalyseError::new("expect 'if'", token));
        }
        let token = self.read();
        if token.kind != TokenKind::LParen {
            return Err(AnalyseError::new("expect '(' before 'if'", token));
        }

        let cond = self.analyse_cond_expr(ast, parent)?;

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new("expect ')' after 'if'", token));
        }

        let then_stmt = match self.analyse_stmt(ast, parent, ret_type, can_break, can_continue)? {
            ParsedStmt::Stmt(stmt) => stmt,
            _ => ast.add(Some(parent), NodeKind::EmptyStmt),
        };

        let if_stmt = ast.add(
            Some(parent),
            NodeKind::IfStmt {
                cond,
                then_stmt,
                else_stmt: None,
            },
        );
        ast.set_parent(cond, if_stmt);
        ast.set_parent(then_stmt, if_stmt);

        if self.peek().kind == TokenKind::KwElse {
            self.read();
            let else_stmt =
                match self.analyse_stmt(ast, if_stmt, ret_type, can_break, can_continue)? {
                    ParsedStmt::Stmt(stmt) => stmt,
                    _ => ast.add(Some(if_stmt), NodeKind::EmptyStmt),
                };
            ast.if_set_else(if_stmt, else_stmt);
        }

        Ok(if_stmt)
    }

    /// `'switch' '(' <expression> ')' '{' {<labeled-statement>} '}'`
    ///
    /// The controller must have a castable (numeric) type. `default`
    /// children come back unlabeled; at most one is allowed.
    fn analyse_switch_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        ret_type: VarType,
        can_continue: bool,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwSwitch {
            return Err(AnalyseError::new("expect 'switch'", token));
        }
        let paren = self.read();
        if paren.kind != TokenKind::LParen {
            return Err(AnalyseError::new(
                "expect '(' before 'switch' expression",
                paren,
            ));
        }

        let cond = self.analyse_expr(ast, parent, false)?;
        let cond_type = ast.var_type(cond);
        if !is_valid_cast_type(cond_type) {
            return Err(AnalyseError::new(
                format!("invalid switch condition expression type:{cond_type}"),
                paren,
            ));
        }

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new(
                "expect ')' after 'switch' expression",
                token,
            ));
        }

        let token = self.read();
        if token.kind != TokenKind::LBrace {
            return Err(AnalyseError::new("expect '{' at switch case begin", token));
        }

        let mut case_stmts = Vec::new();
        let mut has_default = false;
        while matches!(self.peek().kind, TokenKind::KwCase | TokenKind::KwDefault) {
            let token = self.peek();
            let stmt = self.analyse_labeled_stmt(ast, parent, ret_type, can_continue)?;
            if ast.ast_type(stmt) != AstType::LabeledStmt {
                if has_default {
                    return Err(AnalyseError::new("only one 'default' case allowed", token));
                }
                has_default = true;
            }
            case_stmts.push(stmt);
        }

        let token = self.read();
        if token.kind != TokenKind::RBrace {
            return Err(AnalyseError::new("expect '}' at switch case end", token));
        }

        let switch = ast.add(
            Some(parent),
            NodeKind::SwitchStmt {
                cond,
                cases: Vec::new(),
            },
        );
        ast.set_parent(cond, switch);
        for stmt in case_stmts {
            ast.set_parent(stmt, switch);
            ast.switch_add_case(switch, stmt);
        }
        Ok(switch)
    }

    /// `'case' <const-literal> ':' <stmt> | 'default' ':' <stmt>`
    ///
    /// The case value must fold to an integer or char at analysis time
    /// (literals, possibly sign-wrapped). Labeled statements may `break`.
    fn analyse_labeled_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        ret_type: VarType,
        can_continue: bool,
    ) -> AResult<NodeId> {
        let token = self.read();
        let label = match token.kind {
            TokenKind::KwCase => {
                let expr = self.analyse_expr(ast, parent, true)?;
                let folds = ast.is_const_expr(expr)
                    && matches!(ast.var_type(expr), VarType::Int | VarType::Char);
                if !folds {
                    return Err(AnalyseError::new(
                        "switch cast expression only can be integer literal or char literal",
                        token,
                    ));
                }
                Some(if ast.var_type(expr) == VarType::Char {
                    i32::from(ast.const_char(expr) as i8)
                } else {
                    ast.const_int(expr)
                })
            }
            TokenKind::KwDefault => None,
            _ => return Err(AnalyseError::new("invalid switch cast", token)),
        };

        let colon = self.read();
        if colon.kind != TokenKind::Colon {
            let message = if label.is_some() {
                "expect ':' after 'cast' condition"
            } else {
                "expect ':' after 'default'"
            };
            return Err(AnalyseError::new(message, colon));
        }

        let stmt = match self.analyse_stmt(ast, parent, ret_type, true, can_continue)? {
            ParsedStmt::Stmt(stmt) => stmt,
            _ => ast.add(Some(parent), NodeKind::EmptyStmt),
        };

        match label {
            None => Ok(stmt),
            Some(label) => {
                let labeled = ast.add(Some(parent), NodeKind::LabeledStmt { label, stmt });
                ast.set_parent(stmt, labeled);
                Ok(labeled)
            }
        }
    }

    /// `'while' '(' <condition> ')' <stmt>` — body may break and continue.
    fn analyse_while_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        ret_type: VarType,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwWhile {
            return Err(AnalyseError::new("expect 'while'", token));
        }
        let token = self.read();
        if token.kind != TokenKind::LParen {
            return Err(AnalyseError::new("expect '(' after 'while'", token));
        }

        let cond = self.analyse_cond_expr(ast, parent)?;

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new("expect ')' after 'while'", token));
        }

        let body = match self.analyse_stmt(ast, parent, ret_type, true, true)? {
            ParsedStmt::Stmt(stmt) => stmt,
            _ => ast.add(Some(parent), NodeKind::EmptyStmt),
        };

        let while_stmt = ast.add(Some(parent), NodeKind::WhileStmt { cond, body });
        ast.set_parent(cond, while_stmt);
        ast.set_parent(body, while_stmt);
        Ok(while_stmt)
    }

    /// `'do' <stmt> 'while' '(' <condition> ')'` — the trailing semicolon
    /// reads as an empty statement in the surrounding block.
    fn analyse_do_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        ret_type: VarType,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwDo {
            return Err(AnalyseError::new("expect 'do'", token));
        }

        let body = match self.analyse_stmt(ast, parent, ret_type, true, true)? {
            ParsedStmt::Stmt(stmt) => stmt,
            _ => ast.add(Some(parent), NodeKind::EmptyStmt),
        };

        let token = self.read();
        if token.kind != TokenKind::KwWhile {
            return Err(AnalyseError::new("expect 'while' after do statement", token));
        }

        let token = self.read();
        if token.kind != TokenKind::LParen {
            return Err(AnalyseError::new(
                "expect '(' before 'do while' condition",
                token,
            ));
        }

        let cond = self.analyse_cond_expr(ast, parent)?;

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new(
                "expect ')' after 'do while' condition",
                token,
            ));
        }

        let do_stmt = ast.add(Some(parent), NodeKind::DoStmt { body, cond });
        ast.set_parent(body, do_stmt);
        ast.set_parent(cond, do_stmt);
        Ok(do_stmt)
    }

    /// `'for' '(' <init> ';' [<condition>] ';' [<update>] ')' <stmt>`
    ///
    /// The condition is the one speculative parse in the analyser: save the
    /// cursor, try, and on failure (or a missing terminating `;`) rewind
    /// and substitute the constant condition `1 != 0`.
    fn analyse_for_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        ret_type: VarType,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwFor {
            return Err(AnalyseError::new("expect 'for'", token));
        }

        let token = self.read();
        if token.kind != TokenKind::LParen {
            return Err(AnalyseError::new("expect '(' after 'for'", token));
        }

        let for_stmt = ast.add(
            Some(parent),
            NodeKind::ForStmt {
                inits: Vec::new(),
                cond: None,
                updates: Vec::new(),
                body: None,
            },
        );

        while self.peek().kind != TokenKind::Semicolon {
            let expr = self.analyse_assign_expr(ast, for_stmt)?;
            ast.for_add_init(for_stmt, expr);
            if self.peek().kind == TokenKind::Comma {
                self.read();
            }
        }

        let token = self.read();
        if token.kind != TokenKind::Semicolon {
            return Err(AnalyseError::new(
                "expect ';' after for init expression",
                token,
            ));
        }

        let saved = self.cur;
        let cond = match self.analyse_cond_expr(ast, for_stmt) {
            Ok(cond) if self.peek().kind == TokenKind::Semicolon => {
                self.read();
                cond
            }
            _ => {
                self.cur = saved;
                let left = ast.add(Some(for_stmt), NodeKind::IntExpr { value: 1 });
                let right = ast.add(Some(for_stmt), NodeKind::IntExpr { value: 0 });
                let cond = ast.add(
                    Some(for_stmt),
                    NodeKind::BinaryExpr {
                        op: BinaryOp::NotEqual,
                        left,
                        right,
                    },
                );
                ast.set_parent(left, cond);
                ast.set_parent(right, cond);
                cond
            }
        };
        ast.for_set_cond(for_stmt, cond);

        while self.peek().kind != TokenKind::RParen {
            let token = self.peek();
            if token.kind != TokenKind::Ident {
                return Err(AnalyseError::new("invalid for update express", token));
            }
            let expr = if ast.symbol_kind(parent, token.string_value(), true) == SymbolKind::Func {
                self.analyse_func_call_expr(ast, for_stmt, false)?
            } else {
                self.analyse_assign_expr(ast, for_stmt)?
            };
            ast.for_add_update(for_stmt, expr);
            if self.peek().kind == TokenKind::Comma {
                self.read();
            }
        }

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new(
                "expect ')' after for update expression",
                token,
            ));
        }

        let body = match self.analyse_stmt(ast, for_stmt, ret_type, true, true)? {
            ParsedStmt::Stmt(stmt) => stmt,
            _ => ast.add(Some(for_stmt), NodeKind::EmptyStmt),
        };
        ast.for_set_body(for_stmt, body);

        Ok(for_stmt)
    }

    /// `'break' ';'`
    fn analyse_break_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        can_break: bool,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwBreak {
            return Err(AnalyseError::new("expect 'break'", token));
        }
        if !can_break {
            return Err(AnalyseError::new(
                "only loop or switch can use 'break' statement",
                token,
            ));
        }

        let token = self.read();
        if token.kind != TokenKind::Semicolon {
            return Err(AnalyseError::new("expect ';' after 'break'", token));
        }

        Ok(ast.add(Some(parent), NodeKind::BreakStmt))
    }

    /// `'continue' ';'`
    fn analyse_continue_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        can_continue: bool,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwContinue {
            return Err(AnalyseError::new("expect 'continue'", token));
        }
        if !can_continue {
            return Err(AnalyseError::new(
                "only loop can use 'continue' statement",
                token,
            ));
        }

        let token = self.read();
        if token.kind != TokenKind::Semicolon {
            return Err(AnalyseError::new("expect ';' after 'continue'", token));
        }

        Ok(ast.add(Some(parent), NodeKind::ContinueStmt))
    }

    /// `'return' [<expression>] ';'` — a `void` function returns nothing; a
    /// value-returning function's expression coerces to the return type.
    fn analyse_return_stmt(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
        ret_type: VarType,
    ) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwReturn {
            return Err(AnalyseError::new("expect 'return'", token));
        }

        let ret = ast.add(Some(parent), NodeKind::ReturnStmt { expr: None });

        let token = self.peek();
        if token.kind != TokenKind::Semicolon {
            if ret_type == VarType::Void {
                return Err(AnalyseError::new(
                    "void function cannot return any value",
                    token,
                ));
            }
            let expr = self.analyse_expr(ast, ret, false)?;
            let expr = self.cast_implicit(ast, ret, &token, expr, ret_type, "")?;
            ast.return_set_expr(ret, expr);
        }

        let token = self.read();
        if token.kind != TokenKind::Semicolon {
            return Err(AnalyseError::new("expect ';' after return expression", token));
        }

        Ok(ret)
    }

    /// `'print' '(' [<expr> {',' <expr>}] ')' ';'` — any type prints,
    /// strings included.
    fn analyse_print_stmt(&mut self, ast: &mut Ast, parent: NodeId) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwPrint {
            return Err(AnalyseError::new("expect 'print'", token));
        }

        let token = self.read();
        if token.kind != TokenKind::LParen {
            return Err(AnalyseError::new("expect '(' after print", token));
        }

        let print = ast.add(Some(parent), NodeKind::PrintStmt { args: Vec::new() });

        while self.peek().kind != TokenKind::RParen {
            let arg = self.analyse_expr(ast, print, false)?;
            ast.print_add_arg(print, arg);
            if self.peek().kind == TokenKind::Comma {
                self.read();
            }
        }

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new("expect ')' after print parameters", token));
        }

        let token = self.read();
        if token.kind != TokenKind::Semicolon {
            return Err(AnalyseError::new("expect ';' after print statement", token));
        }

        Ok(print)
    }

    /// `'scan' '(' <identifier> ')' ';'` — the name is recorded as written
    /// and not resolved here.
    fn analyse_scan_stmt(&mut self, ast: &mut Ast, parent: NodeId) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::KwScan {
            return Err(AnalyseError::new("expect 'scan'", token));
        }

        let token = self.read();
        if token.kind != TokenKind::LParen {
            return Err(AnalyseError::new("expect '(' after scan", token));
        }

        let token = self.read();
        if token.kind != TokenKind::Ident {
            return Err(AnalyseError::new("expect identifier in scan parameter", token));
        }
        let name = token.string_value().to_string();

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new("expect ')' after scan parameters", token));
        }

        let token = self.read();
        if token.kind != TokenKind::Semicolon {
            return Err(AnalyseError::new("expect ';' after scan statement", token));
        }

        Ok(ast.add(Some(parent), NodeKind::ScanStmt { name }))
    }

    /// `<ident> '=' <expression>` in statement position. The target must be
    /// a known non-const variable; the value coerces to its type.
    fn analyse_assign_stmt(&mut self, ast: &mut Ast, parent: NodeId) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::Ident {
            return Err(AnalyseError::new(
                "expect identifier in assignment statement",
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
                "cannot find variable in assignment statement",
                token,
            ));
        };
        if is_const {
            return Err(AnalyseError::new(
                "cannot assign on const variable in assignment statement",
                token,
            ));
        }

        let token = self.read();
        if token.kind != TokenKind::Assign {
            return Err(AnalyseError::new(
                "expect '=' after identifier in assignment statement",
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
            "invalid assignment statement, ",
        )?;

        let assign = ast.add(Some(parent), NodeKind::AssignStmt { name, expr });
        ast.set_parent(expr, assign);
        Ok(assign)
    }

    /// `<ident> '(' [<expr> {',' <expr>}] ')'` in statement position. The
    /// return value (if any) is discarded, so `void` functions are fine.
    fn analyse_func_call_stmt(&mut self, ast: &mut Ast, parent: NodeId) -> AResult<NodeId> {
        let token = self.read();
        if token.kind != TokenKind::Ident {
            return Err(AnalyseError::new(
                "expect identifier in function call statement",
                token,
            ));
        }
        let name = token.string_value().to_string();
        let decl = ast.symbol(parent, &name, true);
        let Some(params) = decl.and_then(|d| match ast.kind(d) {
            NodeKind::FuncDecl { params, .. } => Some(params.clone()),
            _ => None,
        }) else {
            return Err(AnalyseError::new(
                "identifier is not a function name in function call statement",
                token,
            ));
        };

        let token = self.read();
        if token.kind != TokenKind::LParen {
            return Err(AnalyseError::new(
                "expect '(' before function call parameters in function call statement",
                token,
            ));
        }

        let call = ast.add(
            Some(parent),
            NodeKind::FuncCallStmt {
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
                    "parameter number mismatch in function call statement, need {}, have {}",
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
                &format!("for {i}th function param in function call statement, "),
            )?;
            ast.call_add_arg(call, arg);
        }

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new(
                "expect ')' after parameters in function call statement",
                token,
            ));
        }

        Ok(call)
    }
}
