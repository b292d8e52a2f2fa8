//! Variable and function declaration analysis.

use crate::ast::{token_var_type, NodeId, NodeKind, SymbolKind, VarType};
use crate::token::TokenKind;

use super::{AResult, AnalyseError, Analyser};
use crate::ast::Ast;

impl Analyser {
    /// `[const] <type> <ident> ['=' <expr>] {',' <ident> ['=' <expr>]} ';'`
    ///
    /// Declarators become visible to the surrounding scope only after the
    /// whole declaration is parsed, so an initialiser never sees the names
    /// introduced alongside it.
    pub(crate) fn analyse_var_decl(
        &mut self,
        ast: &mut Ast,
        parent: NodeId,
    ) -> AResult<Vec<NodeId>> {
        let mut vars = Vec::new();

        let mut is_const = false;
        let mut token = self.read();
        if token.kind == TokenKind::KwConst {
            is_const = true;
            token = self.read();
        }

        let var_type = token_var_type(token.kind);
        if var_type == VarType::Nul || var_type == VarType::Void {
            return Err(AnalyseError::new("expect type-specifier", token));
        }

        loop {
            token = self.read();
            if token.kind != TokenKind::Ident {
                return Err(AnalyseError::new("expect variable name", token));
            }
            let name = token.string_value().to_string();
            if ast.symbol_kind(parent, &name, false) != SymbolKind::Nul {
                return Err(AnalyseError::new("variable name repeated", token));
            }

            let var = ast.add(
                Some(parent),
                NodeKind::VarDecl {
                    is_param: false,
                    is_const,
                    var_type,
                    name,
                    init: None,
                },
            );
            vars.push(var);

            token = self.read();
            if token.kind == TokenKind::Assign {
                let expr = self.analyse_expr(ast, var, is_const)?;
                let expr = self.cast_implicit(
                    ast,
                    var,
                    &token,
                    expr,
                    var_type,
                    "invalid variable declare, ",
                )?;
                ast.var_set_init(var, expr);
                token = self.read();
            }

            match token.kind {
                TokenKind::Semicolon => break,
                TokenKind::Comma => {}
                _ => return Err(AnalyseError::new("invalid variable declare", token)),
            }
        }

        Ok(vars)
    }

    /// `<type> <ident> '(' [<param> {',' <param>}] ')' <block>`
    pub(crate) fn analyse_func_decl(&mut self, ast: &mut Ast, parent: NodeId) -> AResult<NodeId> {
        let token = self.read();
        let ret_type = token_var_type(token.kind);
        if ret_type == VarType::Nul {
            return Err(AnalyseError::new(
                "expect type-specifier for function return type",
                token,
            ));
        }

        let token = self.read();
        if token.kind != TokenKind::Ident {
            return Err(AnalyseError::new("expect function name", token));
        }
        let name = token.string_value().to_string();
        if ast.symbol_kind(parent, &name, false) != SymbolKind::Nul {
            return Err(AnalyseError::new("function name repeated", token));
        }

        let token = self.read();
        if token.kind != TokenKind::LParen {
            return Err(AnalyseError::new("expect '(' after function name", token));
        }

        let func = ast.add(
            Some(parent),
            NodeKind::FuncDecl {
                ret_type,
                name,
                params: Vec::new(),
                body: None,
            },
        );

        while self.peek().kind != TokenKind::RParen {
            let param = self.analyse_func_param(ast, func)?;
            ast.func_add_param(func, param);
            if self.peek().kind == TokenKind::Comma {
                self.read();
            }
        }

        let token = self.read();
        if token.kind != TokenKind::RParen {
            return Err(AnalyseError::new(
                "expect ')' after function parameters",
                token,
            ));
        }

        let block = self.analyse_block_stmt(ast, func, ret_type, false, false)?;
        ast.func_set_body(func, block);

        Ok(func)
    }

    /// `[const] <type> <ident>` — unique within the parameter scope.
    fn analyse_func_param(&mut self, ast: &mut Ast, func: NodeId) -> AResult<NodeId> {
        let mut is_const = false;
        let mut token = self.read();
        if token.kind == TokenKind::KwConst {
            is_const = true;
            token = self.read();
        }

        let var_type = token_var_type(token.kind);
        if var_type == VarType::Nul {
            return Err(AnalyseError::new(
                "expect type-specifier in function parameter list",
                token,
            ));
        }

        let token = self.read();
        if token.kind != TokenKind::Ident {
            return Err(AnalyseError::new("expect variable name", token));
        }
        let name = token.string_value().to_string();
        if ast.symbol_kind(func, &name, false) != SymbolKind::Nul {
            return Err(AnalyseError::new("variable name repeated", token));
        }

        Ok(ast.add(
            Some(func),
            NodeKind::VarDecl {
                is_param: true,
                is_const,
                var_type,
                name,
                init: None,
            },
        ))
    }
}
