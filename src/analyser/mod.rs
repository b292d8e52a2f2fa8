//! Single-pass recursive-descent analyser: builds the typed AST straight
//! from the token stream, resolving names and checking types as it parses.
//!
//! Failure is a value: every production returns `Result<_, AnalyseError>`
//! and the first error unwinds the whole analysis — there is no recovery
//! and no second error. The only speculative parse is the `for` condition,
//! which saves the cursor, tries, and fabricates `1 != 0` on failure.

mod decl;
mod expr;
mod stmt;

use crate::ast::{is_castable, Ast, NodeId, NodeKind, VarType};
use crate::token::{Token, TokenKind};

/// An analysis failure: what went wrong, the token it went wrong at, and a
/// snapshot of that token's source line (filled in by `fix_source`).
#[derive(Clone, Debug)]
pub struct AnalyseError {
    message: String,
    token: Token,
    src: String,
}

impl AnalyseError {
    pub(crate) fn new(message: impl Into<String>, token: Token) -> Self {
        Self {
            message: message.into(),
            token,
            src: String::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn source_line(&self) -> &str {
        &self.src
    }

    /// Copy the offending line out of the tokenizer's line table.
    pub fn fix_source(&mut self, lines: &[String]) {
        let pos = self.token.range.start;
        if pos.row >= lines.len() {
            return;
        }
        let line = &lines[pos.row];
        if pos.col >= line.len() {
            return;
        }
        self.src = line.clone();
    }

    pub fn to_diagnostic(&self) -> crate::diagnostic::Diagnostic {
        crate::diagnostic::Diagnostic::error(self.message.clone(), self.token.range)
            .with_note(self.token.to_string())
    }
}

impl std::fmt::Display for AnalyseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error: {}. {}\n{}{}^",
            self.message,
            self.token,
            self.src,
            " ".repeat(self.token.range.start.col)
        )
    }
}

pub(crate) type AResult<T> = Result<T, AnalyseError>;

/// The analyser: a read cursor over the token vector.
pub struct Analyser {
    tokens: Vec<Token>,
    cur: usize,
}

impl Analyser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, cur: 0 }
    }

    /// Analyse the whole input. Always returns the arena — on error the
    /// tree under the root is partial and meaningless.
    pub fn analyse(mut self) -> (Ast, Option<AnalyseError>) {
        let mut ast = Ast::new();
        let root = ast.add(
            None,
            NodeKind::File {
                vars: Vec::new(),
                funcs: Vec::new(),
            },
        );
        let err = self.analyse_file(&mut ast, root).err();
        (ast, err)
    }

    // ─── Cursor ────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> Token {
        self.peek_at(0)
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Token {
        self.tokens.get(self.cur + offset).cloned().unwrap_or_default()
    }

    pub(crate) fn read(&mut self) -> Token {
        let token = self.peek();
        self.cur += 1;
        token
    }

    pub(crate) fn unread(&mut self, num: usize) {
        self.cur = self.cur.saturating_sub(num);
    }

    pub(crate) fn skip_semicolons(&mut self) {
        while self.peek().kind == TokenKind::Semicolon {
            self.read();
        }
    }

    // ─── File level ────────────────────────────────────────────────

    /// A file is variable declarations followed by function definitions.
    /// Variable mode ends at the first token shape that cannot start one:
    /// not `const`, and not a third token of `= ; ,`.
    fn analyse_file(&mut self, ast: &mut Ast, root: NodeId) -> AResult<()> {
        let mut can_parse_var_decl = true;
        loop {
            let token = self.peek();
            if token.is_nul() {
                break;
            }

            if can_parse_var_decl {
                let ahead = self.peek_at(2);
                if token.kind == TokenKind::KwConst
                    || matches!(
                        ahead.kind,
                        TokenKind::Assign | TokenKind::Semicolon | TokenKind::Comma
                    )
                {
                    let vars = self.analyse_var_decl(ast, root)?;
                    for var in vars {
                        ast.file_add_var(root, var);
                    }
                    continue;
                }
            }

            can_parse_var_decl = false;
            let func = self.analyse_func_decl(ast, root)?;
            ast.file_add_func(root, func);
        }
        Ok(())
    }

    // ─── Implicit casts ────────────────────────────────────────────

    /// Coerce `from` to `to`, inserting an implicit `CastExpr` when the
    /// types differ. Uncastable pairs fail with `extra` prefixed to the
    /// message.
    pub(crate) fn cast_implicit(
        &self,
        ast: &mut Ast,
        parent: NodeId,
        token: &Token,
        from: NodeId,
        to: VarType,
        extra: &str,
    ) -> AResult<NodeId> {
        let from_type = ast.var_type(from);
        if from_type == to {
            return Ok(from);
        }
        if !is_castable(from_type, to) {
            return Err(AnalyseError::new(
                format!("{extra}cannot inexplicit cast type from '{from_type}' to '{to}'"),
                token.clone(),
            ));
        }
        let cast = ast.add(
            Some(parent),
            NodeKind::CastExpr {
                target: to,
                is_explicit: false,
                expr: from,
            },
        );
        ast.set_parent(from, cast);
        Ok(cast)
    }
}
