//! Typed AST over an index-addressed arena.
//!
//! Nodes live in a flat `Vec`; parent and child edges are both `NodeId`
//! indices, so back-references cannot own anything and the tree cannot leak
//! through cycles. Node payloads are one tagged variant per kind; identifier
//! resolution and expression typing walk the parent chain on demand.

use std::any::Any;

use crate::token::TokenKind;

/// Value category of expressions and declarations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarType {
    Nul,
    Void,
    Int,
    Char,
    Float,
    Str,
}

impl std::fmt::Display for VarType {
    /// Spelled the way the type is written in source (`Float` is `double`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VarType::Nul => "Nul",
            VarType::Void => "void",
            VarType::Int => "int",
            VarType::Char => "char",
            VarType::Float => "double",
            VarType::Str => "string",
        };
        f.write_str(s)
    }
}

/// Map a type-specifier token to its variable type.
pub fn token_var_type(kind: TokenKind) -> VarType {
    match kind {
        TokenKind::KwVoid => VarType::Void,
        TokenKind::KwInt => VarType::Int,
        TokenKind::KwChar => VarType::Char,
        TokenKind::KwDouble => VarType::Float,
        _ => VarType::Nul,
    }
}

/// Common type of two binary operands: `Float` absorbs, `Void` only matches
/// itself, every other numeric pairing lands on `Int`.
pub fn merge_var_type(a: VarType, b: VarType) -> VarType {
    if a == VarType::Float || b == VarType::Float {
        return VarType::Float;
    }
    if a == VarType::Void || b == VarType::Void {
        return if a == b { VarType::Void } else { VarType::Nul };
    }
    VarType::Int
}

/// Types a cast may target (and a `switch` controller may have).
pub fn is_valid_cast_type(t: VarType) -> bool {
    matches!(t, VarType::Int | VarType::Char | VarType::Float)
}

/// Casts convert freely between the three numeric types, nothing else.
pub fn is_castable(from: VarType, to: VarType) -> bool {
    is_valid_cast_type(from) && is_valid_cast_type(to)
}

/// What a name resolves to in scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Nul,
    Var,
    ConstVar,
    Func,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    LessEqual,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }

    /// Relational operators, i.e. the ones a condition is built from.
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Positive,
    Negative,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Positive => "+",
            UnaryOp::Negative => "-",
        }
    }
}

/// Node kind tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AstType {
    BinaryExpr,
    CastExpr,
    UnaryExpr,
    BraceExpr,
    IdentExpr,
    IntExpr,
    CharExpr,
    FloatExpr,
    StrExpr,
    AssignExpr,
    FuncCallExpr,
    EmptyStmt,
    BlockStmt,
    PrintStmt,
    ScanStmt,
    AssignStmt,
    FuncCallStmt,
    IfStmt,
    SwitchStmt,
    LabeledStmt,
    WhileStmt,
    DoStmt,
    ForStmt,
    BreakStmt,
    ContinueStmt,
    ReturnStmt,
    VarDecl,
    FuncDecl,
    File,
}

impl AstType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AstType::BinaryExpr => "BinaryExpr",
            AstType::CastExpr => "CastExpr",
            AstType::UnaryExpr => "UnaryExpr",
            AstType::BraceExpr => "BraceExpr",
            AstType::IdentExpr => "IdentExpr",
            AstType::IntExpr => "IntExpr",
            AstType::CharExpr => "CharExpr",
            AstType::FloatExpr => "FloatExpr",
            AstType::StrExpr => "StrExpr",
            AstType::AssignExpr => "AssignExpr",
            AstType::FuncCallExpr => "FuncCallExpr",
            AstType::EmptyStmt => "EmptyStmt",
            AstType::BlockStmt => "BlockStmt",
            AstType::PrintStmt => "PrintStmt",
            AstType::ScanStmt => "ScanStmt",
            AstType::AssignStmt => "AssignStmt",
            AstType::FuncCallStmt => "FuncCallStmt",
            AstType::IfStmt => "IfStmt",
            AstType::SwitchStmt => "SwitchStmt",
            AstType::LabeledStmt => "LabeledStmt",
            AstType::WhileStmt => "WhileStmt",
            AstType::DoStmt => "DoStmt",
            AstType::ForStmt => "ForStmt",
            AstType::BreakStmt => "BreakStmt",
            AstType::ContinueStmt => "ContinueStmt",
            AstType::ReturnStmt => "ReturnStmt",
            AstType::VarDecl => "VarDecl",
            AstType::FuncDecl => "FuncDecl",
            AstType::File => "File",
        }
    }
}

/// Index of a node in its `Ast` arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-kind payload. Child edges are `NodeId`s into the owning arena.
#[derive(Debug)]
pub enum NodeKind {
    BinaryExpr {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    CastExpr {
        target: VarType,
        is_explicit: bool,
        expr: NodeId,
    },
    UnaryExpr {
        op: UnaryOp,
        expr: NodeId,
    },
    BraceExpr {
        expr: NodeId,
    },
    IdentExpr {
        name: String,
    },
    IntExpr {
        value: i32,
    },
    CharExpr {
        value: u8,
    },
    FloatExpr {
        value: f64,
    },
    StrExpr {
        value: String,
    },
    AssignExpr {
        name: String,
        expr: NodeId,
    },
    FuncCallExpr {
        name: String,
        args: Vec<NodeId>,
    },
    EmptyStmt,
    BlockStmt {
        vars: Vec<NodeId>,
        stmts: Vec<NodeId>,
    },
    PrintStmt {
        args: Vec<NodeId>,
    },
    ScanStmt {
        name: String,
    },
    AssignStmt {
        name: String,
        expr: NodeId,
    },
    FuncCallStmt {
        name: String,
        args: Vec<NodeId>,
    },
    IfStmt {
        cond: NodeId,
        then_stmt: NodeId,
        else_stmt: Option<NodeId>,
    },
    SwitchStmt {
        cond: NodeId,
        cases: Vec<NodeId>,
    },
    LabeledStmt {
        label: i32,
        stmt: NodeId,
    },
    WhileStmt {
        cond: NodeId,
        body: NodeId,
    },
    DoStmt {
        body: NodeId,
        cond: NodeId,
    },
    ForStmt {
        inits: Vec<NodeId>,
        cond: Option<NodeId>,
        updates: Vec<NodeId>,
        body: Option<NodeId>,
    },
    BreakStmt,
    ContinueStmt,
    ReturnStmt {
        expr: Option<NodeId>,
    },
    VarDecl {
        is_param: bool,
        is_const: bool,
        var_type: VarType,
        name: String,
        init: Option<NodeId>,
    },
    FuncDecl {
        ret_type: VarType,
        name: String,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    File {
        vars: Vec<NodeId>,
        funcs: Vec<NodeId>,
    },
}

impl NodeKind {
    pub fn ast_type(&self) -> AstType {
        match self {
            NodeKind::BinaryExpr { .. } => AstType::BinaryExpr,
            NodeKind::CastExpr { .. } => AstType::CastExpr,
            NodeKind::UnaryExpr { .. } => AstType::UnaryExpr,
            NodeKind::BraceExpr { .. } => AstType::BraceExpr,
            NodeKind::IdentExpr { .. } => AstType::IdentExpr,
            NodeKind::IntExpr { .. } => AstType::IntExpr,
            NodeKind::CharExpr { .. } => AstType::CharExpr,
            NodeKind::FloatExpr { .. } => AstType::FloatExpr,
            NodeKind::StrExpr { .. } => AstType::StrExpr,
            NodeKind::AssignExpr { .. } => AstType::AssignExpr,
            NodeKind::FuncCallExpr { .. } => AstType::FuncCallExpr,
            NodeKind::EmptyStmt => AstType::EmptyStmt,
            NodeKind::BlockStmt { .. } => AstType::BlockStmt,
            NodeKind::PrintStmt { .. } => AstType::PrintStmt,
            NodeKind::ScanStmt { .. } => AstType::ScanStmt,
            NodeKind::AssignStmt { .. } => AstType::AssignStmt,
            NodeKind::FuncCallStmt { .. } => AstType::FuncCallStmt,
            NodeKind::IfStmt { .. } => AstType::IfStmt,
            NodeKind::SwitchStmt { .. } => AstType::SwitchStmt,
            NodeKind::LabeledStmt { .. } => AstType::LabeledStmt,
            NodeKind::WhileStmt { .. } => AstType::WhileStmt,
            NodeKind::DoStmt { .. } => AstType::DoStmt,
            NodeKind::ForStmt { .. } => AstType::ForStmt,
            NodeKind::BreakStmt => AstType::BreakStmt,
            NodeKind::ContinueStmt => AstType::ContinueStmt,
            NodeKind::ReturnStmt { .. } => AstType::ReturnStmt,
            NodeKind::VarDecl { .. } => AstType::VarDecl,
            NodeKind::FuncDecl { .. } => AstType::FuncDecl,
            NodeKind::File { .. } => AstType::File,
        }
    }
}

struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    user_data: Option<Box<dyn Any>>,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("user_data", &self.user_data.as_ref().map(|_| "..."))
            .finish()
    }
}

/// The arena. The `File` root is always the first node added.
#[derive(Default, Debug)]
pub struct Ast {
    nodes: Vec<Node>,
}

/// Two-hook traversal callback. `beg_visit` returning `false` skips the
/// node's children; `end_visit` returning `false` stops the remaining
/// siblings in the list being walked.
pub trait AstVisitor {
    fn beg_visit(&mut self, ast: &Ast, id: NodeId) -> bool;
    fn end_visit(&mut self, ast: &Ast, id: NodeId) -> bool;
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent,
            user_data: None,
        });
        id
    }

    /// The `File` node.
    pub fn root(&self) -> NodeId {
        debug_assert!(matches!(self.nodes.first().map(|n| &n.kind), Some(NodeKind::File { .. })));
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn ast_type(&self, id: NodeId) -> AstType {
        self.kind(id).ast_type()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        self.nodes[id.index()].parent = Some(parent);
    }

    /// Opaque per-node slot reserved for downstream passes.
    pub fn user_data(&self, id: NodeId) -> Option<&dyn Any> {
        self.nodes[id.index()].user_data.as_deref()
    }

    pub fn set_user_data(&mut self, id: NodeId, data: Box<dyn Any>) {
        self.nodes[id.index()].user_data = Some(data);
    }

    // ─── Symbol resolution ─────────────────────────────────────────

    /// What `name` means at `id`. Scope-bearing nodes consult their own
    /// bindings; everything else defers to the parent when `recursive`.
    pub fn symbol_kind(&self, id: NodeId, name: &str, recursive: bool) -> SymbolKind {
        match self.kind(id) {
            NodeKind::File { vars, funcs } => {
                for &var in vars {
                    let t = self.symbol_kind(var, name, false);
                    if t != SymbolKind::Nul {
                        return t;
                    }
                }
                for &func in funcs {
                    if self.decl_name(func) == Some(name) {
                        return SymbolKind::Func;
                    }
                }
                self.parent_symbol_kind(id, name, recursive)
            }
            // A declaration's own initialiser does not see the name being
            // declared, so the self-match only answers membership queries.
            NodeKind::VarDecl {
                name: n, is_const, ..
            } if n == name && !recursive => {
                if *is_const {
                    SymbolKind::ConstVar
                } else {
                    SymbolKind::Var
                }
            }
            NodeKind::FuncDecl {
                name: n, params, ..
            } => {
                if n == name {
                    return SymbolKind::Func;
                }
                for &param in params {
                    let t = self.symbol_kind(param, name, false);
                    if t != SymbolKind::Nul {
                        return t;
                    }
                }
                self.parent_symbol_kind(id, name, recursive)
            }
            NodeKind::BlockStmt { vars, .. } => {
                for &var in vars {
                    let t = self.symbol_kind(var, name, false);
                    if t != SymbolKind::Nul {
                        return t;
                    }
                }
                self.parent_symbol_kind(id, name, recursive)
            }
            _ => self.parent_symbol_kind(id, name, recursive),
        }
    }

    /// The declaration `name` resolves to at `id`, if any.
    pub fn symbol(&self, id: NodeId, name: &str, recursive: bool) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::File { vars, funcs } => {
                for &var in vars {
                    if let Some(d) = self.symbol(var, name, false) {
                        return Some(d);
                    }
                }
                for &func in funcs {
                    if self.decl_name(func) == Some(name) {
                        return Some(func);
                    }
                }
                self.parent_symbol(id, name, recursive)
            }
            NodeKind::VarDecl { name: n, .. } if n == name && !recursive => Some(id),
            NodeKind::FuncDecl {
                name: n, params, ..
            } => {
                if n == name {
                    return Some(id);
                }
                for &param in params {
                    if let Some(d) = self.symbol(param, name, false) {
                        return Some(d);
                    }
                }
                self.parent_symbol(id, name, recursive)
            }
            NodeKind::BlockStmt { vars, .. } => {
                for &var in vars {
                    if let Some(d) = self.symbol(var, name, false) {
                        return Some(d);
                    }
                }
                self.parent_symbol(id, name, recursive)
            }
            _ => self.parent_symbol(id, name, recursive),
        }
    }

    fn parent_symbol_kind(&self, id: NodeId, name: &str, recursive: bool) -> SymbolKind {
        if recursive {
            if let Some(parent) = self.parent(id) {
                return self.symbol_kind(parent, name, true);
            }
        }
        SymbolKind::Nul
    }

    fn parent_symbol(&self, id: NodeId, name: &str, recursive: bool) -> Option<NodeId> {
        if recursive {
            if let Some(parent) = self.parent(id) {
                return self.symbol(parent, name, true);
            }
        }
        None
    }

    fn decl_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::VarDecl { name, .. } | NodeKind::FuncDecl { name, .. } => {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    // ─── Expression typing and const folding ───────────────────────

    /// Computed type of an expression or declaration node. Identifier-shaped
    /// nodes resolve through the scope chain; `Nul` means unresolvable.
    pub fn var_type(&self, id: NodeId) -> VarType {
        match self.kind(id) {
            NodeKind::BinaryExpr { left, right, .. } => {
                merge_var_type(self.var_type(*left), self.var_type(*right))
            }
            NodeKind::CastExpr { target, .. } => *target,
            NodeKind::UnaryExpr { expr, .. } | NodeKind::BraceExpr { expr } => {
                self.var_type(*expr)
            }
            NodeKind::IdentExpr { name }
            | NodeKind::AssignExpr { name, .. }
            | NodeKind::FuncCallExpr { name, .. } => match self.symbol(id, name, true) {
                Some(decl) => self.var_type(decl),
                None => VarType::Nul,
            },
            NodeKind::IntExpr { .. } => VarType::Int,
            NodeKind::CharExpr { .. } => VarType::Char,
            NodeKind::FloatExpr { .. } => VarType::Float,
            NodeKind::StrExpr { .. } => VarType::Str,
            NodeKind::VarDecl { var_type, .. } => *var_type,
            NodeKind::FuncDecl { ret_type, .. } => *ret_type,
            _ => VarType::Nul,
        }
    }

    /// Literals and sign-wrapped literals fold at analysis time.
    pub fn is_const_expr(&self, id: NodeId) -> bool {
        match self.kind(id) {
            NodeKind::IntExpr { .. } | NodeKind::CharExpr { .. } | NodeKind::FloatExpr { .. } => {
                true
            }
            NodeKind::UnaryExpr { expr, .. } => self.is_const_expr(*expr),
            _ => false,
        }
    }

    pub fn const_int(&self, id: NodeId) -> i32 {
        match self.kind(id) {
            NodeKind::IntExpr { value } => *value,
            NodeKind::UnaryExpr { op, expr } => {
                let v = self.const_int(*expr);
                if *op == UnaryOp::Negative {
                    v.wrapping_neg()
                } else {
                    v
                }
            }
            _ => 0,
        }
    }

    pub fn const_char(&self, id: NodeId) -> u8 {
        match self.kind(id) {
            NodeKind::CharExpr { value } => *value,
            NodeKind::UnaryExpr { op, expr } => {
                let v = self.const_char(*expr);
                if *op == UnaryOp::Negative {
                    v.wrapping_neg()
                } else {
                    v
                }
            }
            _ => 0,
        }
    }

    pub fn const_float(&self, id: NodeId) -> f64 {
        match self.kind(id) {
            NodeKind::FloatExpr { value } => *value,
            NodeKind::UnaryExpr { op, expr } => {
                let v = self.const_float(*expr);
                if *op == UnaryOp::Negative {
                    -v
                } else {
                    v
                }
            }
            _ => 0.0,
        }
    }

    // ─── Traversal ─────────────────────────────────────────────────

    /// Walk the subtree at `id` depth-first in source order.
    pub fn accept(&self, id: NodeId, visitor: &mut dyn AstVisitor) -> bool {
        match self.kind(id) {
            NodeKind::File { vars, funcs } => {
                if visitor.beg_visit(self, id) {
                    self.accept_list(vars, visitor);
                    self.accept_list(funcs, visitor);
                }
                visitor.end_visit(self, id)
            }
            NodeKind::BinaryExpr { left, right, .. } => {
                if visitor.beg_visit(self, id) {
                    self.accept(*left, visitor);
                    self.accept(*right, visitor);
                }
                visitor.end_visit(self, id)
            }
            NodeKind::CastExpr { expr, .. }
            | NodeKind::UnaryExpr { expr, .. }
            | NodeKind::BraceExpr { expr }
            | NodeKind::AssignExpr { expr, .. }
            | NodeKind::AssignStmt { expr, .. } => {
                if visitor.beg_visit(self, id) {
                    self.accept(*expr, visitor);
                }
                visitor.end_visit(self, id)
            }
            NodeKind::FuncCallExpr { args, .. }
            | NodeKind::FuncCallStmt { args, .. }
            | NodeKind::PrintStmt { args } => {
                if visitor.beg_visit(self, id) {
                    self.accept_list(args, visitor);
                }
                visitor.end_visit(self, id)
            }
            NodeKind::IdentExpr { .. }
            | NodeKind::IntExpr { .. }
            | NodeKind::CharExpr { .. }
            | NodeKind::FloatExpr { .. }
            | NodeKind::StrExpr { .. }
            | NodeKind::EmptyStmt
            | NodeKind::ScanStmt { .. }
            | NodeKind::BreakStmt
            | NodeKind::ContinueStmt => {
                visitor.beg_visit(self, id);
                visitor.end_visit(self, id)
            }
            NodeKind::BlockStmt { vars, stmts } => {
                if visitor.beg_visit(self, id) {
                    self.accept_list(vars, visitor);
                    self.accept_list(stmts, visitor);
                }
                visitor.end_visit(self, id)
            }
            NodeKind::IfStmt {
                cond,
                then_stmt,
                else_stmt,
            } => {
                if visitor.beg_visit(self, id) {
                    self.accept(*cond, visitor);
                    self.accept(*then_stmt, visitor);
                    if let Some(else_stmt) = else_stmt {
                        self.accept(*else_stmt, visitor);
                    }
                }
                visitor.end_visit(self, id)
            }
            NodeKind::SwitchStmt { cond, cases } => {
                if visitor.beg_visit(self, id) {
                    self.accept(*cond, visitor);
                    self.accept_list(cases, visitor);
                }
                visitor.end_visit(self, id)
            }
            NodeKind::LabeledStmt { stmt, .. } => {
                if visitor.beg_visit(self, id) {
                    self.accept(*stmt, visitor);
                }
                visitor.end_visit(self, id)
            }
            NodeKind::WhileStmt { cond, body } => {
                if visitor.beg_visit(self, id) {
                    self.accept(*cond, visitor);
                    self.accept(*body, visitor);
                }
                visitor.end_visit(self, id)
            }
            NodeKind::DoStmt { body, cond } => {
                if visitor.beg_visit(self, id) {
                    self.accept(*body, visitor);
                    self.accept(*cond, visitor);
                }
                visitor.end_visit(self, id)
            }
            NodeKind::ForStmt {
                inits,
                cond,
                updates,
                body,
            } => {
                if visitor.beg_visit(self, id) {
                    self.accept_list(inits, visitor);
                    if let Some(cond) = cond {
                        self.accept(*cond, visitor);
                    }
                    self.accept_list(updates, visitor);
                    if let Some(body) = body {
                        self.accept(*body, visitor);
                    }
                }
                visitor.end_visit(self, id)
            }
            NodeKind::ReturnStmt { expr } => {
                if visitor.beg_visit(self, id) {
                    if let Some(expr) = expr {
                        self.accept(*expr, visitor);
                    }
                }
                visitor.end_visit(self, id)
            }
            NodeKind::VarDecl { init, .. } => {
                if visitor.beg_visit(self, id) {
                    if let Some(init) = init {
                        self.accept(*init, visitor);
                    }
                }
                visitor.end_visit(self, id)
            }
            NodeKind::FuncDecl { params, body, .. } => {
                if visitor.beg_visit(self, id) {
                    self.accept_list(params, visitor);
                    if let Some(body) = body {
                        self.accept(*body, visitor);
                    }
                }
                visitor.end_visit(self, id)
            }
        }
    }

    fn accept_list(&self, ids: &[NodeId], visitor: &mut dyn AstVisitor) {
        for &child in ids {
            if !self.accept(child, visitor) {
                break;
            }
        }
    }

    // ─── Construction helpers for the analyser ─────────────────────

    pub(crate) fn file_add_var(&mut self, file: NodeId, var: NodeId) {
        match &mut self.nodes[file.index()].kind {
            NodeKind::File { vars, .. } => vars.push(var),
            _ => unreachable!("file_add_var on a non-File node"),
        }
    }

    pub(crate) fn file_add_func(&mut self, file: NodeId, func: NodeId) {
        match &mut self.nodes[file.index()].kind {
            NodeKind::File { funcs, .. } => funcs.push(func),
            _ => unreachable!("file_add_func on a non-File node"),
        }
    }

    pub(crate) fn func_add_param(&mut self, func: NodeId, param: NodeId) {
        match &mut self.nodes[func.index()].kind {
            NodeKind::FuncDecl { params, .. } => params.push(param),
            _ => unreachable!("func_add_param on a non-FuncDecl node"),
        }
    }

    pub(crate) fn func_set_body(&mut self, func: NodeId, block: NodeId) {
        match &mut self.nodes[func.index()].kind {
            NodeKind::FuncDecl { body, .. } => *body = Some(block),
            _ => unreachable!("func_set_body on a non-FuncDecl node"),
        }
    }

    pub(crate) fn var_set_init(&mut self, var: NodeId, expr: NodeId) {
        match &mut self.nodes[var.index()].kind {
            NodeKind::VarDecl { init, .. } => *init = Some(expr),
            _ => unreachable!("var_set_init on a non-VarDecl node"),
        }
    }

    pub(crate) fn block_add_var(&mut self, block: NodeId, var: NodeId) {
        match &mut self.nodes[block.index()].kind {
            NodeKind::BlockStmt { vars, .. } => vars.push(var),
            _ => unreachable!("block_add_var on a non-BlockStmt node"),
        }
    }

    pub(crate) fn block_add_stmt(&mut self, block: NodeId, stmt: NodeId) {
        match &mut self.nodes[block.index()].kind {
            NodeKind::BlockStmt { stmts, .. } => stmts.push(stmt),
            _ => unreachable!("block_add_stmt on a non-BlockStmt node"),
        }
    }

    pub(crate) fn if_set_else(&mut self, if_stmt: NodeId, stmt: NodeId) {
        match &mut self.nodes[if_stmt.index()].kind {
            NodeKind::IfStmt { else_stmt, .. } => *else_stmt = Some(stmt),
            _ => unreachable!("if_set_else on a non-IfStmt node"),
        }
    }

    pub(crate) fn switch_add_case(&mut self, switch: NodeId, stmt: NodeId) {
        match &mut self.nodes[switch.index()].kind {
            NodeKind::SwitchStmt { cases, .. } => cases.push(stmt),
            _ => unreachable!("switch_add_case on a non-SwitchStmt node"),
        }
    }

    pub(crate) fn for_add_init(&mut self, for_stmt: NodeId, expr: NodeId) {
        match &mut self.nodes[for_stmt.index()].kind {
            NodeKind::ForStmt { inits, .. } => inits.push(expr),
            _ => unreachable!("for_add_init on a non-ForStmt node"),
        }
    }

    pub(crate) fn for_set_cond(&mut self, for_stmt: NodeId, expr: NodeId) {
        match &mut self.nodes[for_stmt.index()].kind {
            NodeKind::ForStmt { cond, .. } => *cond = Some(expr),
            _ => unreachable!("for_set_cond on a non-ForStmt node"),
        }
    }

    pub(crate) fn for_add_update(&mut self, for_stmt: NodeId, expr: NodeId) {
        match &mut self.nodes[for_stmt.index()].kind {
            NodeKind::ForStmt { updates, .. } => updates.push(expr),
            _ => unreachable!("for_add_update on a non-ForStmt node"),
        }
    }

    pub(crate) fn for_set_body(&mut self, for_stmt: NodeId, stmt: NodeId) {
        match &mut self.nodes[for_stmt.index()].kind {
            NodeKind::ForStmt { body, .. } => *body = Some(stmt),
            _ => unreachable!("for_set_body on a non-ForStmt node"),
        }
    }

    pub(crate) fn call_add_arg(&mut self, call: NodeId, arg: NodeId) {
        match &mut self.nodes[call.index()].kind {
            NodeKind::FuncCallExpr { args, .. } | NodeKind::FuncCallStmt { args, .. } => {
                args.push(arg)
            }
            _ => unreachable!("call_add_arg on a non-call node"),
        }
    }

    pub(crate) fn print_add_arg(&mut self, print: NodeId, arg: NodeId) {
        match &mut self.nodes[print.index()].kind {
            NodeKind::PrintStmt { args } => args.push(arg),
            _ => unreachable!("print_add_arg on a non-PrintStmt node"),
        }
    }

    pub(crate) fn return_set_expr(&mut self, ret: NodeId, expr: NodeId) {
        match &mut self.nodes[ret.index()].kind {
            NodeKind::ReturnStmt { expr: slot } => *slot = Some(expr),
            _ => unreachable!("return_set_expr on a non-ReturnStmt node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_table() {
        use VarType::*;
        assert_eq!(merge_var_type(Float, Int), Float);
        assert_eq!(merge_var_type(Char, Float), Float);
        assert_eq!(merge_var_type(Float, Float), Float);
        assert_eq!(merge_var_type(Void, Void), Void);
        assert_eq!(merge_var_type(Void, Int), Nul);
        assert_eq!(merge_var_type(Str, Void), Nul);
        assert_eq!(merge_var_type(Int, Int), Int);
        assert_eq!(merge_var_type(Char, Char), Int);
        assert_eq!(merge_var_type(Int, Char), Int);
        assert_eq!(merge_var_type(Str, Str), Int);
    }

    #[test]
    fn test_castability() {
        use VarType::*;
        for from in [Int, Char, Float] {
            for to in [Int, Char, Float] {
                assert!(is_castable(from, to));
            }
        }
        assert!(!is_castable(Void, Int));
        assert!(!is_castable(Str, Int));
        assert!(!is_castable(Int, Str));
        assert!(!is_valid_cast_type(Void));
        assert!(!is_valid_cast_type(Str));
    }

    #[test]
    fn test_token_var_type() {
        assert_eq!(token_var_type(TokenKind::KwVoid), VarType::Void);
        assert_eq!(token_var_type(TokenKind::KwInt), VarType::Int);
        assert_eq!(token_var_type(TokenKind::KwChar), VarType::Char);
        assert_eq!(token_var_type(TokenKind::KwDouble), VarType::Float);
        assert_eq!(token_var_type(TokenKind::Ident), VarType::Nul);
    }

    #[test]
    fn test_var_type_display() {
        assert_eq!(VarType::Float.to_string(), "double");
        assert_eq!(VarType::Str.to_string(), "string");
        assert_eq!(VarType::Nul.to_string(), "Nul");
    }

    fn small_scope_ast() -> (Ast, NodeId, NodeId) {
        // file { int a; const int b; int f(int p) {} }
        let mut ast = Ast::new();
        let file = ast.add(None, NodeKind::File { vars: vec![], funcs: vec![] });
        let a = ast.add(
            Some(file),
            NodeKind::VarDecl {
                is_param: false,
                is_const: false,
                var_type: VarType::Int,
                name: "a".into(),
                init: None,
            },
        );
        let b = ast.add(
            Some(file),
            NodeKind::VarDecl {
                is_param: false,
                is_const: true,
                var_type: VarType::Int,
                name: "b".into(),
                init: None,
            },
        );
        ast.file_add_var(file, a);
        ast.file_add_var(file, b);
        let f = ast.add(
            Some(file),
            NodeKind::FuncDecl {
                ret_type: VarType::Int,
                name: "f".into(),
                params: vec![],
                body: None,
            },
        );
        let p = ast.add(
            Some(f),
            NodeKind::VarDecl {
                is_param: true,
                is_const: false,
                var_type: VarType::Float,
                name: "p".into(),
                init: None,
            },
        );
        ast.func_add_param(f, p);
        ast.file_add_func(file, f);
        (ast, file, f)
    }

    #[test]
    fn test_symbol_kinds_in_scope() {
        let (ast, file, func) = small_scope_ast();
        assert_eq!(ast.symbol_kind(file, "a", false), SymbolKind::Var);
        assert_eq!(ast.symbol_kind(file, "b", false), SymbolKind::ConstVar);
        assert_eq!(ast.symbol_kind(file, "f", false), SymbolKind::Func);
        assert_eq!(ast.symbol_kind(file, "zz", true), SymbolKind::Nul);
        // from inside the function: param, own name, then file scope
        assert_eq!(ast.symbol_kind(func, "p", false), SymbolKind::Var);
        assert_eq!(ast.symbol_kind(func, "f", false), SymbolKind::Func);
        assert_eq!(ast.symbol_kind(func, "a", true), SymbolKind::Var);
        assert_eq!(ast.symbol_kind(func, "a", false), SymbolKind::Nul);
    }

    #[test]
    fn test_block_shadows_outer_binding() {
        let (mut ast, _file, func) = small_scope_ast();
        let block = ast.add(Some(func), NodeKind::BlockStmt { vars: vec![], stmts: vec![] });
        ast.func_set_body(func, block);
        let inner = ast.add(
            Some(block),
            NodeKind::VarDecl {
                is_param: false,
                is_const: true,
                var_type: VarType::Char,
                name: "a".into(),
                init: None,
            },
        );
        ast.block_add_var(block, inner);
        // the inner binding wins over the file-level `int a`
        assert_eq!(ast.symbol_kind(block, "a", true), SymbolKind::ConstVar);
        assert_eq!(ast.symbol(block, "a", true), Some(inner));
        assert_eq!(ast.var_type(ast.symbol(block, "a", true).unwrap()), VarType::Char);
    }

    #[test]
    fn test_ident_expr_types_through_scope() {
        let (mut ast, _file, func) = small_scope_ast();
        let block = ast.add(Some(func), NodeKind::BlockStmt { vars: vec![], stmts: vec![] });
        ast.func_set_body(func, block);
        let ident = ast.add(Some(block), NodeKind::IdentExpr { name: "p".into() });
        assert_eq!(ast.var_type(ident), VarType::Float);
        let unknown = ast.add(Some(block), NodeKind::IdentExpr { name: "nope".into() });
        assert_eq!(ast.var_type(unknown), VarType::Nul);
    }

    #[test]
    fn test_binary_type_is_merge_of_operands() {
        let mut ast = Ast::new();
        let file = ast.add(None, NodeKind::File { vars: vec![], funcs: vec![] });
        let l = ast.add(Some(file), NodeKind::IntExpr { value: 1 });
        let r = ast.add(Some(file), NodeKind::FloatExpr { value: 2.0 });
        let bin = ast.add(
            Some(file),
            NodeKind::BinaryExpr {
                op: BinaryOp::Add,
                left: l,
                right: r,
            },
        );
        ast.set_parent(l, bin);
        ast.set_parent(r, bin);
        assert_eq!(ast.var_type(bin), VarType::Float);
    }

    #[test]
    fn test_cast_type_is_target() {
        let mut ast = Ast::new();
        let file = ast.add(None, NodeKind::File { vars: vec![], funcs: vec![] });
        let inner = ast.add(Some(file), NodeKind::FloatExpr { value: 2.0 });
        let cast = ast.add(
            Some(file),
            NodeKind::CastExpr {
                target: VarType::Int,
                is_explicit: false,
                expr: inner,
            },
        );
        ast.set_parent(inner, cast);
        assert_eq!(ast.var_type(cast), VarType::Int);
    }

    #[test]
    fn test_const_folding() {
        let mut ast = Ast::new();
        let file = ast.add(None, NodeKind::File { vars: vec![], funcs: vec![] });
        let i = ast.add(Some(file), NodeKind::IntExpr { value: 7 });
        let neg = ast.add(
            Some(file),
            NodeKind::UnaryExpr {
                op: UnaryOp::Negative,
                expr: i,
            },
        );
        ast.set_parent(i, neg);
        assert!(ast.is_const_expr(neg));
        assert_eq!(ast.const_int(neg), -7);

        let c = ast.add(Some(file), NodeKind::CharExpr { value: b'a' });
        assert!(ast.is_const_expr(c));
        assert_eq!(ast.const_char(c), b'a');

        let f = ast.add(Some(file), NodeKind::FloatExpr { value: 1.5 });
        let negf = ast.add(
            Some(file),
            NodeKind::UnaryExpr {
                op: UnaryOp::Positive,
                expr: f,
            },
        );
        ast.set_parent(f, negf);
        assert_eq!(ast.const_float(negf), 1.5);

        let ident = ast.add(Some(file), NodeKind::IdentExpr { name: "x".into() });
        assert!(!ast.is_const_expr(ident));
    }

    #[test]
    fn test_user_data_slot() {
        let mut ast = Ast::new();
        let file = ast.add(None, NodeKind::File { vars: vec![], funcs: vec![] });
        assert!(ast.user_data(file).is_none());
        ast.set_user_data(file, Box::new(42u32));
        let got = ast.user_data(file).and_then(|d| d.downcast_ref::<u32>());
        assert_eq!(got, Some(&42));
    }

    struct CountingVisitor {
        begs: usize,
        ends: usize,
        skip_children_of: Option<AstType>,
    }

    impl AstVisitor for CountingVisitor {
        fn beg_visit(&mut self, ast: &Ast, id: NodeId) -> bool {
            self.begs += 1;
            Some(ast.ast_type(id)) != self.skip_children_of
        }
        fn end_visit(&mut self, _ast: &Ast, _id: NodeId) -> bool {
            self.ends += 1;
            true
        }
    }

    #[test]
    fn test_visitor_sees_every_node_once() {
        let (ast, file, _func) = small_scope_ast();
        let mut v = CountingVisitor {
            begs: 0,
            ends: 0,
            skip_children_of: None,
        };
        ast.accept(file, &mut v);
        // file, two vars, func, one param
        assert_eq!(v.begs, 5);
        assert_eq!(v.ends, 5);
    }

    #[test]
    fn test_beg_visit_false_skips_children() {
        let (ast, file, _func) = small_scope_ast();
        let mut v = CountingVisitor {
            begs: 0,
            ends: 0,
            skip_children_of: Some(AstType::FuncDecl),
        };
        ast.accept(file, &mut v);
        // the param under the function is not visited
        assert_eq!(v.begs, 4);
        assert_eq!(v.ends, 4);
    }
}
