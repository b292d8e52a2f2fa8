//! Source renderer and tree dump over the analysed AST.
//!
//! `to_source` prints a tree back to compilable C0 text. Implicit casts
//! render as their operand, so re-analysing the output reconstructs them at
//! the same positions; explicit casts keep their `(type)` spelling. The
//! `DumpVisitor` prints one line per node and doubles as the reference use
//! of the two-hook visitor.

use crate::ast::{Ast, AstVisitor, NodeId, NodeKind};
use crate::token::{format_char_literal, format_float_literal, format_str_literal};

impl Ast {
    /// Render the subtree at `id` as C0 source text.
    pub fn to_source(&self, id: NodeId) -> String {
        let mut out = String::new();
        match self.kind(id) {
            NodeKind::File { vars, funcs } => {
                for &var in vars {
                    out.push_str(&self.render_var_decl(var));
                    out.push_str(";\n");
                }
                if !vars.is_empty() {
                    out.push('\n');
                }
                for &func in funcs {
                    self.render_func_decl(func, &mut out);
                    out.push('\n');
                }
            }
            NodeKind::VarDecl { .. } => out.push_str(&self.render_var_decl(id)),
            NodeKind::FuncDecl { .. } => self.render_func_decl(id, &mut out),
            NodeKind::BinaryExpr { .. }
            | NodeKind::CastExpr { .. }
            | NodeKind::UnaryExpr { .. }
            | NodeKind::BraceExpr { .. }
            | NodeKind::IdentExpr { .. }
            | NodeKind::IntExpr { .. }
            | NodeKind::CharExpr { .. }
            | NodeKind::FloatExpr { .. }
            | NodeKind::StrExpr { .. }
            | NodeKind::AssignExpr { .. }
            | NodeKind::FuncCallExpr { .. } => out.push_str(&self.render_expr(id)),
            _ => self.render_stmt(id, 0, &mut out),
        }
        out
    }

    fn render_expr(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::BinaryExpr { op, left, right } => format!(
                "{} {} {}",
                self.render_expr(*left),
                op.as_str(),
                self.render_expr(*right)
            ),
            NodeKind::CastExpr {
                target,
                is_explicit,
                expr,
            } => {
                if *is_explicit {
                    format!("({}){}", target, self.render_expr(*expr))
                } else {
                    self.render_expr(*expr)
                }
            }
            NodeKind::UnaryExpr { op, expr } => {
                format!("{}{}", op.as_str(), self.render_expr(*expr))
            }
            NodeKind::BraceExpr { expr } => format!("({})", self.render_expr(*expr)),
            NodeKind::IdentExpr { name } => name.clone(),
            NodeKind::IntExpr { value } => value.to_string(),
            NodeKind::CharExpr { value } => format_char_literal(*value),
            NodeKind::FloatExpr { value } => format_float_literal(*value),
            NodeKind::StrExpr { value } => format_str_literal(value),
            NodeKind::AssignExpr { name, expr } => {
                format!("{} = {}", name, self.render_expr(*expr))
            }
            NodeKind::FuncCallExpr { name, args } => self.render_call(name, args),
            _ => String::new(),
        }
    }

    fn render_call(&self, name: &str, args: &[NodeId]) -> String {
        let rendered: Vec<String> = args.iter().map(|&a| self.render_expr(a)).collect();
        format!("{}({})", name, rendered.join(", "))
    }

    fn render_var_decl(&self, id: NodeId) -> String {
        let NodeKind::VarDecl {
            is_const,
            var_type,
            name,
            init,
            ..
        } = self.kind(id)
        else {
            return String::new();
        };
        let mut s = String::new();
        if *is_const {
            s.push_str("const ");
        }
        s.push_str(&format!("{var_type} {name}"));
        if let Some(init) = init {
            s.push_str(&format!(" = {}", self.render_expr(*init)));
        }
        s
    }

    fn render_func_decl(&self, id: NodeId, out: &mut String) {
        let NodeKind::FuncDecl {
            ret_type,
            name,
            params,
            body,
        } = self.kind(id)
        else {
            return;
        };
        let rendered: Vec<String> = params.iter().map(|&p| self.render_var_decl(p)).collect();
        out.push_str(&format!("{} {}({})\n", ret_type, name, rendered.join(", ")));
        if let Some(body) = body {
            self.render_stmt(*body, 0, out);
            out.push('\n');
        }
    }

    fn render_stmt(&self, id: NodeId, indent: usize, out: &mut String) {
        let pad = "    ".repeat(indent);
        match self.kind(id) {
            NodeKind::EmptyStmt => out.push_str(&format!("{pad};\n")),
            NodeKind::BlockStmt { vars, stmts } => {
                out.push_str(&format!("{pad}{{\n"));
                for &var in vars {
                    out.push_str(&format!(
                        "{}{};\n",
                        "    ".repeat(indent + 1),
                        self.render_var_decl(var)
                    ));
                }
                for &stmt in stmts {
                    self.render_stmt(stmt, indent + 1, out);
                }
                out.push_str(&format!("{pad}}}\n"));
            }
            NodeKind::PrintStmt { args } => {
                out.push_str(&format!("{pad}{};\n", self.render_call("print", args)))
            }
            NodeKind::ScanStmt { name } => out.push_str(&format!("{pad}scan({name});\n")),
            NodeKind::AssignStmt { name, expr } => {
                out.push_str(&format!("{pad}{} = {};\n", name, self.render_expr(*expr)))
            }
            NodeKind::FuncCallStmt { name, args } => {
                out.push_str(&format!("{pad}{};\n", self.render_call(name, args)))
            }
            NodeKind::IfStmt {
                cond,
                then_stmt,
                else_stmt,
            } => {
                out.push_str(&format!("{pad}if ({})\n", self.render_expr(*cond)));
                self.render_substmt(*then_stmt, indent, out);
                if let Some(else_stmt) = else_stmt {
                    out.push_str(&format!("{pad}else\n"));
                    self.render_substmt(*else_stmt, indent, out);
                }
            }
            NodeKind::SwitchStmt { cond, cases } => {
                out.push_str(&format!("{pad}switch ({})\n{pad}{{\n", self.render_expr(*cond)));
                for &case in cases {
                    if let NodeKind::LabeledStmt { label, stmt } = self.kind(case) {
                        out.push_str(&format!("{}case {}:\n", "    ".repeat(indent + 1), label));
                        self.render_substmt(*stmt, indent + 1, out);
                    } else {
                        out.push_str(&format!("{}default:\n", "    ".repeat(indent + 1)));
                        self.render_substmt(case, indent + 1, out);
                    }
                }
                out.push_str(&format!("{pad}}}\n"));
            }
            NodeKind::LabeledStmt { label, stmt } => {
                // only reachable when rendered standalone
                out.push_str(&format!("{pad}case {label}:\n"));
                self.render_substmt(*stmt, indent, out);
            }
            NodeKind::WhileStmt { cond, body } => {
                out.push_str(&format!("{pad}while ({})\n", self.render_expr(*cond)));
                self.render_substmt(*body, indent, out);
            }
            NodeKind::DoStmt { body, cond } => {
                out.push_str(&format!("{pad}do\n"));
                self.render_substmt(*body, indent, out);
                out.push_str(&format!("{pad}while ({});\n", self.render_expr(*cond)));
            }
            NodeKind::ForStmt {
                inits,
                cond,
                updates,
                body,
            } => {
                let inits: Vec<String> = inits.iter().map(|&e| self.render_expr(e)).collect();
                let cond = cond.map(|c| self.render_expr(c)).unwrap_or_default();
                let updates: Vec<String> = updates.iter().map(|&e| self.render_expr(e)).collect();
                out.push_str(&format!(
                    "{pad}for ({}; {}; {})\n",
                    inits.join(", "),
                    cond,
                    updates.join(", ")
                ));
                if let Some(body) = body {
                    self.render_substmt(*body, indent, out);
                }
            }
            NodeKind::BreakStmt => out.push_str(&format!("{pad}break;\n")),
            NodeKind::ContinueStmt => out.push_str(&format!("{pad}continue;\n")),
            NodeKind::ReturnStmt { expr } => match expr {
                Some(expr) => {
                    out.push_str(&format!("{pad}return {};\n", self.render_expr(*expr)))
                }
                None => out.push_str(&format!("{pad}return;\n")),
            },
            _ => {}
        }
    }

    /// A statement in body position: blocks stay at the same indent, other
    /// statements indent one level.
    fn render_substmt(&self, id: NodeId, indent: usize, out: &mut String) {
        if matches!(self.kind(id), NodeKind::BlockStmt { .. }) {
            self.render_stmt(id, indent, out);
        } else {
            self.render_stmt(id, indent + 1, out);
        }
    }
}

/// Indented one-line-per-node dump of an analysed tree.
pub struct DumpVisitor {
    depth: usize,
    out: String,
}

impl DumpVisitor {
    pub fn new() -> Self {
        Self {
            depth: 0,
            out: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn describe(ast: &Ast, id: NodeId) -> String {
        let tag = ast.ast_type(id).as_str();
        match ast.kind(id) {
            NodeKind::BinaryExpr { op, .. } => format!("{tag} '{}' : {}", op.as_str(), ast.var_type(id)),
            NodeKind::CastExpr {
                target,
                is_explicit,
                ..
            } => {
                let how = if *is_explicit { "explicit" } else { "implicit" };
                format!("{tag} {how} : {target}")
            }
            NodeKind::UnaryExpr { op, .. } => format!("{tag} '{}' : {}", op.as_str(), ast.var_type(id)),
            NodeKind::BraceExpr { .. } => format!("{tag} : {}", ast.var_type(id)),
            NodeKind::IdentExpr { name } => format!("{tag} {name} : {}", ast.var_type(id)),
            NodeKind::IntExpr { value } => format!("{tag} {value}"),
            NodeKind::CharExpr { value } => format!("{tag} {}", format_char_literal(*value)),
            NodeKind::FloatExpr { value } => format!("{tag} {}", format_float_literal(*value)),
            NodeKind::StrExpr { value } => format!("{tag} {}", format_str_literal(value)),
            NodeKind::AssignExpr { name, .. } | NodeKind::AssignStmt { name, .. } => {
                format!("{tag} {name}")
            }
            NodeKind::FuncCallExpr { name, .. } => {
                format!("{tag} {name} : {}", ast.var_type(id))
            }
            NodeKind::FuncCallStmt { name, .. } | NodeKind::ScanStmt { name } => {
                format!("{tag} {name}")
            }
            NodeKind::LabeledStmt { label, .. } => format!("{tag} {label}"),
            NodeKind::VarDecl {
                is_const,
                var_type,
                name,
                is_param,
                ..
            } => {
                let mut s = format!("{tag} ");
                if *is_param {
                    s.push_str("param ");
                }
                if *is_const {
                    s.push_str("const ");
                }
                s.push_str(&format!("{var_type} {name}"));
                s
            }
            NodeKind::FuncDecl { ret_type, name, .. } => format!("{tag} {ret_type} {name}"),
            _ => tag.to_string(),
        }
    }
}

impl Default for DumpVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AstVisitor for DumpVisitor {
    fn beg_visit(&mut self, ast: &Ast, id: NodeId) -> bool {
        self.out.push_str(&"  ".repeat(self.depth));
        self.out.push_str(&Self::describe(ast, id));
        self.out.push('\n');
        self.depth += 1;
        true
    }

    fn end_visit(&mut self, _ast: &Ast, _id: NodeId) -> bool {
        self.depth -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, VarType};

    fn leaf_file() -> (Ast, NodeId) {
        let mut ast = Ast::new();
        let file = ast.add(None, NodeKind::File { vars: vec![], funcs: vec![] });
        (ast, file)
    }

    #[test]
    fn test_render_literals() {
        let (mut ast, file) = leaf_file();
        let i = ast.add(Some(file), NodeKind::IntExpr { value: 42 });
        assert_eq!(ast.to_source(i), "42");
        let c = ast.add(Some(file), NodeKind::CharExpr { value: b'\n' });
        assert_eq!(ast.to_source(c), r"'\n'");
        let f = ast.add(Some(file), NodeKind::FloatExpr { value: 2.0 });
        assert_eq!(ast.to_source(f), "2.0");
        let s = ast.add(Some(file), NodeKind::StrExpr { value: "hi".into() });
        assert_eq!(ast.to_source(s), "\"hi\"");
    }

    #[test]
    fn test_implicit_cast_renders_as_operand() {
        let (mut ast, file) = leaf_file();
        let i = ast.add(Some(file), NodeKind::IntExpr { value: 1 });
        let implicit = ast.add(
            Some(file),
            NodeKind::CastExpr {
                target: VarType::Float,
                is_explicit: false,
                expr: i,
            },
        );
        ast.set_parent(i, implicit);
        assert_eq!(ast.to_source(implicit), "1");
    }

    #[test]
    fn test_explicit_cast_keeps_spelling() {
        let (mut ast, file) = leaf_file();
        let i = ast.add(Some(file), NodeKind::IntExpr { value: 1 });
        let cast = ast.add(
            Some(file),
            NodeKind::CastExpr {
                target: VarType::Float,
                is_explicit: true,
                expr: i,
            },
        );
        ast.set_parent(i, cast);
        assert_eq!(ast.to_source(cast), "(double)1");
    }

    #[test]
    fn test_render_binary_with_braces() {
        let (mut ast, file) = leaf_file();
        let a = ast.add(Some(file), NodeKind::IntExpr { value: 1 });
        let b = ast.add(Some(file), NodeKind::IntExpr { value: 2 });
        let add = ast.add(
            Some(file),
            NodeKind::BinaryExpr {
                op: BinaryOp::Add,
                left: a,
                right: b,
            },
        );
        ast.set_parent(a, add);
        ast.set_parent(b, add);
        let brace = ast.add(Some(file), NodeKind::BraceExpr { expr: add });
        ast.set_parent(add, brace);
        let c = ast.add(Some(file), NodeKind::IntExpr { value: 3 });
        let mul = ast.add(
            Some(file),
            NodeKind::BinaryExpr {
                op: BinaryOp::Mul,
                left: brace,
                right: c,
            },
        );
        ast.set_parent(brace, mul);
        ast.set_parent(c, mul);
        assert_eq!(ast.to_source(mul), "(1 + 2) * 3");
    }
}
