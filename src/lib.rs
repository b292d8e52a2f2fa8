//! Front end for the C0 language: a hand-written tokenizer and a
//! single-pass recursive-descent analyser producing a fully type-checked,
//! parent-linked AST.
//!
//! The pipeline is `&str` → [`Tokenizer`] → `Vec<Token>` → [`Analyser`] →
//! [`Ast`]. Each stage owns its output; the AST keeps parent links as arena
//! indices and is walked through the two-hook [`AstVisitor`].

pub mod analyser;
pub mod ast;
pub mod diagnostic;
pub mod dump;
pub mod source;
pub mod span;
pub mod token;
pub mod tokenizer;

pub use analyser::{AnalyseError, Analyser};
pub use ast::{Ast, AstType, AstVisitor, NodeId, NodeKind, SymbolKind, VarType};
pub use dump::DumpVisitor;
pub use span::{Pos, PosRange};
pub use token::{Token, TokenKind, TokenValue};
pub use tokenizer::Tokenizer;

/// Tokenize `source`, returning the token stream (an `Err` token last on
/// failure) and the retained line table.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<String>) {
    let mut tokenizer = Tokenizer::new(source);
    let tokens = tokenizer.all();
    let lines = tokenizer.lines().to_vec();
    (tokens, lines)
}

/// Tokenize and analyse `source` without touching stderr.
pub fn analyse_source_silent(source: &str) -> Result<Ast, AnalyseError> {
    let (tokens, lines) = tokenize(source);
    if let Some(last) = tokens.last() {
        if last.is_error() {
            let mut err = AnalyseError::new(last.string_value().to_string(), last.clone());
            err.fix_source(&lines);
            return Err(err);
        }
    }
    let (ast, err) = Analyser::new(tokens).analyse();
    match err {
        Some(mut err) => {
            err.fix_source(&lines);
            Err(err)
        }
        None => Ok(ast),
    }
}

/// Tokenize and analyse `source`, rendering any failure to stderr.
pub fn analyse_source(source: &str, filename: &str) -> Result<Ast, AnalyseError> {
    match analyse_source_silent(source) {
        Ok(ast) => Ok(ast),
        Err(err) => {
            err.to_diagnostic().render(filename, source);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyse_source_ok() {
        let ast = analyse_source_silent("int main(){return 0;}").unwrap();
        assert_eq!(ast.ast_type(ast.root()), AstType::File);
    }

    #[test]
    fn test_analyse_source_reports_lex_errors() {
        let err = analyse_source_silent("int a = 017;").unwrap_err();
        assert_eq!(err.message(), "octal based literal is banned");
        assert!(err.token().is_error());
    }

    #[test]
    fn test_analyse_source_fills_source_line() {
        let err = analyse_source_silent("int main(){break;}").unwrap_err();
        assert_eq!(err.source_line(), "int main(){break;}\n");
    }
}
