use crate::span::{Pos, PosRange};
use crate::token::Token;

/// A front-end diagnostic (error or warning) over a position range.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub range: PosRange,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String, range: PosRange) -> Self {
        Self {
            severity: Severity::Error,
            message,
            range,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String, range: PosRange) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            range,
            notes: Vec::new(),
            help: None,
        }
    }

    /// Build from a lexer `Err` token; the payload is the message.
    pub fn from_err_token(token: &Token) -> Self {
        Self::error(token.string_value().to_string(), token.range)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let start = byte_offset(source, self.range.start);
        let mut end = byte_offset(source, self.range.end);
        if end <= start {
            // zero-width ranges come out of error tokens cut short
            end = (start + 1).min(source.len().max(start + 1));
        }

        let mut report = Report::build(kind, filename, start)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report
            .finish()
            .eprint((filename, Source::from(source)))
            .ok();
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

/// Translate a row/column position into a byte offset of `source`.
fn byte_offset(source: &str, pos: Pos) -> usize {
    let mut offset = 0;
    for (row, line) in source.split('\n').enumerate() {
        if row == pos.row {
            return (offset + pos.col).min(source.len());
        }
        offset += line.len() + 1;
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Pos;

    #[test]
    fn test_error_construction() {
        let range = PosRange::new(Pos::new(1, 2), Pos::new(1, 5));
        let d = Diagnostic::error("bad token".to_string(), range);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "bad token");
        assert_eq!(d.range, range);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_builders_chain() {
        let d = Diagnostic::warning("w".to_string(), PosRange::dummy())
            .with_note("first".to_string())
            .with_help("try this".to_string())
            .with_note("second".to_string());
        assert_eq!(d.notes.len(), 2);
        assert_eq!(d.help.as_deref(), Some("try this"));
    }

    #[test]
    fn test_from_err_token() {
        let t = Token::error("invalid char", PosRange::new(Pos::new(0, 3), Pos::new(0, 4)));
        let d = Diagnostic::from_err_token(&t);
        assert_eq!(d.message, "invalid char");
        assert_eq!(d.range.start.col, 3);
    }

    #[test]
    fn test_byte_offset_spans_lines() {
        let src = "ab\ncde\nf\n";
        assert_eq!(byte_offset(src, Pos::new(0, 0)), 0);
        assert_eq!(byte_offset(src, Pos::new(0, 2)), 2);
        assert_eq!(byte_offset(src, Pos::new(1, 0)), 3);
        assert_eq!(byte_offset(src, Pos::new(1, 2)), 5);
        assert_eq!(byte_offset(src, Pos::new(2, 0)), 7);
        assert_eq!(byte_offset(src, Pos::new(9, 0)), src.len());
    }

    #[test]
    fn test_render_does_not_panic() {
        let source = "int main(){break;}\n";
        let d = Diagnostic::error(
            "only loop or switch can use 'break' statement".to_string(),
            PosRange::new(Pos::new(0, 11), Pos::new(0, 16)),
        )
        .with_note("RESERVE:break at [1:12 - 1:17)".to_string());
        d.render("test.c0", source);
    }

    #[test]
    fn test_render_zero_width_range() {
        let d = Diagnostic::error("boom".to_string(), PosRange::dummy());
        d.render("test.c0", "x\n");
    }
}
