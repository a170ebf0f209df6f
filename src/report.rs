//! Issue report rendering: line/column derivation plus the aligned-text and
//! JSON views of one file's issues.

use std::fmt::Write as _;

use serde::Serialize;

use crate::types::Issue;

/// One file's issues, shaped for JSON output.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// Issues detected in this file.
    pub issues: Vec<ReportEntry>,
    /// Display path of the scanned file.
    pub path: String,
}

/// One row of the per-issue report.
#[derive(Debug, Serialize)]
pub struct ReportEntry {
    /// One-based byte column of the issue anchor.
    pub column: u32,
    /// Whether the issue carries an automatic fix.
    pub fixable: bool,
    /// Detection-run id, stable while the text is unchanged.
    pub id: u32,
    /// One-based line of the issue anchor.
    pub line: u32,
    /// Human-readable description.
    pub message: String,
    /// Stable kebab-case rule id.
    pub rule: String,
    /// Lifecycle status label.
    pub status: String,
}

/// Shape an issue list for rendering or serialization.
pub fn entries(text: &str, issues: &[Issue]) -> Vec<ReportEntry> {
    return issues
        .iter()
        .map(|issue| {
            let (line, column) = line_col(text, issue.span.start);
            return ReportEntry {
                column,
                fixable: issue.is_fixable(),
                id: issue.id,
                line,
                message: issue.message.clone(),
                rule: issue.kind.id().to_string(),
                status: issue.status.label().to_string(),
            };
        })
        .collect();
}

/// Derive the one-based (line, byte column) of a byte offset.
pub fn line_col(text: &str, offset: usize) -> (u32, u32) {
    let clamped = offset.min(text.len());
    let before = text.get(..clamped).unwrap_or(text);
    let line_start = before.rfind('\n').map_or(0, |i| return i.saturating_add(1));
    let line = before.matches('\n').count().saturating_add(1);
    let column = clamped.saturating_sub(line_start).saturating_add(1);
    return (
        line.try_into().unwrap_or(u32::MAX),
        column.try_into().unwrap_or(u32::MAX),
    );
}

/// Render one file's issues as aligned text, one row per issue.
pub fn render_text(display_path: &str, text: &str, issues: &[Issue]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{display_path}");
    for entry in entries(text, issues) {
        let id_tag = format!("#{}", entry.id);
        let position = format!("L{}:{}", entry.line, entry.column);
        let fix_tag = if entry.fixable { "fix" } else { "   " };
        let _ = writeln!(
            out,
            "  {id_tag:<5} {position:<10} {rule:<22} {status:<6} {fix_tag} {message}",
            rule = entry.rule,
            status = entry.status,
            message = entry.message,
        );
    }
    return out;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::detect;
    use crate::types::TierSet;

    #[test]
    fn line_and_column_are_one_based() {
        assert_eq!(line_col("abc", 0), (1, 1));
        assert_eq!(line_col("a\nbc", 2), (2, 1));
        assert_eq!(line_col("a\r\nbc", 4), (2, 2));
        assert_eq!(line_col("abc", 99), (1, 4));
    }

    #[test]
    fn entries_expose_rule_ids_and_fixability() {
        let text = "var int A\nx = (1\n";
        let issues = detect::detect(text, TierSet::strict_only());
        let rows = entries(text, &issues);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].rule, "semicolon-missing");
        assert!(rows[0].fixable);
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[1].rule, "paren-balance");
        assert!(!rows[1].fixable);
        assert_eq!(rows[1].line, 2);
    }

    #[test]
    fn rendered_text_lists_every_issue() {
        let text = "var int A\n";
        let issues = detect::detect(text, TierSet::strict_only());
        let rendered = render_text("Src/A.uc", text, &issues);
        assert!(rendered.starts_with("Src/A.uc\n"));
        assert!(rendered.contains("#1"));
        assert!(rendered.contains("L1:10"));
        assert!(rendered.contains("semicolon-missing"));
        assert!(rendered.contains("open"));
    }
}
