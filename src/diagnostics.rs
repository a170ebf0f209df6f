use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened, why, and how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::ConfigParse { path, reason } => {
            render_config_parse(&path.display().to_string(), reason)
        },
        Error::FileTooLarge { file, size_bytes, max_bytes } => {
            render_file_too_large(file, *size_bytes, *max_bytes)
        },
        Error::IssueNotFound { id } => render_issue_not_found(*id),
        Error::NotFixable { id, rule } => render_not_fixable(*id, rule),
        Error::UnknownTier { name } => render_unknown_tier(name),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),

        Error::EditOutOfBounds { start, end, len } => format!("\
# Error: Edit Out Of Bounds

Fix edit {start}..{end} exceeds the text length {len}.

## Fix

Issue positions only describe the text they were detected on. Re-scan
before applying:

    ucfix check <file>
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Check the syntax of `.ucfix.toml`.
"),

        Error::WatchSetup { reason } => format!("\
# Error: Watcher Setup

{reason}
"),

        _ => format!("\
# Error

{e}
"),
    }
}

fn render_config_parse(path: &str, reason: &str) -> String {
    format!(
        "\
# Error: Config Parse

Could not parse `{path}`: {reason}

## Fix

Check the TOML syntax. A minimal config looks like:

    include = [\"Src/\"]

    [tiers]
    extended = true
"
    )
}

fn render_file_too_large(file: &std::path::Path, size_bytes: u64, max_bytes: u64) -> String {
    format!(
        "\
# Error: File Too Large

`{}` is {size_bytes} bytes; the maximum supported size is {max_bytes} bytes.
",
        file.display()
    )
}

fn render_issue_not_found(id: u32) -> String {
    format!(
        "\
# Error: Issue Not Found

No issue with id {id} in the current list.

## Fix

Issue ids are renumbered on every scan. List the current ones:

    ucfix check <file>
"
    )
}

fn render_not_fixable(id: u32, rule: &str) -> String {
    format!(
        "\
# Error: Not Fixable

Issue {id} ({rule}) is report-only and has no automatic fix.

## Fix

Resolve it by hand. `ucfix info` lists the relevant UnrealScript
documentation links.
"
    )
}

fn render_unknown_tier(name: &str) -> String {
    format!(
        "\
# Error: Unknown Tier

Tier `{name}` is not recognized.

## Fix

Valid tiers are `strict`, `extended`, and `paren-fixer`:

    ucfix tier enable extended
    ucfix tier enable paren-fixer
"
    )
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tier_diagnostic_names_the_valid_ones() {
        let md = render_error(&Error::UnknownTier { name: "gold".to_string() });
        assert!(md.contains("# Error: Unknown Tier"));
        assert!(md.contains("`gold`"));
        assert!(md.contains("paren-fixer"));
    }

    #[test]
    fn not_fixable_diagnostic_points_at_info() {
        let md = render_error(&Error::NotFixable { id: 2, rule: "paren-balance".to_string() });
        assert!(md.contains("report-only"));
        assert!(md.contains("ucfix info"));
    }

    #[test]
    fn every_diagnostic_is_markdown_with_a_heading() {
        let errors = [
            Error::FileNotFound { path: "X.uc".into() },
            Error::EditOutOfBounds { end: 9, len: 3, start: 7 },
            Error::IssueNotFound { id: 4 },
            Error::UnknownTier { name: "x".to_string() },
            Error::WatchSetup { reason: "no inotify".to_string() },
        ];
        for e in &errors {
            assert!(render_error(e).starts_with("# Error"), "for {e}");
        }
    }
}
