//! Detection rules: the fixed catalog of syntax checks and the fixes they
//! propose. Registry order sets precedence when detections tie on position.

use crate::context::{self, ContextMap};
use crate::grammar;
use crate::types::{FixEdit, RuleKind, Span, Tier};

/// The fixed rule catalog, in precedence order.
pub const REGISTRY: &[Rule] = &[
    Rule { detect: cpptext_brace, kind: RuleKind::MissingCpptextBrace, tier: Tier::Strict },
    Rule { detect: brace_balance, kind: RuleKind::UnbalancedBraces, tier: Tier::Strict },
    Rule { detect: brace_extra_close, kind: RuleKind::ExcessClosingBrace, tier: Tier::Strict },
    Rule { detect: defaultprops_brace, kind: RuleKind::MissingDefaultPropertiesBrace, tier: Tier::Strict },
    Rule { detect: semicolon_missing, kind: RuleKind::MissingSemicolon, tier: Tier::Strict },
    Rule { detect: paren_balance, kind: RuleKind::UnbalancedParens, tier: Tier::Strict },
    Rule { detect: control_paren_close, kind: RuleKind::MissingClosingParen, tier: Tier::Extended },
    Rule { detect: struct_enum_close, kind: RuleKind::UnclosedStructOrEnum, tier: Tier::Extended },
    Rule { detect: paren_extra_close, kind: RuleKind::UnmatchedCloseParen, tier: Tier::Extended },
    Rule { detect: paren_extra_open, kind: RuleKind::UnmatchedOpenParen, tier: Tier::UnmatchedParenFixer },
];

/// A raw detection produced by one rule, before ids are assigned.
#[derive(Debug, Clone)]
pub struct Detection {
    /// The proposed repair, or `None` for report-only detections.
    pub edit: Option<FixEdit>,
    /// Which rule produced the detection.
    pub kind: RuleKind,
    /// Human-readable description of the problem.
    pub message: String,
    /// Byte range the detection points at.
    pub span: Span,
}

/// One registry entry binding a detection function to its rule and tier.
pub struct Rule {
    /// The detection function. Infallible; worst case returns nothing.
    pub detect: RuleFn,
    /// The rule this entry implements.
    pub kind: RuleKind,
    /// Activation tier gating the rule.
    pub tier: Tier,
}

/// Signature shared by every detection rule. Rules are pure functions of the
/// text and its context map, and never see each other's output.
pub type RuleFn = fn(&ContextMap, &str) -> Vec<Detection>;

/// More `{` than `}` in code context. Anchors the last unclosed `{` and
/// closes it before the next top-level declaration, or at end of file.
fn brace_balance(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let mut open_stack: Vec<usize> = Vec::new();
    for (offset, byte) in ctx.code_bytes_in(text, Span::new(0, text.len())) {
        if byte == b'{' {
            open_stack.push(offset);
        } else if byte == b'}' {
            open_stack.pop();
        }
    }
    let Some(&unclosed) = open_stack.last() else {
        return Vec::new();
    };
    let masked = ctx.masked(text, Span::new(0, text.len()), false);
    let insert_at = grammar::top_level_decl()
        .find_iter(&masked)
        .map(|m| return m.start())
        .find(|start| return *start > unclosed)
        .unwrap_or(text.len());
    return vec![Detection {
        edit: Some(insert_line_at(text, insert_at, "}")),
        kind: RuleKind::UnbalancedBraces,
        message: "more '{' than '}': this block is never closed".to_string(),
        span: Span::new(unclosed, unclosed.saturating_add(1)),
    }];
}

/// More `}` than `{` in code context. Report-only, anchored at the first `}`
/// that closes nothing.
fn brace_extra_close(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let mut depth = 0_usize;
    let mut first_unmatched: Option<usize> = None;
    let mut total_open = 0_usize;
    let mut total_close = 0_usize;
    for (offset, byte) in ctx.code_bytes_in(text, Span::new(0, text.len())) {
        if byte == b'{' {
            total_open = total_open.saturating_add(1);
            depth = depth.saturating_add(1);
        } else if byte == b'}' {
            total_close = total_close.saturating_add(1);
            if depth == 0 {
                if first_unmatched.is_none() {
                    first_unmatched = Some(offset);
                }
            } else {
                depth = depth.saturating_sub(1);
            }
        }
    }
    if total_close <= total_open {
        return Vec::new();
    }
    let Some(anchor) = first_unmatched else {
        return Vec::new();
    };
    return vec![Detection {
        edit: None,
        kind: RuleKind::ExcessClosingBrace,
        message: "more '}' than '{': unmatched closing brace".to_string(),
        span: Span::new(anchor, anchor.saturating_add(1)),
    }];
}

/// Whether `(` and `)` counts agree in an already code-masked line.
fn code_parens_balanced(code_only: &str) -> bool {
    return code_only.matches('(').count() == code_only.matches(')').count();
}

/// Offset just past the last non-whitespace character, or `None` for an
/// all-whitespace string.
fn content_end(masked: &str) -> Option<usize> {
    let trimmed = masked.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    return Some(trimmed.len());
}

/// A single-line control header with exactly one `)` missing. Inserts before
/// the block-opening `{` when the line has one, otherwise after the last
/// code character.
fn control_paren_close(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let mut found = Vec::new();
    let pattern = grammar::control_header();
    for line in context::line_spans(text) {
        let code_only = ctx.masked(text, line, false);
        let Some(header) = pattern.captures(&code_only) else {
            continue;
        };
        let opens = code_only.matches('(').count();
        let closes = code_only.matches(')').count();
        if opens != closes.saturating_add(1) {
            continue;
        }
        let insert_rel = match code_only.find('{') {
            None => content_end(&code_only),
            Some(brace_rel) => content_end(code_only.get(..brace_rel).unwrap_or("")),
        };
        let Some(insert_rel) = insert_rel else {
            continue;
        };
        let Some(keyword) = header.get(1) else {
            continue;
        };
        found.push(Detection {
            edit: Some(FixEdit {
                replacement: ")".to_string(),
                span: Span::empty_at(line.start.saturating_add(insert_rel)),
            }),
            kind: RuleKind::MissingClosingParen,
            message: "control statement is missing a closing ')'".to_string(),
            span: Span::new(
                line.start.saturating_add(keyword.start()),
                line.start.saturating_add(keyword.end()),
            ),
        });
    }
    return found;
}

/// A `cpptext` header with no `{` on its line and none opening the next
/// effective line.
fn cpptext_brace(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let mut found = Vec::new();
    let pattern = grammar::cpptext();
    let lines = context::line_spans(text);
    for (idx, line) in lines.iter().enumerate() {
        let masked = ctx.masked(text, *line, false);
        let Some(keyword) = pattern.find(&masked) else {
            continue;
        };
        if masked.contains('{') {
            continue;
        }
        if next_effective_line_opens_brace(ctx, text, &lines, idx) {
            continue;
        }
        found.push(Detection {
            edit: Some(insert_line_after(text, &lines, idx, "{")),
            kind: RuleKind::MissingCpptextBrace,
            message: "missing '{' after 'cpptext' header".to_string(),
            span: Span::new(
                line.start.saturating_add(keyword.start()),
                line.start.saturating_add(keyword.end()),
            ),
        });
    }
    return found;
}

/// A `defaultproperties` keyword not followed by `{` across whitespace.
/// Inserts an empty block right after the keyword.
fn defaultprops_brace(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let mut found = Vec::new();
    let masked = ctx.masked(text, Span::new(0, text.len()), false);
    for keyword in grammar::defaultproperties().find_iter(&masked) {
        let tail = masked.get(keyword.end()..).unwrap_or("");
        if tail.trim_start().starts_with('{') {
            continue;
        }
        found.push(Detection {
            edit: Some(FixEdit {
                replacement: " {\n}\n".to_string(),
                span: Span::empty_at(keyword.end()),
            }),
            kind: RuleKind::MissingDefaultPropertiesBrace,
            message: "'defaultproperties' must open a '{ ... }' block".to_string(),
            span: Span::new(keyword.start(), keyword.end()),
        });
    }
    return found;
}

/// Build an edit inserting `content` as its own line after line `line_idx`.
fn insert_line_after(text: &str, lines: &[Span], line_idx: usize, content: &str) -> FixEdit {
    let at = lines
        .get(line_idx.saturating_add(1))
        .map_or(text.len(), |next| return next.start);
    return insert_line_at(text, at, content);
}

/// Build an edit inserting `content` as its own line at byte `at`. Appending
/// to a text without a final newline opens a fresh line first.
fn insert_line_at(text: &str, at: usize, content: &str) -> FixEdit {
    if at >= text.len() && !text.ends_with('\n') && !text.is_empty() {
        return FixEdit {
            replacement: format!("\n{content}\n"),
            span: Span::empty_at(text.len()),
        };
    }
    return FixEdit {
        replacement: format!("{content}\n"),
        span: Span::empty_at(at.min(text.len())),
    };
}

/// Whether the first non-blank line after `line_idx` starts with `{`.
/// Comment-only lines count as blank.
fn next_effective_line_opens_brace(
    ctx: &ContextMap,
    text: &str,
    lines: &[Span],
    line_idx: usize,
) -> bool {
    for line in lines.iter().skip(line_idx.saturating_add(1)) {
        let masked = ctx.masked(text, *line, false);
        let trimmed = masked.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        return trimmed.starts_with('{');
    }
    return false;
}

/// A global `(`/`)` imbalance in code context. Report-only, anchored at the
/// first paren left unmatched on the surplus side.
fn paren_balance(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let mut stack: Vec<usize> = Vec::new();
    let mut first_unmatched_close: Option<usize> = None;
    let mut opens = 0_usize;
    let mut closes = 0_usize;
    for (offset, byte) in ctx.code_bytes_in(text, Span::new(0, text.len())) {
        if byte == b'(' {
            opens = opens.saturating_add(1);
            stack.push(offset);
        } else if byte == b')' {
            closes = closes.saturating_add(1);
            if stack.pop().is_none() && first_unmatched_close.is_none() {
                first_unmatched_close = Some(offset);
            }
        }
    }
    if opens == closes {
        return Vec::new();
    }
    let (anchor, message) = if opens > closes {
        let Some(&first_open) = stack.first() else {
            return Vec::new();
        };
        (first_open, "unbalanced parentheses: more '(' than ')'")
    } else {
        let Some(first_close) = first_unmatched_close else {
            return Vec::new();
        };
        (first_close, "unbalanced parentheses: more ')' than '('")
    };
    return vec![Detection {
        edit: None,
        kind: RuleKind::UnbalancedParens,
        message: message.to_string(),
        span: Span::new(anchor, anchor.saturating_add(1)),
    }];
}

/// The first `)` at paren depth zero; deleting it restores local balance.
/// One detection per scan so later imbalances are re-judged on fresh text.
fn paren_extra_close(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let mut depth = 0_usize;
    for (offset, byte) in ctx.code_bytes_in(text, Span::new(0, text.len())) {
        if byte == b'(' {
            depth = depth.saturating_add(1);
        } else if byte == b')' {
            if depth == 0 {
                let span = Span::new(offset, offset.saturating_add(1));
                return vec![Detection {
                    edit: Some(FixEdit { replacement: String::new(), span }),
                    kind: RuleKind::UnmatchedCloseParen,
                    message: "unmatched ')' with nothing to close".to_string(),
                    span,
                }];
            }
            depth = depth.saturating_sub(1);
        }
    }
    return Vec::new();
}

/// A `(` still unmatched when the next top-level declaration (or end of
/// file) arrives. Reports the rightmost one, once per scan.
fn paren_extra_open(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let masked = ctx.masked(text, Span::new(0, text.len()), false);
    let mut boundaries = grammar::top_level_decl()
        .find_iter(&masked)
        .map(|m| return m.start())
        .collect::<Vec<usize>>()
        .into_iter()
        .peekable();
    let mut stack: Vec<usize> = Vec::new();
    for (offset, byte) in ctx.code_bytes_in(text, Span::new(0, text.len())) {
        while boundaries.peek().is_some_and(|boundary| return *boundary <= offset) {
            boundaries.next();
            if let Some(&open) = stack.last() {
                return vec![unmatched_open_detection(open)];
            }
        }
        if byte == b'(' {
            stack.push(offset);
        } else if byte == b')' {
            stack.pop();
        }
    }
    let Some(&open) = stack.last() else {
        return Vec::new();
    };
    return vec![unmatched_open_detection(open)];
}

/// A `var`/`local` declaration or simple assignment whose code lacks its
/// trailing `;`. The insertion lands after the last code or string
/// character, ahead of any trailing comment.
fn semicolon_missing(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let mut found = Vec::new();
    let assignment = grammar::assignment_head();
    let var_decl = grammar::var_decl_head();
    for line in context::line_spans(text) {
        let code_only = ctx.masked(text, line, false);
        let with_strings = ctx.masked(text, line, true);
        let trimmed = with_strings.trim();
        if trimmed.is_empty()
            || trimmed.ends_with(';')
            || trimmed.ends_with('{')
            || trimmed.ends_with('}')
        {
            continue;
        }
        if !code_parens_balanced(&code_only) {
            continue;
        }
        if !var_decl.is_match(trimmed) && !assignment.is_match(trimmed) {
            continue;
        }
        let Some(relative_end) = content_end(&with_strings) else {
            continue;
        };
        let span = Span::empty_at(line.start.saturating_add(relative_end));
        found.push(Detection {
            edit: Some(FixEdit { replacement: ";".to_string(), span }),
            kind: RuleKind::MissingSemicolon,
            message: "likely missing ';' at end of statement".to_string(),
            span,
        });
    }
    return found;
}

/// A `struct`/`enum` header whose block never returns to depth zero. Closes
/// it before the first top-level declaration after the last brace seen, or
/// at end of file.
fn struct_enum_close(ctx: &ContextMap, text: &str) -> Vec<Detection> {
    let mut found = Vec::new();
    let masked = ctx.masked(text, Span::new(0, text.len()), false);
    let top_level = grammar::top_level_decl();
    for header in grammar::struct_enum_header().captures_iter(&masked) {
        let (Some(whole), Some(keyword)) = (header.get(0), header.get(1)) else {
            continue;
        };
        let mut depth = 1_usize;
        let mut last_brace_end = whole.end();
        for (offset, byte) in ctx.code_bytes_in(text, Span::new(whole.end(), text.len())) {
            if byte == b'{' {
                depth = depth.saturating_add(1);
            } else if byte == b'}' {
                depth = depth.saturating_sub(1);
            } else {
                continue;
            }
            last_brace_end = offset.saturating_add(1);
            if depth == 0 {
                break;
            }
        }
        if depth == 0 {
            continue;
        }
        let insert_at = top_level
            .find_iter(&masked)
            .map(|m| return m.start())
            .find(|start| return *start >= last_brace_end)
            .unwrap_or(text.len());
        found.push(Detection {
            edit: Some(insert_line_at(text, insert_at, "}")),
            kind: RuleKind::UnclosedStructOrEnum,
            message: format!(
                "missing '}}' to close this {} block",
                keyword.as_str().to_ascii_lowercase()
            ),
            span: Span::new(keyword.start(), keyword.end()),
        });
    }
    return found;
}

/// Detection payload for a `(` left open at a declaration boundary.
fn unmatched_open_detection(open: usize) -> Detection {
    let span = Span::new(open, open.saturating_add(1));
    return Detection {
        edit: Some(FixEdit { replacement: String::new(), span }),
        kind: RuleKind::UnmatchedOpenParen,
        message: "'(' is never closed before the next declaration".to_string(),
        span,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    /// Run a single rule against text.
    fn run(rule: RuleFn, text: &str) -> Vec<Detection> {
        let ctx = ContextMap::scan(text);
        return rule(&ctx, text);
    }

    #[test]
    fn cpptext_without_brace_gets_one_inserted_after_header() {
        let text = "class A extends Object;\n\ncpptext\n\nvar int X;\n";
        let found = run(cpptext_brace, text);
        assert_eq!(found.len(), 1);
        let edit = found[0].edit.as_ref().unwrap();
        assert_eq!(edit.replacement, "{\n");
        assert_eq!(edit.span.start, text.find("cpptext").unwrap() + "cpptext\n".len());
    }

    #[test]
    fn cpptext_with_brace_on_next_effective_line_passes() {
        let text = "cpptext\n// native block\n{\n}\n";
        assert!(run(cpptext_brace, text).is_empty());
    }

    #[test]
    fn unbalanced_brace_anchors_the_last_unclosed_open() {
        let text = "function A()\n{\n    x = 1;\n\nfunction B()\n{\n}\n";
        let found = run(brace_balance, text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span.start, text.find('{').unwrap());
        let edit = found[0].edit.as_ref().unwrap();
        assert_eq!(edit.replacement, "}\n");
        assert_eq!(edit.span.start, text.find("function B").unwrap());
    }

    #[test]
    fn braces_inside_comments_do_not_count() {
        let text = "function A()\n{\n    // {\n}\n";
        assert!(run(brace_balance, text).is_empty());
        assert!(run(brace_extra_close, text).is_empty());
    }

    #[test]
    fn extra_closing_brace_is_report_only() {
        let text = "function A()\n{\n}\n}\n";
        let found = run(brace_extra_close, text);
        assert_eq!(found.len(), 1);
        assert!(found[0].edit.is_none());
        assert_eq!(found[0].span.start, text.rfind('}').unwrap());
    }

    #[test]
    fn defaultproperties_without_block_gets_an_empty_one() {
        let text = "class A extends Object;\n\ndefaultproperties\n";
        let found = run(defaultprops_brace, text);
        assert_eq!(found.len(), 1);
        let edit = found[0].edit.as_ref().unwrap();
        assert_eq!(edit.replacement, " {\n}\n");
        assert_eq!(
            edit.span.start,
            text.find("defaultproperties").unwrap() + "defaultproperties".len()
        );
    }

    #[test]
    fn defaultproperties_with_block_after_blank_line_passes() {
        let text = "defaultproperties\n\n{\n    Health=100\n}\n";
        assert!(run(defaultprops_brace, text).is_empty());
    }

    #[test]
    fn var_declaration_without_semicolon_detected() {
        let text = "var int Health\n";
        let found = run(semicolon_missing, text);
        assert_eq!(found.len(), 1);
        let edit = found[0].edit.as_ref().unwrap();
        assert_eq!(edit.replacement, ";");
        assert_eq!(edit.span.start, text.find("Health").unwrap() + "Health".len());
    }

    #[test]
    fn local_declaration_counts_too() {
        let text = "local float Speed\n";
        assert_eq!(run(semicolon_missing, text).len(), 1);
    }

    #[test]
    fn semicolon_lands_after_string_and_before_comment() {
        let text = "Desc = \"a;b\" // trailing\n";
        let found = run(semicolon_missing, text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].edit.as_ref().unwrap().span.start, text.rfind('"').unwrap() + 1);
    }

    #[test]
    fn comparison_is_not_an_assignment() {
        let text = "x == y\n";
        assert!(run(semicolon_missing, text).is_empty());
    }

    #[test]
    fn open_paren_line_is_a_continuation_not_a_statement() {
        let text = "x = Foo(a,\n";
        assert!(run(semicolon_missing, text).is_empty());
    }

    #[test]
    fn paren_imbalance_is_report_only() {
        let text = "f(a, (b);\n";
        let found = run(paren_balance, text);
        assert_eq!(found.len(), 1);
        assert!(found[0].edit.is_none());
        assert_eq!(found[0].span.start, text.find('(').unwrap());
    }

    #[test]
    fn control_header_one_paren_short_closes_before_brace() {
        let text = "function T()\n{\n    if (x > 0 { DoThing(); }\n}\n";
        let found = run(control_paren_close, text);
        assert_eq!(found.len(), 1);
        let edit = found[0].edit.as_ref().unwrap();
        assert_eq!(edit.replacement, ")");
        assert_eq!(edit.span.start, text.find("> 0").unwrap() + "> 0".len());
    }

    #[test]
    fn control_header_without_brace_closes_at_line_end() {
        let text = "while (a < b\n";
        let found = run(control_paren_close, text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].edit.as_ref().unwrap().span.start, text.find('b').unwrap() + 1);
    }

    #[test]
    fn balanced_control_header_passes() {
        let text = "if (x > 0)\n{\n}\n";
        assert!(run(control_paren_close, text).is_empty());
    }

    #[test]
    fn unclosed_struct_closes_before_next_declaration() {
        let text = "struct V {\n    var float X\n\nfunction F()\n";
        let found = run(struct_enum_close, text);
        assert_eq!(found.len(), 1);
        let edit = found[0].edit.as_ref().unwrap();
        assert_eq!(edit.replacement, "}\n");
        assert_eq!(edit.span.start, text.find("    var float").unwrap());
    }

    #[test]
    fn closed_struct_passes() {
        let text = "struct V {\n    var float X;\n};\n";
        assert!(run(struct_enum_close, text).is_empty());
    }

    #[test]
    fn stray_close_paren_is_deleted() {
        let text = "x = a);\n";
        let found = run(paren_extra_close, text);
        assert_eq!(found.len(), 1);
        let edit = found[0].edit.as_ref().unwrap();
        assert!(edit.replacement.is_empty());
        let at = text.find(')').unwrap();
        assert_eq!(edit.span, Span::new(at, at + 1));
    }

    #[test]
    fn only_the_first_stray_close_is_reported_per_scan() {
        let text = "x = a);\ny = b);\n";
        assert_eq!(run(paren_extra_close, text).len(), 1);
    }

    #[test]
    fn open_paren_in_comment_is_invisible() {
        let text = "// if (x";
        assert!(run(paren_extra_open, text).is_empty());
    }

    #[test]
    fn unmatched_open_fires_at_the_next_declaration_boundary() {
        let text = "function A(\n\nfunction B())\n";
        let found = run(paren_extra_open, text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span.start, text.find('(').unwrap());
    }

    #[test]
    fn rightmost_unmatched_open_is_reported() {
        let text = "x = f((a\n";
        let found = run(paren_extra_open, text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span.start, text.rfind('(').unwrap());
    }
}
