//! Issue detection: run the enabled rules over one text and assemble the
//! ordered, deduplicated, numbered issue list.

use std::collections::{HashMap, HashSet};

use crate::context::ContextMap;
use crate::rules::{self, Detection};
use crate::types::{Issue, IssueStatus, RuleKind, Tier, TierSet};

/// Scan `text` and return the full issue list for the enabled tiers.
///
/// Detections are stable-sorted by (span start, registry precedence), so two
/// runs over identical text always produce identical lists. Detections whose
/// proposed edits cover the exact same byte range collapse to the earliest
/// precedence; report-only detections are never deduplicated. Ids are
/// assigned sequentially from 1 after ordering.
///
/// A detection anchored inside comment or string context is discarded here;
/// only the block-boundary brace rules may straddle such context.
pub fn detect(text: &str, tiers: TierSet) -> Vec<Issue> {
    let ctx = ContextMap::scan(text);
    let mut raw: Vec<(usize, Detection)> = Vec::new();
    for (precedence, rule) in rules::REGISTRY.iter().enumerate() {
        if !tiers.enables(rule.tier) {
            continue;
        }
        let straddles_blocks =
            matches!(rule.kind, RuleKind::UnbalancedBraces | RuleKind::UnclosedStructOrEnum);
        for detection in (rule.detect)(&ctx, text) {
            let anchored = detection.span.start < detection.span.end;
            if anchored && !straddles_blocks && !ctx.is_code(detection.span.start) {
                continue;
            }
            raw.push((precedence, detection));
        }
    }
    raw.sort_by_key(|(precedence, detection)| return (detection.span.start, *precedence));

    let winners = edit_span_winners(&raw);
    let mut taken: HashSet<(usize, usize)> = HashSet::new();
    let mut issues: Vec<Issue> = Vec::new();
    for (precedence, detection) in raw {
        if let Some(edit) = &detection.edit {
            let key = (edit.span.start, edit.span.end);
            if winners.get(&key) != Some(&precedence) || !taken.insert(key) {
                continue;
            }
        }
        let tier = rules::REGISTRY.get(precedence).map_or(Tier::Strict, |rule| return rule.tier);
        let id = issues.len().saturating_add(1).try_into().unwrap_or(u32::MAX);
        issues.push(Issue {
            edit: detection.edit,
            id,
            kind: detection.kind,
            message: detection.message,
            span: detection.span,
            status: IssueStatus::Open,
            tier,
        });
    }
    return issues;
}

/// For each proposed edit span, the precedence of the rule that wins it.
fn edit_span_winners(raw: &[(usize, Detection)]) -> HashMap<(usize, usize), usize> {
    let mut winners: HashMap<(usize, usize), usize> = HashMap::new();
    for (precedence, detection) in raw {
        let Some(edit) = &detection.edit else {
            continue;
        };
        let entry = winners.entry((edit.span.start, edit.span.end)).or_insert(*precedence);
        if *precedence < *entry {
            *entry = *precedence;
        }
    }
    return winners;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_from_one() {
        let text = "var int A\nvar int B\n";
        let issues = detect(text, TierSet::strict_only());
        let ids: Vec<u32> = issues.iter().map(|issue| return issue.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn issues_are_ordered_by_span_start() {
        let text = "var int B\nx = (1\n";
        let issues = detect(text, TierSet::strict_only());
        assert_eq!(issues.len(), 2);
        assert!(issues[0].span.start <= issues[1].span.start);
        assert_eq!(issues[0].kind, RuleKind::MissingSemicolon);
        assert_eq!(issues[1].kind, RuleKind::UnbalancedParens);
    }

    #[test]
    fn identical_edit_spans_keep_the_earlier_rule() {
        let text = "struct V {\n    var float X\n\nfunction F()\n";
        let issues = detect(text, TierSet { extended: true, paren_fixer: false });
        let brace_fixes: Vec<&Issue> = issues
            .iter()
            .filter(|issue| {
                return issue.edit.as_ref().is_some_and(|edit| return edit.replacement == "}\n");
            })
            .collect();
        assert_eq!(brace_fixes.len(), 1);
        assert_eq!(brace_fixes[0].kind, RuleKind::UnbalancedBraces);
        assert!(issues.iter().all(|issue| return issue.kind != RuleKind::UnclosedStructOrEnum));
    }

    #[test]
    fn report_only_issues_are_never_deduplicated() {
        let text = "x = a);\n";
        let issues = detect(text, TierSet { extended: true, paren_fixer: false });
        assert_eq!(issues.len(), 2);
        assert!(issues
            .iter()
            .any(|issue| return issue.kind == RuleKind::UnbalancedParens && issue.edit.is_none()));
        assert!(issues
            .iter()
            .any(|issue| return issue.kind == RuleKind::UnmatchedCloseParen && issue.is_fixable()));
    }

    #[test]
    fn disabled_tiers_stay_silent() {
        let text = "x = a);\n";
        let issues = detect(text, TierSet::strict_only());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, RuleKind::UnbalancedParens);
        assert_eq!(issues[0].tier, crate::types::Tier::Strict);
    }

    #[test]
    fn clean_text_yields_no_issues() {
        let text = "class A extends Object;\n\nvar int X;\n\nfunction F()\n{\n    X = 1;\n}\n";
        assert!(detect(text, TierSet { extended: true, paren_fixer: true }).is_empty());
    }

    #[test]
    fn decoy_defects_inside_comments_and_strings_are_ignored() {
        let text = "// struct Fake { if (bad\nvar string Msg;\nfunction F()\n{\n    Msg = \"cpptext { (((\";\n    x = (1\n}\n/* enum Ghost {\n   defaultproperties */\nvar int Real\n";
        let issues = detect(text, TierSet { extended: true, paren_fixer: true });
        let kinds: Vec<RuleKind> = issues.iter().map(|issue| return issue.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RuleKind::UnbalancedParens,
                RuleKind::UnmatchedOpenParen,
                RuleKind::MissingSemicolon,
            ],
        );
        let ctx = ContextMap::scan(text);
        for issue in &issues {
            for offset in issue.span.start..issue.span.end {
                assert!(ctx.is_code(offset), "issue span strayed into masked context");
            }
        }
    }
}
