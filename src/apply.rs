//! Fix application: immutable splicing of accepted edits, applied right to
//! left so earlier splices never shift the offsets of later ones.

use crate::error::Error;
use crate::types::{FixEdit, Issue, Span};

/// Outcome of applying a set of fixes in one pass.
#[derive(Debug)]
pub struct BatchApplied {
    /// Ids whose edits landed, in ascending id order.
    pub applied_ids: Vec<u32>,
    /// Fixes skipped because their edit collided with an accepted one.
    pub conflicts: Vec<Conflict>,
    /// The text with every accepted edit applied.
    pub text: String,
}

/// A fix rejected in favor of an earlier one competing for the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// Id of the rejected issue.
    pub id: u32,
    /// Id of the accepted issue it collided with.
    pub kept_id: u32,
}

/// Apply every fixable issue in `issues` to `text` in one pass.
///
/// Colliding edits are resolved by id: the lower id is kept and the higher
/// id is recorded as a conflict. Either every accepted edit lands or the
/// call fails with the text unchanged; there is no partial application.
///
/// # Errors
///
/// Returns `Error::EditOutOfBounds` if any accepted edit exceeds the text.
pub fn apply_many(text: &str, issues: &[Issue]) -> Result<BatchApplied, Error> {
    let mut candidates: Vec<&Issue> =
        issues.iter().filter(|issue| return issue.edit.is_some()).collect();
    candidates.sort_by_key(|issue| return issue.id);

    let mut accepted: Vec<&Issue> = Vec::new();
    let mut conflicts: Vec<Conflict> = Vec::new();
    for candidate in candidates {
        match accepted.iter().find(|kept| return edits_collide(kept, candidate)) {
            None => accepted.push(candidate),
            Some(kept) => conflicts.push(Conflict { id: candidate.id, kept_id: kept.id }),
        }
    }

    let mut applied_ids: Vec<u32> = accepted.iter().map(|issue| return issue.id).collect();
    applied_ids.sort_unstable();

    accepted.sort_by(|a, b| return edit_span(b).start.cmp(&edit_span(a).start));
    let mut patched = text.to_string();
    for issue in &accepted {
        let Some(edit) = &issue.edit else {
            continue;
        };
        patched = splice(&patched, edit)?;
    }

    return Ok(BatchApplied { applied_ids, conflicts, text: patched });
}

/// Apply one issue's fix to `text`, returning the new text.
///
/// # Errors
///
/// Returns `Error::NotFixable` for report-only issues and
/// `Error::EditOutOfBounds` if the edit exceeds the text.
pub fn apply_one(text: &str, issue: &Issue) -> Result<String, Error> {
    let Some(edit) = &issue.edit else {
        return Err(Error::NotFixable { id: issue.id, rule: issue.kind.id().to_string() });
    };
    return splice(text, edit);
}

/// The edit span of an issue known to be fixable.
fn edit_span(issue: &Issue) -> Span {
    return issue.edit.as_ref().map_or(Span::empty_at(0), |edit| return edit.span);
}

/// Whether two fixable issues compete for the same bytes. Edits collide when
/// their spans intersect or merely share a start offset, so competing
/// insertions at one point conflict instead of landing in arbitrary order.
fn edits_collide(kept: &Issue, candidate: &Issue) -> bool {
    let a = edit_span(kept);
    let b = edit_span(candidate);
    return a.intersects(b) || a.start == b.start;
}

/// Replace `edit.span` in `text` with its replacement, immutably.
///
/// # Errors
///
/// Returns `Error::EditOutOfBounds` if the span exceeds the text or does not
/// fall on character boundaries.
fn splice(text: &str, edit: &FixEdit) -> Result<String, Error> {
    let (Some(head), Some(tail)) = (text.get(..edit.span.start), text.get(edit.span.end..)) else {
        return Err(Error::EditOutOfBounds {
            end: edit.span.end,
            len: text.len(),
            start: edit.span.start,
        });
    };
    let mut out = String::with_capacity(
        head.len().saturating_add(edit.replacement.len()).saturating_add(tail.len()),
    );
    out.push_str(head);
    out.push_str(&edit.replacement);
    out.push_str(tail);
    return Ok(out);
}
