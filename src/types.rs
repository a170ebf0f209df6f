//! Core domain types for ucfix: spans, tiers, rules, issues, and fixes.

/// A SHA-256 content digest, 64 lowercase hex chars.
/// Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDigest(
    /// The hex-encoded digest string.
    pub String,
);

impl ContentDigest {
    /// Abbreviated digest for one-line reports.
    pub fn short(&self) -> &str {
        return self.0.get(..12).unwrap_or(&self.0);
    }
}

/// A single text edit: replace the bytes in `span` with `replacement`.
/// An empty span is a pure insertion; an empty replacement is a deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixEdit {
    /// Text that replaces the span contents.
    pub replacement: String,
    /// Byte range to replace in the current text.
    pub span: Span,
}

/// A detected syntax problem, numbered within one detection run.
#[derive(Debug, Clone)]
pub struct Issue {
    /// The proposed repair, or `None` when the rule is report-only.
    pub edit: Option<FixEdit>,
    /// Sequential id, starting at 1 for each detection run.
    pub id: u32,
    /// Which rule produced this issue.
    pub kind: RuleKind,
    /// Human-readable description of the problem.
    pub message: String,
    /// Byte range the issue points at in the current text.
    pub span: Span,
    /// Lifecycle state relative to the current text.
    pub status: IssueStatus,
    /// Activation tier of the producing rule.
    pub tier: Tier,
}

impl Issue {
    /// Whether this issue carries an automatic fix.
    pub fn is_fixable(&self) -> bool {
        return self.edit.is_some();
    }
}

/// Lifecycle state of an issue relative to the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatus {
    /// The issue's fix has been applied to the text.
    Fixed,
    /// The issue describes the current text.
    Open,
    /// The text changed since detection; positions are untrusted.
    Stale,
}

impl IssueStatus {
    /// Lowercase label used in reports.
    pub fn label(self) -> &'static str {
        return match self {
            IssueStatus::Fixed => "fixed",
            IssueStatus::Open => "open",
            IssueStatus::Stale => "stale",
        };
    }
}

/// The closed set of detection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// A `}` that closes no open block.
    ExcessClosingBrace,
    /// A control statement header one `)` short of closing.
    MissingClosingParen,
    /// A `cpptext` header with no opening `{`.
    MissingCpptextBrace,
    /// A `defaultproperties` keyword without its block.
    MissingDefaultPropertiesBrace,
    /// A declaration or assignment lacking its trailing `;`.
    MissingSemicolon,
    /// More `{` than `}` in code context.
    UnbalancedBraces,
    /// A global imbalance between `(` and `)`.
    UnbalancedParens,
    /// A `struct` or `enum` block that never closes.
    UnclosedStructOrEnum,
    /// A `)` at paren depth zero.
    UnmatchedCloseParen,
    /// A `(` still open at the next declaration or end of file.
    UnmatchedOpenParen,
}

impl RuleKind {
    /// Stable kebab-case rule id used in reports.
    pub fn id(self) -> &'static str {
        return match self {
            RuleKind::ExcessClosingBrace => "brace-extra-close",
            RuleKind::MissingClosingParen => "paren-control-close",
            RuleKind::MissingCpptextBrace => "cpptext-brace",
            RuleKind::MissingDefaultPropertiesBrace => "defaultprops-brace",
            RuleKind::MissingSemicolon => "semicolon-missing",
            RuleKind::UnbalancedBraces => "brace-balance",
            RuleKind::UnbalancedParens => "paren-balance",
            RuleKind::UnclosedStructOrEnum => "struct-enum-close",
            RuleKind::UnmatchedCloseParen => "paren-extra-close",
            RuleKind::UnmatchedOpenParen => "paren-extra-open",
        };
    }
}

/// A half-open byte range `[start, end)` into the current text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Exclusive end offset.
    pub end: usize,
    /// Inclusive start offset.
    pub start: usize,
}

impl Span {
    /// Whether `offset` falls inside the span.
    pub fn contains(self, offset: usize) -> bool {
        return offset >= self.start && offset < self.end;
    }

    /// A zero-length span marking an insertion point.
    pub fn empty_at(offset: usize) -> Self {
        return Self { end: offset, start: offset };
    }

    /// Whether the byte ranges intersect. A zero-length span intersects only
    /// spans that strictly contain its position.
    pub fn intersects(self, other: Self) -> bool {
        return self.start < other.end && other.start < self.end;
    }

    /// Construct a span from `start` (inclusive) to `end` (exclusive).
    pub fn new(start: usize, end: usize) -> Self {
        return Self { end, start };
    }
}

/// Activation tier controlling which rules run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Conservative heuristics, enabled by opt-in.
    Extended,
    /// Deterministic checks, always enabled.
    Strict,
    /// The standalone unmatched-`(` remover.
    UnmatchedParenFixer,
}

impl Tier {
    /// Lowercase label used in reports and the tier CLI.
    pub fn label(self) -> &'static str {
        return match self {
            Tier::Extended => "extended",
            Tier::Strict => "strict",
            Tier::UnmatchedParenFixer => "paren-fixer",
        };
    }
}

/// Command-line tier adjustments layered over the configured defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct TierOverrides {
    /// Force-enable the extended tier.
    pub extended: bool,
    /// Force-enable the unmatched-paren fixer tier.
    pub paren_fixer: bool,
    /// Ignore configured defaults and run strict rules only.
    pub strict_only: bool,
}

/// The set of tiers enabled for a detection run. Strict is always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierSet {
    /// Whether extended rules run.
    pub extended: bool,
    /// Whether the unmatched-paren fixer runs.
    pub paren_fixer: bool,
}

impl TierSet {
    /// Whether rules of `tier` should run under this set.
    pub fn enables(self, tier: Tier) -> bool {
        return match tier {
            Tier::Extended => self.extended,
            Tier::Strict => true,
            Tier::UnmatchedParenFixer => self.paren_fixer,
        };
    }

    /// Strict rules only.
    pub fn strict_only() -> Self {
        return Self::default();
    }

    /// Layer command-line flags over this set.
    pub fn with_overrides(self, overrides: &TierOverrides) -> Self {
        if overrides.strict_only {
            return Self::strict_only();
        }
        return Self {
            extended: self.extended || overrides.extended,
            paren_fixer: self.paren_fixer || overrides.paren_fixer,
        };
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn strict_only_override_drops_configured_tiers() {
        let configured = TierSet { extended: true, paren_fixer: true };
        let overrides = TierOverrides { extended: false, paren_fixer: false, strict_only: true };
        assert_eq!(configured.with_overrides(&overrides), TierSet::strict_only());
    }

    #[test]
    fn flag_overrides_add_to_configured_tiers() {
        let configured = TierSet { extended: false, paren_fixer: false };
        let overrides = TierOverrides { extended: true, paren_fixer: false, strict_only: false };
        let effective = configured.with_overrides(&overrides);
        assert!(effective.extended);
        assert!(!effective.paren_fixer);
        assert!(effective.enables(Tier::Strict));
        assert!(effective.enables(Tier::Extended));
        assert!(!effective.enables(Tier::UnmatchedParenFixer));
    }

    #[test]
    fn insertion_points_intersect_only_strict_interiors() {
        assert!(Span::empty_at(3).intersects(Span::new(0, 9)));
        assert!(!Span::empty_at(3).intersects(Span::new(3, 9)));
        assert!(!Span::empty_at(3).intersects(Span::new(0, 3)));
        assert!(!Span::empty_at(3).intersects(Span::empty_at(3)));
    }

    #[test]
    fn digest_short_truncates_to_twelve_chars() {
        let digest = ContentDigest("abcdef0123456789".to_string());
        assert_eq!(digest.short(), "abcdef012345");
    }
}
