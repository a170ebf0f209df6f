use std::path::PathBuf;

use serde::Serialize;

use crate::config;
use crate::rules;
use crate::types::RuleKind;

/// UnrealScript documentation links surfaced by `info`.
const DOC_LINKS: &[(&str, &str)] = &[
    ("UnrealScript Home", "https://docs.unrealengine.com/udk/Three/UnrealScriptHome.html"),
    ("Language Reference", "https://docs.unrealengine.com/udk/Three/UnrealScriptReference.html"),
    ("DefaultProperties", "https://docs.unrealengine.com/udk/Three/UnrealScriptDefaultProperties.html"),
    ("Replication", "https://docs.unrealengine.com/udk/Three/ReplicationHome.html"),
    ("States", "https://docs.unrealengine.com/udk/Three/UnrealScriptStates.html"),
    ("Structs", "https://docs.unrealengine.com/udk/Three/UnrealScriptStructs.html"),
    ("Enums", "https://docs.unrealengine.com/udk/Three/UnrealScriptEnums.html"),
];

/// Output the comprehensive ucfix reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config_found: bool,
    extended_default: bool,
    paren_fixer_default: bool,
}

fn gather_state(root: &std::path::Path) -> CurrentState {
    let config_found = root.join(".ucfix.toml").exists();
    let tiers = config::Config::load(root)
        .map(|c| c.default_tiers())
        .unwrap_or_default();

    CurrentState {
        config_found,
        extended_default: tiers.extended,
        paren_fixer_default: tiers.paren_fixer,
    }
}

/// Whether a rule ever proposes an automatic fix.
fn rule_is_fixable(kind: RuleKind) -> bool {
    !matches!(kind, RuleKind::ExcessClosingBrace | RuleKind::UnbalancedParens)
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_rules();
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
    println!();
    print_markdown_doc_links();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# ucfix {version}

Find and repair common UnrealScript syntax defects — unbalanced braces and
parentheses, missing semicolons, unclosed blocks — without a full parser.

## Workflow

    ucfix check <path>...             Detect issues (exit 0 clean, 1 found)
    ucfix fix <file>                  Apply all automatic fixes, then rescan
    ucfix fix <file> --issue <id>     Apply one issue from the check listing
    ucfix fix <file> --output <path>  Write the fixed text elsewhere
    ucfix batch <dir> --out <dir>     Fix every .uc file into an output dir
    ucfix watch <dir>                 Re-check whenever a .uc file changes
    ucfix tier list                   Show default rule tiers
    ucfix tier enable <tier>          Persist a tier in .ucfix.toml

Tier flags `--extended` and `--paren-fixer` widen a single run;
`--strict-only` narrows it to the strict tier.

## Configuration (.ucfix.toml)

    include = [\"Src/\"]                # only scan these path prefixes
    exclude = [\"Src/ThirdParty/\"]     # skip these path prefixes

    [tiers]
    extended = true                   # run extended rules by default
    paren_fixer = false               # run the unmatched-( remover

"
    );
}

fn print_markdown_rules() {
    println!("## Rules");
    println!();
    println!("| Rule | Tier | Fix |");
    println!("|------|------|-----|");
    for rule in rules::REGISTRY {
        let fix = if rule_is_fixable(rule.kind) { "auto" } else { "report" };
        println!("| {} | {} | {fix} |", rule.kind.id(), rule.tier.label());
    }
    println!();
}

fn print_markdown_state(state: &CurrentState) {
    println!("## Current State");
    println!();
    if state.config_found {
        println!("Config:       .ucfix.toml (found)");
    } else {
        println!("Config:       .ucfix.toml (not found, defaults in effect)");
    }
    println!("Strict:       on (always)");
    println!("Extended:     {}", on_off(state.extended_default));
    println!("Paren-fixer:  {}", on_off(state.paren_fixer_default));
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success / no issues found |
| 1    | Issues found (check, fix) or file errors (batch) |
| 2    | Reserved |
| 3    | Runtime error |
"
    );
}

fn print_markdown_doc_links() {
    println!("## Documentation");
    println!();
    for (title, url) in DOC_LINKS {
        println!("- [{title}]({url})");
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    version: String,
    rules: Vec<RuleInfo>,
    exit_codes: Vec<ExitCodeInfo>,
    doc_links: Vec<DocLinkJson>,
    current_state: StateJson,
}

#[derive(Serialize)]
struct RuleInfo {
    rule: String,
    tier: String,
    fixable: bool,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct DocLinkJson {
    title: String,
    url: String,
}

#[derive(Serialize)]
struct StateJson {
    config_found: bool,
    extended_default: bool,
    paren_fixer_default: bool,
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        version: env!("CARGO_PKG_VERSION").to_string(),
        rules: rules::REGISTRY
            .iter()
            .map(|rule| RuleInfo {
                rule: rule.kind.id().to_string(),
                tier: rule.tier.label().to_string(),
                fixable: rule_is_fixable(rule.kind),
            })
            .collect(),
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success / no issues found".to_string() },
            ExitCodeInfo { code: 1, meaning: "Issues found or file errors".to_string() },
            ExitCodeInfo { code: 2, meaning: "Reserved".to_string() },
            ExitCodeInfo { code: 3, meaning: "Runtime error".to_string() },
        ],
        doc_links: DOC_LINKS
            .iter()
            .map(|(title, url)| DocLinkJson {
                title: (*title).to_string(),
                url: (*url).to_string(),
            })
            .collect(),
        current_state: StateJson {
            config_found: state.config_found,
            extended_default: state.extended_default,
            paren_fixer_default: state.paren_fixer_default,
        },
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn report_only_rules_are_marked_unfixable() {
        assert!(!rule_is_fixable(RuleKind::ExcessClosingBrace));
        assert!(!rule_is_fixable(RuleKind::UnbalancedParens));
        assert!(rule_is_fixable(RuleKind::MissingSemicolon));
        assert!(rule_is_fixable(RuleKind::UnmatchedOpenParen));
    }

    #[test]
    fn doc_links_point_at_udk_reference_pages() {
        assert_eq!(DOC_LINKS.len(), 7);
        for (_, url) in DOC_LINKS {
            assert!(url.starts_with("https://docs.unrealengine.com/udk/Three/"));
        }
    }
}
