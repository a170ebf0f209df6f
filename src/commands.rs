//! Core CLI commands for ucfix: check, fix, batch, info.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::batch::{BatchCoordinator, FileOutcome, collect_uc_files};
use crate::config;
use crate::document::{Document, FixSummary};
use crate::error;
use crate::report;
use crate::types::TierOverrides;

/// Fix every `.uc` file under `dir`, writing repaired copies into `out`.
///
/// Files are processed in isolation: one unreadable or unwritable file is
/// recorded as an error outcome and the rest still run.
///
/// # Errors
///
/// Returns errors from config loading.
pub fn batch(dir: &Path, out: &Path, overrides: TierOverrides) -> Result<ExitCode, error::Error> {
    let config = config::Config::load(dir)?;
    let tiers = config.default_tiers().with_overrides(&overrides);
    let files = collect_uc_files(dir, &config);

    let cancel = Arc::new(AtomicBool::new(false));
    let coordinator = BatchCoordinator::new(out, tiers, cancel);
    let outcomes = coordinator.run(&files);

    let mut error_count = 0_u32;
    for outcome in &outcomes {
        if outcome.error.is_some() {
            error_count = error_count.saturating_add(1);
        }
        print_batch_outcome(outcome);
    }

    let total = outcomes.len();
    println!();
    println!("{total} files processed, {error_count} errors");

    if error_count > 0 {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Scan the given files or directories and report every detected issue.
///
/// # Errors
///
/// Returns errors from config loading or file reading.
pub fn check(
    paths: &[PathBuf],
    overrides: TierOverrides,
    format: &str,
) -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let config = config::Config::load(&root)?;
    let tiers = config.default_tiers().with_overrides(&overrides);
    let targets = collect_targets(paths, &config);

    let mut docs: Vec<Document> = Vec::new();
    let mut total_issues = 0_usize;
    let mut files_with_issues = 0_usize;
    for target in &targets {
        let doc = Document::open(target, tiers)?;
        total_issues = total_issues.saturating_add(doc.issues().len());
        if !doc.issues().is_empty() {
            files_with_issues = files_with_issues.saturating_add(1);
        }
        docs.push(doc);
    }

    if format == "json" {
        let reports: Vec<report::FileReport> = docs
            .iter()
            .map(|doc| {
                return report::FileReport {
                    issues: report::entries(doc.current_text(), doc.issues()),
                    path: doc.path().display().to_string(),
                };
            })
            .collect();
        let json = serde_json::to_string_pretty(&reports).unwrap_or_default();
        println!("{json}");
    } else {
        for doc in &docs {
            if doc.issues().is_empty() {
                continue;
            }
            let display = doc.path().display().to_string();
            print!("{}", report::render_text(&display, doc.current_text(), doc.issues()));
        }
        if total_issues == 0 {
            let count = docs.len();
            println!("All {count} files clean");
        } else {
            println!();
            println!("{total_issues} issues in {files_with_issues} files");
        }
    }

    if total_issues > 0 {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Expand directory arguments into their `.uc` files; keep file arguments.
fn collect_targets(paths: &[PathBuf], config: &config::Config) -> Vec<PathBuf> {
    let mut targets: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            targets.extend(collect_uc_files(path, config));
        } else {
            targets.push(path.clone());
        }
    }
    return targets;
}

/// Apply automatic fixes in `file` under the enabled tiers, then save.
///
/// With `issue`, only that issue's fix is applied. Saving back to the
/// original path writes the one-time `<file>.bak` backup first. Issues still
/// open after the rescan are reported and exit 1.
///
/// # Errors
///
/// Returns errors from config loading, file reading, fix application, or
/// saving.
pub fn fix(
    file: &Path,
    output: Option<&Path>,
    issue: Option<u32>,
    overrides: TierOverrides,
) -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let config = config::Config::load(&root)?;
    let tiers = config.default_tiers().with_overrides(&overrides);

    let mut doc = Document::open(file, tiers)?;
    if doc.issues().is_empty() && issue.is_none() {
        println!("{}: no issues found", file.display());
        return Ok(ExitCode::SUCCESS);
    }

    let summary = match issue {
        None => doc.apply_all(None)?,
        Some(id) => {
            doc.apply_selected(id)?;
            FixSummary { applied: vec![id], conflicts: Vec::new() }
        },
    };
    if doc.needs_rescan() {
        doc.rescan();
    }

    for conflict in &summary.conflicts {
        eprintln!(
            "conflict: issue {} overlaps applied issue {}, skipped",
            conflict.id, conflict.kept_id
        );
    }

    let target = output.unwrap_or(file);
    if doc.is_dirty() || output.is_some() {
        doc.save(target)?;
    }

    let fixed = summary.applied.len();
    println!("Applied {fixed} fixes to {}", target.display());

    if !doc.issues().is_empty() {
        println!();
        let display = target.display().to_string();
        print!("{}", report::render_text(&display, doc.current_text(), doc.issues()));
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Output a comprehensive reference document for ucfix.
pub fn info(json: bool) {
    return crate::info::run(json);
}

/// Print one batch outcome line, column-aligned by status label.
fn print_batch_outcome(outcome: &FileOutcome) {
    let name = outcome.path.display();
    if let Some(reason) = &outcome.error {
        println!("ERROR   {name} ({reason})");
        return;
    }
    let label = if outcome.fixed_count > 0 { "FIXED" } else { "CLEAN" };
    let digest = outcome
        .output_digest
        .as_ref()
        .map_or(String::new(), |d| return format!("  sha256:{}", d.short()));
    println!(
        "{label}   {name} ({} fixed, {} remaining){digest}",
        outcome.fixed_count, outcome.remaining_issue_count,
    );
    return;
}
