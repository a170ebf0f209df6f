//! Batch repair: the open → fix → rescan → save pipeline over many files,
//! with per-file isolation and a cancellation flag honored between files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sha2::{Digest as _, Sha256};
use walkdir::WalkDir;

use crate::config::Config;
use crate::document::Document;
use crate::error::Error;
use crate::types::{ContentDigest, IssueStatus, TierSet};

/// Drives the fix pipeline over a set of files, one at a time.
pub struct BatchCoordinator {
    /// Checked between files; set by an embedder to stop early.
    cancel: Arc<AtomicBool>,
    /// Directory fixed copies are written into.
    out_dir: PathBuf,
    /// Tiers used for detection in every file.
    tiers: TierSet,
}

impl BatchCoordinator {
    /// Create a coordinator writing fixed copies into `out_dir`.
    pub fn new(out_dir: &Path, tiers: TierSet, cancel: Arc<AtomicBool>) -> Self {
        return Self {
            cancel,
            out_dir: out_dir.to_path_buf(),
            tiers,
        };
    }

    /// Fix one file and save the result under the output directory.
    ///
    /// # Errors
    ///
    /// Returns open, apply, or save errors; the caller records them in the
    /// file's outcome without stopping the run.
    fn process_file(&self, path: &Path) -> Result<FileOutcome, Error> {
        let mut document = Document::open(path, self.tiers)?;
        let summary = document.apply_all(None)?;
        document.rescan();

        let Some(name) = path.file_name() else {
            return Err(Error::FileNotFound { path: path.to_path_buf() });
        };
        std::fs::create_dir_all(&self.out_dir)?;
        let target = self.out_dir.join(name);
        document.save(&target)?;

        let remaining = document
            .issues()
            .iter()
            .filter(|issue| return issue.status == IssueStatus::Open)
            .count();
        return Ok(FileOutcome {
            error: None,
            fixed_count: summary.applied.len(),
            output_digest: Some(digest_of(document.current_text())),
            path: path.to_path_buf(),
            remaining_issue_count: remaining,
        });
    }

    /// Run the pipeline over `files`. Each file is processed independently;
    /// a failure lands in that file's outcome and the run continues.
    /// Cancellation is honored between files, never mid-file, so already
    /// saved outputs stay saved.
    pub fn run(&self, files: &[PathBuf]) -> Vec<FileOutcome> {
        let mut outcomes: Vec<FileOutcome> = Vec::new();
        for file in files {
            if self.cancel.load(Ordering::SeqCst) {
                break;
            }
            let outcome = match self.process_file(file) {
                Err(e) => FileOutcome {
                    error: Some(e.to_string()),
                    fixed_count: 0,
                    output_digest: None,
                    path: file.clone(),
                    remaining_issue_count: 0,
                },
                Ok(outcome) => outcome,
            };
            outcomes.push(outcome);
        }
        return outcomes;
    }
}

/// The result of one file's trip through the pipeline.
#[derive(Debug)]
pub struct FileOutcome {
    /// The failure that stopped this file, if any.
    pub error: Option<String>,
    /// Number of fixes applied.
    pub fixed_count: usize,
    /// Digest of the saved output, for provenance. `None` on error.
    pub output_digest: Option<ContentDigest>,
    /// The source file this outcome describes.
    pub path: PathBuf,
    /// Issues still open after the post-fix rescan.
    pub remaining_issue_count: usize,
}

/// Collect every `.uc` file under `root` that the config includes, sorted
/// for a deterministic processing order.
pub fn collect_uc_files(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
        .filter(|e| {
            return e
                .path()
                .extension()
                .is_some_and(|ext| return ext.eq_ignore_ascii_case("uc"));
        })
    {
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !config.should_scan(&relative.to_string_lossy()) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    return files;
}

/// SHA-256 of the saved output text, lowercase hex.
fn digest_of(text: &str) -> ContentDigest {
    let hash = Sha256::digest(text.as_bytes());
    return ContentDigest(format!("{hash:x}"));
}
