//! Document state: one file's text buffers, issue list, and backup-once
//! saving.

use std::path::{Path, PathBuf};

use crate::apply::{self, Conflict};
use crate::detect;
use crate::error::Error;
use crate::types::{Issue, IssueStatus, Tier, TierSet};

/// Maximum source file size accepted by [`Document::open`] (16 MiB).
const MAX_FILE_SIZE: u64 = 16_777_216;

/// One opened source file: its open-time text, current text, issue list, and
/// save state.
#[derive(Debug)]
pub struct Document {
    /// Whether the one-time backup already happened for this document.
    backup_written: bool,
    /// The text all current issue spans refer to.
    current_text: String,
    /// Whether `current_text` has unsaved changes.
    dirty: bool,
    /// Issues from the most recent detection run.
    issues: Vec<Issue>,
    /// Set by every successful apply; cleared only by `rescan`.
    must_rescan: bool,
    /// The text as read at open time. Never mutated.
    original_text: String,
    /// The file this document was opened from.
    path: PathBuf,
    /// Tiers used for every detection run on this document.
    tiers: TierSet,
}

/// Ids applied and conflicts skipped by one `apply_all` pass.
#[derive(Debug)]
pub struct FixSummary {
    /// Issue ids whose edits landed, ascending.
    pub applied: Vec<u32>,
    /// Fixes skipped because they collided with an accepted edit.
    pub conflicts: Vec<Conflict>,
}

impl Document {
    /// Apply every fixable open issue, optionally restricted to one tier.
    ///
    /// After a successful apply the remaining issues are stale until
    /// [`Document::rescan`] renumbers a fresh list.
    ///
    /// # Errors
    ///
    /// Returns `Error::EditOutOfBounds` if an accepted edit exceeds the text.
    pub fn apply_all(&mut self, tier: Option<Tier>) -> Result<FixSummary, Error> {
        let selected: Vec<Issue> = self
            .issues
            .iter()
            .filter(|issue| return issue.status == IssueStatus::Open)
            .filter(|issue| return tier.is_none_or(|wanted| return issue.tier == wanted))
            .cloned()
            .collect();
        let outcome = apply::apply_many(&self.current_text, &selected)?;
        if !outcome.applied_ids.is_empty() {
            self.current_text = outcome.text;
            self.dirty = true;
            self.must_rescan = true;
            self.mark_applied(&outcome.applied_ids);
        }
        return Ok(FixSummary { applied: outcome.applied_ids, conflicts: outcome.conflicts });
    }

    /// Apply exactly one issue's fix by id.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` for unknown ids, `Error::NotFixable`
    /// for report-only issues, and apply errors otherwise.
    pub fn apply_selected(&mut self, id: u32) -> Result<(), Error> {
        let Some(issue) = self.issues.iter().find(|issue| return issue.id == id).cloned() else {
            return Err(Error::IssueNotFound { id });
        };
        self.current_text = apply::apply_one(&self.current_text, &issue)?;
        self.dirty = true;
        self.must_rescan = true;
        self.mark_applied(&[id]);
        return Ok(());
    }

    /// The text all current issue spans refer to.
    pub fn current_text(&self) -> &str {
        return &self.current_text;
    }

    /// Whether the text has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        return self.dirty;
    }

    /// The issues from the most recent detection or apply pass.
    pub fn issues(&self) -> &[Issue] {
        return &self.issues;
    }

    /// Flag applied issues Fixed and every other issue Stale.
    fn mark_applied(&mut self, applied: &[u32]) {
        for issue in &mut self.issues {
            if applied.contains(&issue.id) {
                issue.status = IssueStatus::Fixed;
            } else {
                issue.status = IssueStatus::Stale;
            }
        }
        return;
    }

    /// Whether the issue list is stale relative to the current text.
    pub fn needs_rescan(&self) -> bool {
        return self.must_rescan;
    }

    /// Read `path` and run the initial detection under `tiers`.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` for missing files, `Error::FileTooLarge`
    /// past the size limit, and `Error::Io` for other read failures.
    pub fn open(path: &Path, tiers: TierSet) -> Result<Self, Error> {
        let metadata = match std::fs::metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(metadata) => metadata,
        };
        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::FileTooLarge {
                file: path.to_path_buf(),
                max_bytes: MAX_FILE_SIZE,
                size_bytes: metadata.len(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let issues = detect::detect(&text, tiers);
        return Ok(Self {
            backup_written: false,
            current_text: text.clone(),
            dirty: false,
            issues,
            must_rescan: false,
            original_text: text,
            path: path.to_path_buf(),
            tiers,
        });
    }

    /// The file this document was opened from.
    pub fn path(&self) -> &Path {
        return &self.path;
    }

    /// Re-run detection on the current text and swap in the fresh list whole.
    /// Ids restart at 1.
    pub fn rescan(&mut self) {
        self.issues = detect::detect(&self.current_text, self.tiers);
        self.must_rescan = false;
        return;
    }

    /// Write the current text to `target`.
    ///
    /// Saving back to the document's own path writes the open-time text to
    /// `<path>.bak` first — once per document, and never over a backup that
    /// already exists on disk, so the backup keeps the earliest version.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the backup or the target cannot be written.
    pub fn save(&mut self, target: &Path) -> Result<(), Error> {
        if target == self.path && !self.backup_written && self.current_text != self.original_text
        {
            let backup = backup_path(&self.path);
            if !backup.exists() {
                std::fs::write(&backup, &self.original_text)?;
            }
            self.backup_written = true;
        }
        std::fs::write(target, &self.current_text)?;
        self.dirty = false;
        return Ok(());
    }
}

/// The sibling `.bak` path for a source file.
fn backup_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".bak");
    return PathBuf::from(os);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    /// Write a file under a fresh tempdir and return the guard and path.
    fn fixture(name: &str, text: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        return (dir, path);
    }

    #[test]
    fn open_runs_initial_detection() {
        let (_dir, path) = fixture("A.uc", "var int Health\n");
        let doc = Document::open(&path, TierSet::strict_only()).unwrap();
        assert_eq!(doc.issues().len(), 1);
        assert!(!doc.is_dirty());
        assert!(!doc.needs_rescan());
        assert_eq!(doc.path(), path.as_path());
    }

    #[test]
    fn apply_marks_remaining_issues_stale_until_rescan() {
        let (_dir, path) = fixture("A.uc", "var int A\nx = (1\n");
        let mut doc = Document::open(&path, TierSet::strict_only()).unwrap();
        let summary = doc.apply_all(None).unwrap();
        assert_eq!(summary.applied.len(), 1);
        assert!(doc.needs_rescan());
        assert!(doc.issues().iter().any(|issue| return issue.status == IssueStatus::Stale));
        doc.rescan();
        assert!(!doc.needs_rescan());
        assert!(doc.issues().iter().all(|issue| return issue.status == IssueStatus::Open));
    }

    #[test]
    fn apply_selected_fixes_exactly_one_issue() {
        let (_dir, path) = fixture("A.uc", "var int A\nvar int B\n");
        let mut doc = Document::open(&path, TierSet::strict_only()).unwrap();
        doc.apply_selected(2).unwrap();
        assert_eq!(doc.current_text(), "var int A\nvar int B;\n");
        assert!(matches!(doc.apply_selected(9), Err(Error::IssueNotFound { .. })));
    }

    #[test]
    fn backup_is_written_once_and_keeps_the_first_version() {
        let original = "var int A\nvar int B\n";
        let (_dir, path) = fixture("A.uc", original);
        let backup = PathBuf::from(format!("{}.bak", path.display()));

        let mut doc = Document::open(&path, TierSet::strict_only()).unwrap();
        doc.apply_selected(1).unwrap();
        doc.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), original);

        doc.rescan();
        doc.apply_selected(1).unwrap();
        doc.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), original);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "var int A;\nvar int B;\n");
    }

    #[test]
    fn saving_elsewhere_never_writes_a_backup() {
        let (dir, path) = fixture("A.uc", "var int A\n");
        let mut doc = Document::open(&path, TierSet::strict_only()).unwrap();
        doc.apply_all(None).unwrap();
        let out = dir.path().join("out.uc");
        doc.save(&out).unwrap();
        assert!(!PathBuf::from(format!("{}.bak", path.display())).exists());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "var int A;\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "var int A\n");
    }

    #[test]
    fn unchanged_text_saves_without_backup() {
        let (_dir, path) = fixture("A.uc", "var int A;\n");
        let mut doc = Document::open(&path, TierSet::strict_only()).unwrap();
        assert!(doc.issues().is_empty());
        doc.save(&path).unwrap();
        assert!(!PathBuf::from(format!("{}.bak", path.display())).exists());
    }

    #[test]
    fn missing_file_is_a_not_found_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.uc");
        assert!(matches!(
            Document::open(&path, TierSet::strict_only()),
            Err(Error::FileNotFound { .. })
        ));
    }
}
