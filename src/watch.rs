//! File watcher: checks a directory on startup, then re-checks when `.uc`
//! files change.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands;
use crate::error;
use crate::types::TierOverrides;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that sends events on the given channel.
///
/// Only create/modify/remove events touching a `.uc` file are forwarded.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|path| return is_uc_file(path))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::WatchSetup {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Whether a path carries the `.uc` extension, case-insensitively.
fn is_uc_file(path: &Path) -> bool {
    return path
        .extension()
        .is_some_and(|ext| return ext.eq_ignore_ascii_case("uc"));
}

/// Entry point for the watch command.
///
/// Runs an initial check over `dir`, then watches it recursively and
/// re-checks on changes.
///
/// # Errors
///
/// Returns errors from watcher setup.
pub fn run(dir: &Path, overrides: TierOverrides, format: &str) -> Result<ExitCode, error::Error> {
    let targets = vec![dir.to_path_buf()];

    eprintln!("watch: initial check");
    let mut last_code = run_check(&targets, overrides, format);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;
    watcher.watch(dir, RecursiveMode::Recursive).map_err(|e| {
        return error::Error::WatchSetup {
            reason: format!("cannot watch {}: {e}", dir.display()),
        };
    })?;

    eprintln!(
        "watch: monitoring {} for .uc changes, press Ctrl+C to stop",
        dir.display()
    );

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-checking...");
        last_code = run_check(&targets, overrides, format);
    }

    return Ok(last_code);
}

/// Run check once and print result. Returns the exit code from check.
fn run_check(targets: &[PathBuf], overrides: TierOverrides, format: &str) -> ExitCode {
    return match commands::check(targets, overrides, format) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(3_u8)
        },
    };
}
