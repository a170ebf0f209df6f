/// Crate-level error types for ucfix diagnostics.
use std::path::PathBuf;

/// All errors in ucfix carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, span, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `.ucfix.toml` exists but cannot be parsed in place.
    #[error("config parse failed: {}: {reason}", path.display())]
    ConfigParse {
        /// Path to the config file that failed to parse.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A fix edit points outside the current text.
    #[error("edit span {start}..{end} exceeds text length {len}")]
    EditOutOfBounds {
        /// Exclusive end offset of the edit span.
        end: usize,
        /// Length of the text the edit was applied to.
        len: usize,
        /// Start offset of the edit span.
        start: usize,
    },

    /// A referenced source file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Source file exceeds the size limit.
    #[error("file too large ({size_bytes} bytes, max {max_bytes}): {}", file.display())]
    FileTooLarge {
        /// File that exceeded the size limit.
        file: PathBuf,
        /// Maximum allowed file size in bytes.
        max_bytes: u64,
        /// Actual file size in bytes.
        size_bytes: u64,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// No issue with the requested id exists in the current list.
    #[error("no issue with id {id}")]
    IssueNotFound {
        /// The id that was requested.
        id: u32,
    },

    /// The selected issue is report-only and has no automatic fix.
    #[error("issue {id} ({rule}) is report-only and has no automatic fix")]
    NotFixable {
        /// Id of the report-only issue.
        id: u32,
        /// Rule id of the report-only issue.
        rule: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The named activation tier does not exist.
    #[error("unknown tier: `{name}`")]
    UnknownTier {
        /// Tier name that was not recognized.
        name: String,
    },

    /// The filesystem watcher could not be created or attached.
    #[error("watcher setup failed: {reason}")]
    WatchSetup {
        /// Description of the watcher failure.
        reason: String,
    },
}
