//! Mirror specification models and top-level error types.

use std::fmt;
use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for the basename pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMirrorPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

/// Subdirectory descent policy.
///
/// The basename pattern always filters which files are copied. This rule
/// controls whether it also filters which subdirectories are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMirrorTraversalMode {
    /// Descend into every subdirectory.
    Unconditional,
    /// Descend only into subdirectories whose own name matches the pattern.
    PatternGated,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `mirror_tree`.
#[derive(Debug, Clone)]
pub struct SpecMirrorOptions {
    /// Pattern applied to entry basenames at every depth; `None` matches all.
    pub pattern: Option<String>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumMirrorPatternMode,
    /// Subdirectory descent policy.
    pub rule_traversal: EnumMirrorTraversalMode,
    /// Replace destination files that already exist.
    pub if_overwrite: bool,
    /// Do not mutate the filesystem; record planned copies as skipped.
    pub if_dry_run: bool,
}

impl Default for SpecMirrorOptions {
    fn default() -> Self {
        Self {
            pattern: None,
            rule_pattern: EnumMirrorPatternMode::Glob,
            rule_traversal: EnumMirrorTraversalMode::Unconditional,
            if_overwrite: false,
            if_dry_run: false,
        }
    }
}

/// "Whole run failed" errors. A failure here aborts the remaining traversal;
/// there is no per-entry continue-on-error policy.
#[derive(Debug)]
pub enum MirrorTreeError {
    /// Invalid basename pattern.
    InvalidPattern(String),
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    SourceDestinationOverlap {
        /// Normalized source directory.
        source: PathBuf,
        /// Normalized destination directory.
        destination: PathBuf,
    },
    /// Destination directory creation failed or collided with a non-directory.
    DestinationInitFailed {
        /// Destination path that failed initialization.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
    /// A single file copy failed.
    CopyFailed {
        /// Source file that could not be copied.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
}

impl fmt::Display for MirrorTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern(msg) => write!(f, "{msg}"),
            Self::SourceDestinationOverlap {
                source,
                destination,
            } => write!(
                f,
                "Source and destination directories overlap: {} <-> {}",
                source.display(),
                destination.display()
            ),
            Self::DestinationInitFailed { path, message } => {
                write!(
                    f,
                    "Failed to initialize destination {}: {message}",
                    path.display()
                )
            }
            Self::CopyFailed { path, message } => {
                write!(f, "Failed to copy {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for MirrorTreeError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////
