use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{EnumMirrorPatternMode, MirrorTreeError};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

/// Compiled form of the basename pattern.
#[derive(Debug, Clone)]
pub(crate) enum TypeMirrorPattern {
    Literal(String),
    Glob(GlobMatcher),
    Regex(Regex),
}

/// Compile the raw pattern option into its matcher form.
///
/// `None` and the catch-all glob `*` both compile to `None`: every basename
/// matches.
pub(crate) fn compile_pattern(
    pattern: Option<&str>,
    rule_pattern: EnumMirrorPatternMode,
) -> Result<Option<TypeMirrorPattern>, MirrorTreeError> {
    let Some(pattern) = pattern else {
        return Ok(None);
    };
    if rule_pattern == EnumMirrorPatternMode::Glob && pattern == "*" {
        return Ok(None);
    }

    match rule_pattern {
        EnumMirrorPatternMode::Literal => {
            Ok(Some(TypeMirrorPattern::Literal(pattern.to_string())))
        }
        EnumMirrorPatternMode::Glob => {
            let matcher = Glob::new(pattern)
                .map_err(|e| MirrorTreeError::InvalidPattern(format!("Invalid pattern: {e}")))?
                .compile_matcher();
            Ok(Some(TypeMirrorPattern::Glob(matcher)))
        }
        EnumMirrorPatternMode::Regex => {
            let regex = Regex::new(pattern)
                .map_err(|e| MirrorTreeError::InvalidPattern(format!("Invalid pattern: {e}")))?;
            Ok(Some(TypeMirrorPattern::Regex(regex)))
        }
    }
}

/// Basename predicate, independent of traversal logic.
pub(crate) fn is_name_matching(value: &str, pattern: Option<&TypeMirrorPattern>) -> bool {
    match pattern {
        None => true,
        Some(TypeMirrorPattern::Literal(p)) => value.contains(p),
        Some(TypeMirrorPattern::Glob(p)) => p.is_match(value),
        Some(TypeMirrorPattern::Regex(p)) => p.is_match(value),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved) || src_resolved.starts_with(&dst_resolved)
}

/// Create one destination directory level if absent.
///
/// An existing non-directory at `path_dir_dst`, or a create failure, aborts
/// the whole run.
pub(crate) fn ensure_destination_dir(path_dir_dst: &Path) -> Result<(), MirrorTreeError> {
    match fs::metadata(path_dir_dst) {
        Ok(meta_dst) => {
            if meta_dst.is_dir() {
                return Ok(());
            }
            Err(MirrorTreeError::DestinationInitFailed {
                path: path_dir_dst.to_path_buf(),
                message: "Path exists and is not a directory".to_string(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir(path_dir_dst).map_err(|e| MirrorTreeError::DestinationInitFailed {
                path: path_dir_dst.to_path_buf(),
                message: e.to_string(),
            })
        }
        Err(e) => Err(MirrorTreeError::DestinationInitFailed {
            path: path_dir_dst.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileCopy

pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    #[cfg(target_os = "linux")]
    {
        apply_metadata_linux(path_file_src, path_file_dst)?;
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn apply_metadata_linux(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{TypeMirrorPattern, compile_pattern, is_name_matching};
    use crate::spec::EnumMirrorPatternMode;

    #[test]
    fn compile_pattern_catch_all_glob_is_none() {
        let compiled =
            compile_pattern(Some("*"), EnumMirrorPatternMode::Glob).expect("compile glob");
        assert!(compiled.is_none());
        assert!(is_name_matching("anything.bin", compiled.as_ref()));
    }

    #[test]
    fn compile_pattern_regex_star_is_not_catch_all() {
        let compiled =
            compile_pattern(Some("a*"), EnumMirrorPatternMode::Regex).expect("compile regex");
        assert!(matches!(compiled, Some(TypeMirrorPattern::Regex(_))));
    }

    #[test]
    fn is_name_matching_glob_extension() {
        let compiled =
            compile_pattern(Some("*.h"), EnumMirrorPatternMode::Glob).expect("compile glob");
        assert!(is_name_matching("driver.h", compiled.as_ref()));
        assert!(!is_name_matching("driver.c", compiled.as_ref()));
    }

    #[test]
    fn is_name_matching_literal_is_substring() {
        let compiled = compile_pattern(Some("vali"), EnumMirrorPatternMode::Literal)
            .expect("compile literal");
        assert!(is_name_matching("vali-sdk.zip", compiled.as_ref()));
        assert!(is_name_matching("prevali", compiled.as_ref()));
        assert!(!is_name_matching("other.zip", compiled.as_ref()));
    }

    #[test]
    fn compile_pattern_invalid_inputs_rejected() {
        assert!(compile_pattern(Some("["), EnumMirrorPatternMode::Glob).is_err());
        assert!(compile_pattern(Some("("), EnumMirrorPatternMode::Regex).is_err());
    }
}
