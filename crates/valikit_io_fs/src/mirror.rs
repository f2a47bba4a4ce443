//! Filesystem tree traversal and mirror orchestration.

use std::fs;
use std::path::{Path, PathBuf};

use crate::report::{ReportMirror, ReportMirrorBuilder};
use crate::spec::{EnumMirrorTraversalMode, MirrorTreeError, SpecMirrorOptions};
use crate::util::{
    TypeMirrorPattern, compile_pattern, copy_file_with_metadata, ensure_destination_dir,
    is_name_matching, is_overlap,
};

#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: String,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: String,
}

#[derive(Debug)]
struct SpecMirrorContext {
    spec_mirror_options: SpecMirrorOptions,
    pattern_compiled: Option<TypeMirrorPattern>,
    builder_mirror_report: ReportMirrorBuilder,
}

/// Mirror files from `dir_source` into `dir_destination`.
///
/// Behavior is controlled by [`SpecMirrorOptions`], including:
/// - the basename pattern and its interpretation mode,
/// - the subdirectory descent policy,
/// - overwrite behavior for existing destination files,
/// - dry-run.
///
/// The relative directory structure of matched files is preserved; destination
/// directories are created one level at a time as the traversal descends.
/// Nothing is ever deleted.
///
/// Returns [`ReportMirror`] on completion; `cnt_copied` is the number of files
/// actually written. A source that is not a directory yields an empty report
/// plus a warning. Destination-init and file-copy failures abort the whole run
/// with [`MirrorTreeError`].
pub fn mirror_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_mirror_options: SpecMirrorOptions,
) -> Result<ReportMirror, MirrorTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    let pattern_compiled = compile_pattern(
        spec_mirror_options.pattern.as_deref(),
        spec_mirror_options.rule_pattern,
    )?;

    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(MirrorTreeError::SourceDestinationOverlap {
            source: path_dir_src,
            destination: path_dir_dst,
        });
    }

    if !spec_mirror_options.if_dry_run {
        ensure_destination_dir(&path_dir_dst)?;
    }

    let mut spec_mirror_ctx = SpecMirrorContext {
        spec_mirror_options,
        pattern_compiled,
        builder_mirror_report: ReportMirrorBuilder::default(),
    };

    if !path_dir_src.is_dir() {
        spec_mirror_ctx.builder_mirror_report.add_warning(format!(
            "Source is not a directory: {}",
            path_dir_src.display()
        ));
        return Ok(spec_mirror_ctx.builder_mirror_report.build());
    }

    _walk_directory(&path_dir_src, &path_dir_dst, &mut spec_mirror_ctx)?;
    Ok(spec_mirror_ctx.builder_mirror_report.build())
}

fn _walk_directory(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_mirror_ctx: &mut SpecMirrorContext,
) -> Result<(), MirrorTreeError> {
    if !spec_mirror_ctx.spec_mirror_options.if_dry_run {
        ensure_destination_dir(path_dir_dst)?;
    }

    let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
    let mut l_files: Vec<SpecFileEntry> = Vec::new();

    let iter_entries = match fs::read_dir(path_dir_src) {
        Ok(iter) => iter,
        Err(e) => {
            spec_mirror_ctx.builder_mirror_report.add_warning(format!(
                "Failed to read directory {} ({e})",
                path_dir_src.display()
            ));
            return Ok(());
        }
    };

    for _entry_res in iter_entries {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                spec_mirror_ctx.builder_mirror_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_dir_src.display()
                ));
                continue;
            }
        };

        let path_entry = entry.path();
        let c_name = entry.file_name().to_string_lossy().to_string();
        spec_mirror_ctx.builder_mirror_report.add_scanned();

        if path_entry.is_dir() {
            l_dirs.push(SpecDirEntry {
                path_dir_src_sub: path_entry,
                name_dir: c_name,
            });
        } else if path_entry.is_file() {
            l_files.push(SpecFileEntry {
                path_file_src: path_entry,
                name_file: c_name,
            });
        } else {
            spec_mirror_ctx
                .builder_mirror_report
                .add_warning(format!("Special file skipped: {}", path_entry.display()));
        }
    }

    l_dirs.sort_by(|a, b| a.name_dir.cmp(&b.name_dir));
    l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

    for _dir_entry in l_dirs {
        let b_should_descend = match spec_mirror_ctx.spec_mirror_options.rule_traversal {
            EnumMirrorTraversalMode::Unconditional => true,
            EnumMirrorTraversalMode::PatternGated => is_name_matching(
                &_dir_entry.name_dir,
                spec_mirror_ctx.pattern_compiled.as_ref(),
            ),
        };
        if !b_should_descend {
            continue;
        }

        let path_dir_dst_sub = path_dir_dst.join(&_dir_entry.name_dir);
        _walk_directory(&_dir_entry.path_dir_src_sub, &path_dir_dst_sub, spec_mirror_ctx)?;
    }

    for _file_entry in l_files {
        _handle_file_entry(_file_entry, path_dir_dst, spec_mirror_ctx)?;
    }

    Ok(())
}

fn _handle_file_entry(
    spec_file_entry: SpecFileEntry,
    path_dir_dst: &Path,
    spec_mirror_ctx: &mut SpecMirrorContext,
) -> Result<(), MirrorTreeError> {
    if !is_name_matching(
        &spec_file_entry.name_file,
        spec_mirror_ctx.pattern_compiled.as_ref(),
    ) {
        return Ok(());
    }
    spec_mirror_ctx.builder_mirror_report.add_matched();

    let path_file_dst = path_dir_dst.join(&spec_file_entry.name_file);
    if path_file_dst.is_dir() {
        return Err(MirrorTreeError::CopyFailed {
            path: spec_file_entry.path_file_src,
            message: format!("Destination is a directory: {}", path_file_dst.display()),
        });
    }
    if path_file_dst.exists() && !spec_mirror_ctx.spec_mirror_options.if_overwrite {
        spec_mirror_ctx.builder_mirror_report.add_skipped();
        return Ok(());
    }
    if spec_mirror_ctx.spec_mirror_options.if_dry_run {
        spec_mirror_ctx.builder_mirror_report.add_skipped();
        return Ok(());
    }

    copy_file_with_metadata(&spec_file_entry.path_file_src, &path_file_dst).map_err(|e| {
        MirrorTreeError::CopyFailed {
            path: spec_file_entry.path_file_src.clone(),
            message: e.to_string(),
        }
    })?;
    spec_mirror_ctx.builder_mirror_report.add_copied();
    Ok(())
}
