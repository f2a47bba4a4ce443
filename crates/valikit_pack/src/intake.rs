//! Archive scan/unpack orchestration and packager invocation.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::report::{ReportIntake, ReportIntakeBuilder};
use crate::spec::{EnumArtifactKind, IntakeError, SpecArtifactVersion, SpecIntakeOptions};
use crate::util::{SpecArtifactPatterns, empty_directory, extract_archive};

#[derive(Debug, Clone)]
struct SpecArchiveEntry {
    path_archive: PathBuf,
    name_archive: String,
}

/// Consume the CI artifact archives found in `dir_archives`.
///
/// Scans the directory (non-recursive) for `*.zip` entries and, per archive:
/// - main OS image: capture version and architecture, delete the archive;
/// - SDK / DDK: empty the configured destination (best-effort), extract the
///   archive into it, delete the archive;
/// - anything else: leave untouched, record a warning.
///
/// Returns [`ReportIntake`] carrying counters and the captured version.
/// Fails with [`IntakeError::MissingOsArtifact`] when the scan finishes
/// without seeing a main OS archive, since no version can be derived for the
/// packager then.
pub fn intake_artifacts<P>(
    dir_archives: P,
    spec_intake_options: &SpecIntakeOptions,
) -> Result<ReportIntake, IntakeError>
where
    P: AsRef<Path>,
{
    let path_dir_archives = dir_archives.as_ref();
    let spec_artifact_patterns = SpecArtifactPatterns::new()?;
    let mut builder_intake_report = ReportIntakeBuilder::default();

    let l_archives = _collect_zip_entries(path_dir_archives)?;
    for _archive_entry in l_archives {
        builder_intake_report.add_scanned();

        let Some((enum_kind, spec_version)) =
            spec_artifact_patterns.classify_artifact(&_archive_entry.name_archive)
        else {
            builder_intake_report.add_warning(format!(
                "Unrecognized archive skipped: {}",
                _archive_entry.name_archive
            ));
            continue;
        };

        match enum_kind {
            EnumArtifactKind::Os => {
                if builder_intake_report.version.is_some() {
                    builder_intake_report.add_warning(format!(
                        "Duplicate OS archive ignored for version capture: {}",
                        _archive_entry.name_archive
                    ));
                }
                builder_intake_report.set_version(spec_version);
            }
            EnumArtifactKind::Sdk => {
                empty_directory(&spec_intake_options.path_dir_sdk, &mut builder_intake_report);
                extract_archive(
                    &_archive_entry.path_archive,
                    &spec_intake_options.path_dir_sdk,
                    &mut builder_intake_report,
                )?;
                builder_intake_report.add_unpacked();
            }
            EnumArtifactKind::Ddk => {
                empty_directory(&spec_intake_options.path_dir_ddk, &mut builder_intake_report);
                extract_archive(
                    &_archive_entry.path_archive,
                    &spec_intake_options.path_dir_ddk,
                    &mut builder_intake_report,
                )?;
                builder_intake_report.add_unpacked();
            }
        }

        fs::remove_file(&_archive_entry.path_archive).map_err(|e| IntakeError::RemoveFailed {
            path: _archive_entry.path_archive.clone(),
            message: e.to_string(),
        })?;
        builder_intake_report.add_removed();
    }

    if builder_intake_report.version.is_none() {
        return Err(IntakeError::MissingOsArtifact);
    }
    Ok(builder_intake_report.build())
}

/// Run the downstream makefile packager with the captured version.
///
/// Spawns `make package VALI_VERSION=<major>.<minor>.<patch>` with the
/// current environment (the makefile reads the `VALI_*` paths itself) and
/// waits for it. The exit status is returned to the caller, not interpreted.
pub fn invoke_packager(spec_version: &SpecArtifactVersion) -> Result<ExitStatus, IntakeError> {
    Command::new("make")
        .args(derive_packager_args(spec_version))
        .status()
        .map_err(|e| IntakeError::PackagerSpawnFailed {
            message: e.to_string(),
        })
}

/// Argument vector for the packager invocation.
pub fn derive_packager_args(spec_version: &SpecArtifactVersion) -> [String; 2] {
    [
        "package".to_string(),
        format!("VALI_VERSION={spec_version}"),
    ]
}

fn _collect_zip_entries(path_dir_archives: &Path) -> Result<Vec<SpecArchiveEntry>, IntakeError> {
    let iter_entries =
        fs::read_dir(path_dir_archives).map_err(|e| IntakeError::ArchiveDirUnreadable {
            path: path_dir_archives.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut l_archives: Vec<SpecArchiveEntry> = Vec::new();
    for _entry_res in iter_entries {
        let entry = _entry_res.map_err(|e| IntakeError::ArchiveDirUnreadable {
            path: path_dir_archives.to_path_buf(),
            message: e.to_string(),
        })?;

        let path_entry = entry.path();
        if !path_entry.is_file() {
            continue;
        }
        let c_name = entry.file_name().to_string_lossy().to_string();
        if !c_name.to_ascii_lowercase().ends_with(".zip") {
            continue;
        }
        l_archives.push(SpecArchiveEntry {
            path_archive: path_entry,
            name_archive: c_name,
        });
    }

    l_archives.sort_by(|a, b| a.name_archive.cmp(&b.name_archive));
    Ok(l_archives)
}
