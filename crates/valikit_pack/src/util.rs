use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;

use crate::report::ReportIntakeBuilder;
use crate::spec::{EnumArtifactKind, IntakeError, SpecArtifactVersion};

////////////////////////////////////////////////////////////////////////////////
// #region ArtifactNaming

// CI artifact naming convention: <prefix>-<major>.<minor>.<patch>-<arch>.zip.
const C_PATTERN_OS: &str = r"(?i)^vali-([0-9]+)\.([0-9]+)\.([0-9]+)-([0-9a-zA-Z]+)\.zip$";
const C_PATTERN_SDK: &str = r"(?i)^vali-sdk-([0-9]+)\.([0-9]+)\.([0-9]+)-([0-9a-zA-Z]+)\.zip$";
const C_PATTERN_DDK: &str = r"(?i)^vali-ddk-([0-9]+)\.([0-9]+)\.([0-9]+)-([0-9a-zA-Z]+)\.zip$";

/// Compiled artifact-name matchers.
#[derive(Debug, Clone)]
pub(crate) struct SpecArtifactPatterns {
    regex_os: Regex,
    regex_sdk: Regex,
    regex_ddk: Regex,
}

impl SpecArtifactPatterns {
    pub(crate) fn new() -> Result<Self, IntakeError> {
        Ok(Self {
            regex_os: _compile(C_PATTERN_OS)?,
            regex_sdk: _compile(C_PATTERN_SDK)?,
            regex_ddk: _compile(C_PATTERN_DDK)?,
        })
    }

    /// Resolve an archive basename to its artifact kind and version.
    ///
    /// Names outside the convention return `None` and are left untouched by
    /// the intake.
    pub(crate) fn classify_artifact(
        &self,
        name_archive: &str,
    ) -> Option<(EnumArtifactKind, SpecArtifactVersion)> {
        let l_matchers = [
            (EnumArtifactKind::Os, &self.regex_os),
            (EnumArtifactKind::Sdk, &self.regex_sdk),
            (EnumArtifactKind::Ddk, &self.regex_ddk),
        ];
        for (enum_kind, regex) in l_matchers {
            if let Some(caps) = regex.captures(name_archive) {
                return Some((enum_kind, _parse_version_captures(&caps)?));
            }
        }
        None
    }
}

fn _compile(pattern: &str) -> Result<Regex, IntakeError> {
    Regex::new(pattern)
        .map_err(|e| IntakeError::InvalidPattern(format!("Invalid artifact pattern: {e}")))
}

fn _parse_version_captures(caps: &regex::Captures<'_>) -> Option<SpecArtifactVersion> {
    Some(SpecArtifactVersion {
        major: caps.get(1)?.as_str().parse().ok()?,
        minor: caps.get(2)?.as_str().parse().ok()?,
        patch: caps.get(3)?.as_str().parse().ok()?,
        arch: caps.get(4)?.as_str().to_string(),
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DirectoryMaintenance

/// Best-effort emptying of an unpack destination.
///
/// Per-entry removal failures become warnings and the sweep continues; a
/// missing or unreadable directory is not an error.
pub(crate) fn empty_directory(path_dir: &Path, builder_intake_report: &mut ReportIntakeBuilder) {
    let iter_entries = match fs::read_dir(path_dir) {
        Ok(iter) => iter,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return,
        Err(e) => {
            builder_intake_report.add_warning(format!(
                "Failed to read directory {} ({e})",
                path_dir.display()
            ));
            return;
        }
    };

    for _entry_res in iter_entries {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                builder_intake_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_dir.display()
                ));
                continue;
            }
        };

        let path_entry = entry.path();
        let res_remove = if path_entry.is_dir() {
            fs::remove_dir_all(&path_entry)
        } else {
            fs::remove_file(&path_entry)
        };
        if let Err(e) = res_remove {
            builder_intake_report
                .add_warning(format!("Failed to remove {} ({e})", path_entry.display()));
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ArchiveExtraction

/// Extract a zip archive into `path_dir_dst`, creating it if absent.
///
/// Entry names that escape the destination are skipped with a warning.
/// Returns the number of file entries written; any other failure aborts the
/// intake.
pub(crate) fn extract_archive(
    path_zip: &Path,
    path_dir_dst: &Path,
    builder_intake_report: &mut ReportIntakeBuilder,
) -> Result<u64, IntakeError> {
    let _extract_error = |message: String| IntakeError::ExtractFailed {
        path: path_zip.to_path_buf(),
        message,
    };

    fs::create_dir_all(path_dir_dst).map_err(|e| _extract_error(e.to_string()))?;

    let file_zip = fs::File::open(path_zip).map_err(|e| _extract_error(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file_zip).map_err(|e| _extract_error(e.to_string()))?;

    let mut cnt_written: u64 = 0;
    for n_idx in 0..archive.len() {
        let mut file_in_zip = archive
            .by_index(n_idx)
            .map_err(|e| _extract_error(e.to_string()))?;
        let Some(path_entry_rel) = file_in_zip.enclosed_name() else {
            builder_intake_report.add_warning(format!(
                "Unsafe archive entry skipped: {} ({})",
                file_in_zip.name(),
                path_zip.display()
            ));
            continue;
        };

        let path_entry_dst = path_dir_dst.join(path_entry_rel);
        if file_in_zip.is_dir() {
            fs::create_dir_all(&path_entry_dst).map_err(|e| _extract_error(e.to_string()))?;
            continue;
        }

        if let Some(path_parent_dst) = path_entry_dst.parent() {
            fs::create_dir_all(path_parent_dst).map_err(|e| _extract_error(e.to_string()))?;
        }
        let mut file_dst =
            fs::File::create(&path_entry_dst).map_err(|e| _extract_error(e.to_string()))?;
        io::copy(&mut file_in_zip, &mut file_dst).map_err(|e| _extract_error(e.to_string()))?;
        cnt_written += 1;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(n_mode) = file_in_zip.unix_mode() {
                let _ = fs::set_permissions(&path_entry_dst, fs::Permissions::from_mode(n_mode));
            }
        }
    }

    Ok(cnt_written)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use zip::write::SimpleFileOptions;

    use super::{SpecArtifactPatterns, empty_directory, extract_archive};
    use crate::report::ReportIntakeBuilder;
    use crate::spec::EnumArtifactKind;

    struct TestDir {
        path: PathBuf,
    }

    impl TestDir {
        fn new() -> Self {
            let n = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos();
            let path = std::env::temp_dir().join(format!("valikit_pack_test_{n}"));
            std::fs::create_dir_all(&path).expect("create test dir");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    fn write_zip(path_zip: &Path, entries: &[(&str, &str)]) {
        let file_zip = std::fs::File::create(path_zip).expect("create zip");
        let mut writer = zip::ZipWriter::new(file_zip);
        for (name, contents) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(name.trim_end_matches('/'), SimpleFileOptions::default())
                    .expect("add directory");
            } else {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .expect("start file");
                writer.write_all(contents.as_bytes()).expect("write entry");
            }
        }
        writer.finish().expect("finish zip");
    }

    #[test]
    fn classify_artifact_resolves_all_three_kinds() {
        let patterns = SpecArtifactPatterns::new().expect("compile");

        let (kind, version) = patterns
            .classify_artifact("vali-0.5.12-amd64.zip")
            .expect("os artifact");
        assert_eq!(kind, EnumArtifactKind::Os);
        assert_eq!(version.to_string(), "0.5.12");
        assert_eq!(version.arch, "amd64");

        let (kind, _) = patterns
            .classify_artifact("vali-sdk-0.5.12-amd64.zip")
            .expect("sdk artifact");
        assert_eq!(kind, EnumArtifactKind::Sdk);

        let (kind, _) = patterns
            .classify_artifact("vali-ddk-0.5.12-i386.zip")
            .expect("ddk artifact");
        assert_eq!(kind, EnumArtifactKind::Ddk);
    }

    #[test]
    fn classify_artifact_is_case_insensitive() {
        let patterns = SpecArtifactPatterns::new().expect("compile");
        let (kind, version) = patterns
            .classify_artifact("VALI-1.2.3-AMD64.ZIP")
            .expect("os artifact");
        assert_eq!(kind, EnumArtifactKind::Os);
        assert_eq!(version.arch, "AMD64");
    }

    #[test]
    fn classify_artifact_rejects_names_outside_convention() {
        let patterns = SpecArtifactPatterns::new().expect("compile");
        assert!(patterns.classify_artifact("other-0.5.12-amd64.zip").is_none());
        assert!(patterns.classify_artifact("vali-0.5.12.zip").is_none());
        assert!(patterns.classify_artifact("vali-0.5.12-amd64.zip.bak").is_none());
        // Version separators are literal dots, not wildcards.
        assert!(patterns.classify_artifact("vali-0x5y12-amd64.zip").is_none());
        assert!(patterns.classify_artifact("prefix-vali-0.5.12-amd64.zip").is_none());
    }

    #[test]
    fn empty_directory_removes_files_and_subtrees() {
        let tmp = TestDir::new();
        let dir = tmp.path().join("target");
        std::fs::create_dir_all(dir.join("nested/deep")).expect("mkdir");
        std::fs::write(dir.join("stale.txt"), "stale").expect("write");
        std::fs::write(dir.join("nested/deep/old.bin"), "old").expect("write");

        let mut builder = ReportIntakeBuilder::default();
        empty_directory(&dir, &mut builder);

        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).expect("read dir").count(), 0);
        assert!(builder.warnings.is_empty());
    }

    #[test]
    fn empty_directory_tolerates_missing_path() {
        let tmp = TestDir::new();
        let mut builder = ReportIntakeBuilder::default();
        empty_directory(&tmp.path().join("absent"), &mut builder);
        assert!(builder.warnings.is_empty());
    }

    #[test]
    fn extract_archive_restores_tree() {
        let tmp = TestDir::new();
        let path_zip = tmp.path().join("bundle.zip");
        let dir_dst = tmp.path().join("out");
        write_zip(
            &path_zip,
            &[
                ("include/", ""),
                ("include/vali.h", "#pragma once"),
                ("lib/libvali.a", "archive"),
                ("readme.txt", "hello"),
            ],
        );

        let mut builder = ReportIntakeBuilder::default();
        let cnt_written =
            extract_archive(&path_zip, &dir_dst, &mut builder).expect("extract archive");

        assert_eq!(cnt_written, 3);
        assert_eq!(
            std::fs::read_to_string(dir_dst.join("include/vali.h")).expect("read"),
            "#pragma once"
        );
        assert_eq!(
            std::fs::read_to_string(dir_dst.join("lib/libvali.a")).expect("read"),
            "archive"
        );
        assert_eq!(
            std::fs::read_to_string(dir_dst.join("readme.txt")).expect("read"),
            "hello"
        );
    }

    #[test]
    fn extract_archive_skips_escaping_entries() {
        let tmp = TestDir::new();
        let path_zip = tmp.path().join("evil.zip");
        let dir_dst = tmp.path().join("jail/out");
        write_zip(&path_zip, &[("../escape.txt", "out"), ("ok.txt", "in")]);

        let mut builder = ReportIntakeBuilder::default();
        let cnt_written =
            extract_archive(&path_zip, &dir_dst, &mut builder).expect("extract archive");

        assert_eq!(cnt_written, 1);
        assert!(dir_dst.join("ok.txt").exists());
        assert!(!tmp.path().join("jail/escape.txt").exists());
        assert_eq!(builder.warnings.len(), 1);
    }

    #[test]
    fn extract_archive_missing_zip_is_fatal() {
        let tmp = TestDir::new();
        let mut builder = ReportIntakeBuilder::default();
        let err = extract_archive(
            &tmp.path().join("absent.zip"),
            &tmp.path().join("out"),
            &mut builder,
        )
        .expect_err("must fail");
        assert!(matches!(err, crate::spec::IntakeError::ExtractFailed { .. }));
    }
}
