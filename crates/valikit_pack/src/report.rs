//! Intake report model and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

use crate::spec::SpecArtifactVersion;

/// Aggregate counters and diagnostics for one `intake_artifacts` run.
#[derive(Debug, Default, Clone)]
pub struct ReportIntake {
    /// Total zip archives considered.
    pub cnt_scanned: u64,
    /// Archives unpacked into a destination directory.
    pub cnt_unpacked: u64,
    /// Consumed archives deleted after processing.
    pub cnt_removed: u64,
    /// Non-fatal warnings collected during intake.
    pub warnings: Vec<String>,
    /// Version captured from the main OS archive.
    pub version: Option<SpecArtifactVersion>,
}

impl ReportIntake {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_unpacked".to_string(), self.cnt_unpacked);
        dict_counts.insert("cnt_removed".to_string(), self.cnt_removed);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        let c_version = match &self.version {
            Some(version) => format!("{version}-{}", version.arch),
            None => "none".to_string(),
        };
        format!(
            "{prefix} scanned={} unpacked={} removed={} warnings={} version={c_version}",
            dict_counts["cnt_scanned"],
            dict_counts["cnt_unpacked"],
            dict_counts["cnt_removed"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportIntake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[PACK]"))
    }
}

/// Mutable accumulator for intake statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportIntakeBuilder {
    /// See [`ReportIntake::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportIntake::cnt_unpacked`].
    pub cnt_unpacked: u64,
    /// See [`ReportIntake::cnt_removed`].
    pub cnt_removed: u64,
    /// See [`ReportIntake::warnings`].
    pub warnings: Vec<String>,
    /// See [`ReportIntake::version`].
    pub version: Option<SpecArtifactVersion>,
}

impl ReportIntakeBuilder {
    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    /// Increment unpacked count by one.
    pub fn add_unpacked(&mut self) {
        self.cnt_unpacked += 1;
    }

    /// Increment removed count by one.
    pub fn add_removed(&mut self) {
        self.cnt_removed += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Record the captured OS artifact version. The first capture wins;
    /// later ones are reported as warnings by the caller.
    pub fn set_version(&mut self, version: SpecArtifactVersion) {
        if self.version.is_none() {
            self.version = Some(version);
        }
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportIntake {
        ReportIntake {
            cnt_scanned: self.cnt_scanned,
            cnt_unpacked: self.cnt_unpacked,
            cnt_removed: self.cnt_removed,
            warnings: self.warnings,
            version: self.version,
        }
    }
}
