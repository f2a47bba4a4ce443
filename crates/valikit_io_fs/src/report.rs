//! Mirror report model and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one `mirror_tree` run.
#[derive(Debug, Default, Clone)]
pub struct ReportMirror {
    /// Total enumerated directory/file entries.
    pub cnt_scanned: u64,
    /// Number of files whose basename matched the pattern.
    pub cnt_matched: u64,
    /// Number of files actually written. Directories and skipped files are
    /// not counted.
    pub cnt_copied: u64,
    /// Number of matched files left untouched (existing destination without
    /// overwrite, or dry-run).
    pub cnt_skipped: u64,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
}

impl ReportMirror {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_matched".to_string(), self.cnt_matched);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} scanned={} matched={} copied={} skipped={} warnings={}",
            dict_counts["cnt_scanned"],
            dict_counts["cnt_matched"],
            dict_counts["cnt_copied"],
            dict_counts["cnt_skipped"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MIRROR]"))
    }
}

/// Mutable accumulator for mirror statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportMirrorBuilder {
    /// See [`ReportMirror::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportMirror::cnt_matched`].
    pub cnt_matched: u64,
    /// See [`ReportMirror::cnt_copied`].
    pub cnt_copied: u64,
    /// See [`ReportMirror::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportMirror::warnings`].
    pub warnings: Vec<String>,
}

impl ReportMirrorBuilder {
    /// Increment scanned count by one.
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    /// Increment matched count by one.
    pub fn add_matched(&mut self) {
        self.cnt_matched += 1;
    }

    /// Increment copied count by one.
    pub fn add_copied(&mut self) {
        self.cnt_copied += 1;
    }

    /// Increment skipped count by one.
    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportMirror {
        ReportMirror {
            cnt_scanned: self.cnt_scanned,
            cnt_matched: self.cnt_matched,
            cnt_copied: self.cnt_copied,
            cnt_skipped: self.cnt_skipped,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReportMirror;

    #[test]
    fn report_mirror_to_dict_and_format_agree() {
        let report = ReportMirror {
            cnt_scanned: 9,
            cnt_matched: 4,
            cnt_copied: 3,
            cnt_skipped: 1,
            warnings: vec!["w".to_string()],
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_scanned"], 9);
        assert_eq!(dict_counts["cnt_matched"], 4);
        assert_eq!(dict_counts["cnt_copied"], 3);
        assert_eq!(dict_counts["cnt_skipped"], 1);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[MIRROR]");
        assert_eq!(txt, "[MIRROR] scanned=9 matched=4 copied=3 skipped=1 warnings=1");
        assert_eq!(report.to_string(), txt);
    }
}
