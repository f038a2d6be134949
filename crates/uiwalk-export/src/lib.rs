//! Export collaborators for walk-through case lists.
//!
//! Every exporter treats the case list as an immutable, ordered sequence and
//! keeps the nine column labels unchanged.

pub mod csv;
pub mod plan;
pub mod split;
pub mod summary;

pub use csv::{CsvError, export_csv, import_csv};
pub use plan::{plan_title, render_plan};
pub use split::{Sheet, sheet_name, split_by_module};
pub use summary::{ModuleSummary, export_summary_csv, format_summary_table, summarize};

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};
use uiwalk_core::ReviewType;

/// Timestamp format used in output file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Output file names for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub cases: String,
    pub plan: String,
    /// Directory holding the per-module sheets.
    pub sheets_dir: String,
}

impl OutputNames {
    /// `{base}-UI走查用例-{timestamp}.csv` and friends. A trailing `.md`,
    /// `.markdown` or `.txt` extension is dropped from `base`.
    pub fn new<Tz: TimeZone>(base: &str, review_type: ReviewType, at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let base = [".md", ".markdown", ".txt"]
            .iter()
            .find_map(|ext| base.strip_suffix(ext))
            .unwrap_or(base);
        let base = if base.trim().is_empty() { "需求文档" } else { base };
        let stamp = at.format(TIMESTAMP_FORMAT);
        let label = review_type.output_label();
        Self {
            cases: format!("{base}-{label}-{stamp}.csv"),
            plan: format!("{base}-{}-{stamp}.md", plan_title(review_type)),
            sheets_dir: format!("{base}-{label}-{stamp}"),
        }
    }
}

/// Write one CSV per sheet into `dir`, creating it if needed.
pub fn write_sheets(dir: &Path, sheets: &[Sheet]) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    sheets
        .iter()
        .map(|sheet| {
            let path = dir.join(format!("{}.csv", sheet.name));
            std::fs::write(&path, &sheet.csv)?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_output_names() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let names = OutputNames::new("训练需求.md", ReviewType::Standard, &at);
        assert_eq!(names.cases, "训练需求-UI走查用例-20260304_050607.csv");
        assert_eq!(names.plan, "训练需求-UI走查计划-20260304_050607.md");
        assert_eq!(names.sheets_dir, "训练需求-UI走查用例-20260304_050607");

        let names = OutputNames::new("", ReviewType::Competitive, &at);
        assert_eq!(names.cases, "需求文档-竞品走查用例-20260304_050607.csv");
        assert_eq!(names.plan, "需求文档-竞品走查计划-20260304_050607.md");
    }
}
