//! Per-module case counts, the workbook's overview sheet.

use crate::csv::escape_field;
use crate::split::group_by_module;
use std::fmt::Write;
use uiwalk_core::{PassStatus, Priority, TestCase};

pub const SUMMARY_COLUMNS: [&str; 9] = [
    "序号",
    "模块名称",
    "用例数量",
    "高优先级",
    "中优先级",
    "低优先级",
    "完成数量",
    "完成率",
    "备注",
];

/// Counts for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    pub index: usize,
    pub module: String,
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Cases marked passed or failed.
    pub completed: usize,
}

impl ModuleSummary {
    /// Completion as a whole percentage, 0 for an empty module.
    pub fn completion_percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            (self.completed * 100 + self.total / 2) / self.total
        }
    }
}

/// Summarize cases per module in first-appearance order.
pub fn summarize(cases: &[TestCase]) -> Vec<ModuleSummary> {
    group_by_module(cases)
        .into_iter()
        .enumerate()
        .map(|(i, group)| {
            let count = |p: Priority| group.cases.iter().filter(|c| c.priority == p).count();
            ModuleSummary {
                index: i + 1,
                module: group.module.to_string(),
                total: group.cases.len(),
                high: count(Priority::High),
                medium: count(Priority::Medium),
                low: count(Priority::Low),
                completed: group
                    .cases
                    .iter()
                    .filter(|c| c.status != PassStatus::Pending)
                    .count(),
            }
        })
        .collect()
}

/// Render summaries as CSV with the overview sheet's columns.
pub fn export_summary_csv(summaries: &[ModuleSummary]) -> String {
    let mut out = SUMMARY_COLUMNS.join(",");
    out.push_str("\r\n");
    for s in summaries {
        let _ = write!(
            out,
            "{},{},{},{},{},{},{},{}%,\r\n",
            s.index,
            escape_field(&s.module),
            s.total,
            s.high,
            s.medium,
            s.low,
            s.completed,
            s.completion_percent()
        );
    }
    out
}

/// Plain-text table for terminal output.
pub fn format_summary_table(summaries: &[ModuleSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  #  cases  high  med  low  done  module");
    for s in summaries {
        let _ = writeln!(
            out,
            "{:>3}  {:>5}  {:>4}  {:>3}  {:>3}  {:>3}%  {}",
            s.index,
            s.total,
            s.high,
            s.medium,
            s.low,
            s.completion_percent(),
            s.module
        );
    }
    out
}
