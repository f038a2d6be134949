//! Quick document statistics reported alongside recognition.

use serde::Serialize;

use crate::format::DocumentFormat;
use crate::headings;

/// Rough shape of a requirements document.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub lines: usize,
    /// Whitespace-separated tokens.
    pub words: usize,
    /// Heading candidates found by the scan for this format.
    pub headings: usize,
    /// Estimated table count: pipe characters divided by three.
    pub tables: usize,
    pub has_images: bool,
}

impl DocumentStats {
    pub fn compute(text: &str, format: DocumentFormat) -> Self {
        Self {
            lines: text.lines().count(),
            words: text.split_whitespace().count(),
            headings: headings::scan(text, format).len(),
            tables: text.matches('|').count() / 3,
            has_images: text.contains("!["),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_empty() {
        assert_eq!(
            DocumentStats::compute("", DocumentFormat::Markdown),
            DocumentStats::default()
        );
    }

    #[test]
    fn test_stats_counts() {
        let text = "# 需求\n## 首页\n| 字段 | 说明 |\n|---|---|\n![原型](a.png)\n## 设置\n";
        let stats = DocumentStats::compute(text, DocumentFormat::Markdown);
        assert_eq!(stats.lines, 6);
        assert_eq!(stats.headings, 2);
        assert_eq!(stats.tables, 2);
        assert!(stats.has_images);
    }
}
