//! Module recognition: heading scan with an optional analyzer in front of it.

use crate::format::DocumentFormat;
use crate::headings::{self, MAX_DESCRIPTION_CHARS};
use crate::page_type::infer_page_type;
use std::collections::HashSet;
use uiwalk_core::module::module_id;
use uiwalk_core::{Module, PageType};

/// Default cap on recognized modules.
pub const DEFAULT_MAX_MODULES: usize = 50;

/// Module description returned by an external analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzedModule {
    pub name: String,
    pub description: String,
    /// Page-type label; empty when the analyzer did not provide one.
    pub page_type: String,
}

/// Why an analyzer produced no module list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),
    #[error("malformed analysis response: {0}")]
    Malformed(String),
    #[error("analysis returned no modules")]
    Empty,
}

/// Delegated document segmentation, typically backed by a language model.
pub trait ModuleAnalyzer: Send + Sync {
    fn analyze(&self, content: &str) -> Result<Vec<AnalyzedModule>, AnalysisError>;
}

/// Turns document text into an ordered, deduplicated module list.
///
/// Names are deduplicated by exact string comparison; the first occurrence wins
/// and near-duplicates differing in case or punctuation are kept apart.
pub struct Recognizer<'a> {
    max_modules: usize,
    analyzer: Option<&'a dyn ModuleAnalyzer>,
}

impl Default for Recognizer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Recognizer<'a> {
    pub fn new() -> Self {
        Self {
            max_modules: DEFAULT_MAX_MODULES,
            analyzer: None,
        }
    }

    #[must_use]
    pub fn with_max_modules(mut self, max_modules: usize) -> Self {
        self.max_modules = max_modules;
        self
    }

    #[must_use]
    pub fn with_analyzer(mut self, analyzer: &'a dyn ModuleAnalyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Recognize modules. Never fails: analyzer errors fall back to the heading
    /// scan, and empty or heading-less text yields an empty list.
    pub fn recognize(&self, text: &str, format: DocumentFormat) -> Vec<Module> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if let Some(analyzer) = self.analyzer {
            match analyzer.analyze(text) {
                Ok(analyzed) => {
                    let modules = self.from_analysis(analyzed);
                    if !modules.is_empty() {
                        tracing::info!(count = modules.len(), "modules recognized by analysis");
                        return modules;
                    }
                    tracing::warn!("analysis yielded no usable modules, using heading scan");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "module analysis failed, using heading scan");
                }
            }
        }
        self.scan_headings(text, format)
    }

    /// The rule-based path on its own.
    pub fn scan_headings(&self, text: &str, format: DocumentFormat) -> Vec<Module> {
        let mut seen = HashSet::new();
        let mut modules = Vec::new();

        for candidate in headings::scan(text, format) {
            if modules.len() >= self.max_modules {
                break;
            }
            let name = headings::clean_name(&candidate.text);
            if !headings::is_valid_name(&name) || !seen.insert(name.clone()) {
                continue;
            }
            let id = module_id(&format!("{}:{}:{}", candidate.level, candidate.line, name));
            let page_type = infer_page_type(&name);
            modules.push(Module::new(
                id,
                name,
                candidate.description,
                page_type,
                candidate.level,
            ));
        }

        tracing::debug!(count = modules.len(), %format, "modules recognized by heading scan");
        modules
    }

    fn from_analysis(&self, analyzed: Vec<AnalyzedModule>) -> Vec<Module> {
        let mut seen = HashSet::new();
        let mut modules = Vec::new();

        for (index, entry) in analyzed.into_iter().enumerate() {
            if modules.len() >= self.max_modules {
                break;
            }
            let name = headings::clean_name(&entry.name);
            if !headings::is_valid_name(&name) || !seen.insert(name.clone()) {
                continue;
            }
            let page_type = match PageType::from(entry.page_type) {
                PageType::Unknown => infer_page_type(&name),
                known => known,
            };
            let description: String = uiwalk_core::case::flatten_line(&entry.description)
                .chars()
                .take(MAX_DESCRIPTION_CHARS)
                .collect();
            let id = module_id(&format!("ai:{index}:{name}"));
            modules.push(Module::new(id, name, description, page_type, 2));
        }
        modules
    }
}

/// Recognize modules with the heading scan and the default cap.
pub fn recognize(text: &str, format: DocumentFormat) -> Vec<Module> {
    Recognizer::new().recognize(text, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAnalyzer(Result<Vec<AnalyzedModule>, AnalysisError>);

    impl ModuleAnalyzer for FixedAnalyzer {
        fn analyze(&self, _content: &str) -> Result<Vec<AnalyzedModule>, AnalysisError> {
            self.0.clone()
        }
    }

    fn analyzed(name: &str, page_type: &str) -> AnalyzedModule {
        AnalyzedModule {
            name: name.into(),
            description: format!("{name} 说明"),
            page_type: page_type.into(),
        }
    }

    const DOC: &str = "# 标题\n## 首页\n欢迎\n## 任务列表\n### 新建任务\n";

    #[test]
    fn test_heading_scan_basic() {
        let modules = recognize(DOC, DocumentFormat::Markdown);
        let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["首页", "任务列表", "新建任务"]);
        assert_eq!(modules[0].description, "欢迎");
        assert_eq!(modules[1].page_type, PageType::List);
        assert_eq!(modules[2].level, 3);
        assert_eq!(modules[2].page_type, PageType::Create);
        assert!(modules.iter().all(|m| !m.selected));
    }

    #[test]
    fn test_ids_are_unique_and_deterministic() {
        let a = recognize(DOC, DocumentFormat::Markdown);
        let b = recognize(DOC, DocumentFormat::Markdown);
        assert_eq!(a, b);
        let ids: HashSet<_> = a.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids.len(), a.len());
    }

    #[test]
    fn test_analyzer_result_is_used() {
        let analyzer = FixedAnalyzer(Ok(vec![
            analyzed("登录页", "表单页"),
            analyzed("用户列表", ""),
            analyzed("", "列表页"),
            analyzed("登录页", ""),
        ]));
        let modules = Recognizer::new()
            .with_analyzer(&analyzer)
            .recognize(DOC, DocumentFormat::Markdown);
        let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["登录页", "用户列表"]);
        assert_eq!(modules[0].page_type, PageType::Other("表单页".into()));
        assert_eq!(modules[1].page_type, PageType::List);
        assert_eq!(modules[0].level, 2);
    }

    #[test]
    fn test_analyzer_failure_falls_back() {
        let analyzer = FixedAnalyzer(Err(AnalysisError::Unavailable("no key".into())));
        let with = Recognizer::new()
            .with_analyzer(&analyzer)
            .recognize(DOC, DocumentFormat::Markdown);
        assert_eq!(with, recognize(DOC, DocumentFormat::Markdown));
    }

    #[test]
    fn test_empty_analysis_falls_back() {
        let analyzer = FixedAnalyzer(Ok(vec![analyzed("  ", "")]));
        let modules = Recognizer::new()
            .with_analyzer(&analyzer)
            .recognize(DOC, DocumentFormat::Markdown);
        assert_eq!(modules.len(), 3);
    }

    #[test]
    fn test_custom_cap() {
        let modules = Recognizer::new()
            .with_max_modules(2)
            .recognize(DOC, DocumentFormat::Markdown);
        assert_eq!(modules.len(), 2);
    }
}
