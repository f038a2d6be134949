//! Walk-through test case records and their enumerated fields.
//!
//! Field names and enumerated values carry the product's Chinese labels. These
//! labels are the contract with the language model and with exported sheets, so
//! they are never paraphrased; parsing additionally accepts English names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record field labels, in export column order.
pub mod labels {
    pub const CASE_ID: &str = "用例编号";
    pub const MODULE: &str = "页面/模块";
    pub const CHECK_POINT: &str = "检查点";
    pub const PRINCIPLE: &str = "设计原则";
    pub const CHECK_ITEM: &str = "检查项";
    pub const PRIORITY: &str = "优先级";
    pub const EXPECTED: &str = "预期结果/设计标准";
    pub const STATUS: &str = "是否通过";
    pub const NOTES: &str = "截图/备注";
}

/// Fields the language model must populate for a record to be accepted.
pub const REQUIRED_FIELDS: [&str; 5] = [
    labels::CHECK_POINT,
    labels::PRINCIPLE,
    labels::CHECK_ITEM,
    labels::PRIORITY,
    labels::EXPECTED,
];

/// The nine exported columns, in order.
pub const EXPORT_COLUMNS: [&str; 9] = [
    labels::CASE_ID,
    labels::MODULE,
    labels::CHECK_POINT,
    labels::PRINCIPLE,
    labels::CHECK_ITEM,
    labels::PRIORITY,
    labels::EXPECTED,
    labels::STATUS,
    labels::NOTES,
];

/// A label that does not belong to the enumerated vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Review priority of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "高", alias = "High", alias = "high")]
    High,
    #[serde(rename = "中", alias = "Medium", alias = "medium")]
    Medium,
    #[serde(rename = "低", alias = "Low", alias = "low")]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::High, Self::Medium, Self::Low];

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "高",
            Self::Medium => "中",
            Self::Low => "低",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "高" => return Ok(Self::High),
            "中" => return Ok(Self::Medium),
            "低" => return Ok(Self::Low),
            _ => {}
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseLabelError::new("priority", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Design principle
// ---------------------------------------------------------------------------

/// The eight UI walk-through principles every record is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignPrinciple {
    #[serde(rename = "视觉一致性原则")]
    VisualConsistency,
    #[serde(rename = "布局与响应式原则")]
    LayoutResponsiveness,
    #[serde(rename = "组件状态完整性原则")]
    ComponentStates,
    #[serde(rename = "内容与文案准确性原则")]
    ContentAccuracy,
    #[serde(rename = "交互与反馈原则")]
    InteractionFeedback,
    #[serde(rename = "可访问性与可用性原则")]
    Accessibility,
    #[serde(rename = "场景法")]
    ScenarioTesting,
    #[serde(rename = "异常与负向流程验证")]
    NegativeFlow,
}

impl DesignPrinciple {
    pub const ALL: [DesignPrinciple; 8] = [
        Self::VisualConsistency,
        Self::LayoutResponsiveness,
        Self::ComponentStates,
        Self::ContentAccuracy,
        Self::InteractionFeedback,
        Self::Accessibility,
        Self::ScenarioTesting,
        Self::NegativeFlow,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::VisualConsistency => "视觉一致性原则",
            Self::LayoutResponsiveness => "布局与响应式原则",
            Self::ComponentStates => "组件状态完整性原则",
            Self::ContentAccuracy => "内容与文案准确性原则",
            Self::InteractionFeedback => "交互与反馈原则",
            Self::Accessibility => "可访问性与可用性原则",
            Self::ScenarioTesting => "场景法",
            Self::NegativeFlow => "异常与负向流程验证",
        }
    }

    pub const fn english_name(self) -> &'static str {
        match self {
            Self::VisualConsistency => "visual consistency",
            Self::LayoutResponsiveness => "layout and responsiveness",
            Self::ComponentStates => "component state completeness",
            Self::ContentAccuracy => "content accuracy",
            Self::InteractionFeedback => "interaction feedback",
            Self::Accessibility => "accessibility",
            Self::ScenarioTesting => "scenario testing",
            Self::NegativeFlow => "negative flow",
        }
    }

    /// What reviewers look at under this principle (used in generation prompts).
    pub const fn focus(self) -> &'static str {
        match self {
            Self::VisualConsistency => "颜色、字体、图标、间距",
            Self::LayoutResponsiveness => "对齐、响应式、内容截断",
            Self::ComponentStates => "按钮、输入框、链接状态",
            Self::ContentAccuracy => "错别字、信息准确性",
            Self::InteractionFeedback => "加载状态、操作反馈",
            Self::Accessibility => "键盘导航、焦点指示",
            Self::ScenarioTesting => "正常场景、分支场景",
            Self::NegativeFlow => "输入验证、操作失败",
        }
    }
}

impl fmt::Display for DesignPrinciple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DesignPrinciple {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lowered = trimmed.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| {
                let label = p.label();
                trimmed == label
                    || (!trimmed.is_empty() && trimmed == label.trim_end_matches("原则"))
                    || lowered == p.english_name()
            })
            .ok_or_else(|| ParseLabelError::new("design principle", s))
    }
}

// ---------------------------------------------------------------------------
// Enhancement category
// ---------------------------------------------------------------------------

/// Optional supplemental testing angles a reviewer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "全局页面", alias = "Global Page")]
    GlobalPage,
    #[serde(rename = "场景流程", alias = "Scenario Flow")]
    ScenarioFlow,
    #[serde(rename = "异常场景", alias = "Exception Scenario")]
    ExceptionScenario,
    #[serde(rename = "上下游验证", alias = "Upstream/Downstream Verification")]
    UpstreamDownstream,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Self::GlobalPage,
        Self::ScenarioFlow,
        Self::ExceptionScenario,
        Self::UpstreamDownstream,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::GlobalPage => "全局页面",
            Self::ScenarioFlow => "场景流程",
            Self::ExceptionScenario => "异常场景",
            Self::UpstreamDownstream => "上下游验证",
        }
    }

    pub const fn english_name(self) -> &'static str {
        match self {
            Self::GlobalPage => "Global Page",
            Self::ScenarioFlow => "Scenario Flow",
            Self::ExceptionScenario => "Exception Scenario",
            Self::UpstreamDownstream => "Upstream/Downstream Verification",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::GlobalPage => "包含导航、头部、底部等通用组件的测试",
            Self::ScenarioFlow => "包含多步骤操作流程的测试",
            Self::ExceptionScenario => "包含错误处理、边界条件的测试",
            Self::UpstreamDownstream => "包含数据流转、接口调用的测试",
        }
    }

    /// Command-line spelling.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::GlobalPage => "global-page",
            Self::ScenarioFlow => "scenario-flow",
            Self::ExceptionScenario => "exception-scenario",
            Self::UpstreamDownstream => "upstream-downstream",
        }
    }

    /// Drop repeated categories, keeping the first occurrence of each.
    pub fn dedup(categories: &[Category]) -> Vec<Category> {
        let mut seen = Vec::with_capacity(categories.len());
        for &c in categories {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        seen
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| {
                trimmed == c.label()
                    || trimmed.eq_ignore_ascii_case(c.english_name())
                    || trimmed.eq_ignore_ascii_case(c.slug())
            })
            .ok_or_else(|| ParseLabelError::new("category", s))
    }
}

// ---------------------------------------------------------------------------
// Pass status
// ---------------------------------------------------------------------------

/// Outcome recorded by the reviewer. The core only ever writes `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassStatus {
    #[default]
    #[serde(rename = "待测试")]
    Pending,
    #[serde(rename = "是")]
    Passed,
    #[serde(rename = "否")]
    Failed,
}

impl PassStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "待测试",
            Self::Passed => "是",
            Self::Failed => "否",
        }
    }
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PassStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "待测试" | "pending" => Ok(Self::Pending),
            "是" | "passed" | "pass" => Ok(Self::Passed),
            "否" | "failed" | "fail" => Ok(Self::Failed),
            _ => Err(ParseLabelError::new("pass status", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Review type
// ---------------------------------------------------------------------------

/// Which kind of walk-through a run produces. Only affects case-number prefix
/// and output label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    #[default]
    Standard,
    Competitive,
}

impl ReviewType {
    pub const fn case_prefix(self) -> &'static str {
        match self {
            Self::Standard => "UI-TC",
            Self::Competitive => "JP-TC",
        }
    }

    pub const fn output_label(self) -> &'static str {
        match self {
            Self::Standard => "UI走查用例",
            Self::Competitive => "竞品走查用例",
        }
    }

    /// Format the 1-based sequence number `n` as a case number.
    pub fn case_number(self, n: usize) -> String {
        format!("{}{:03}", self.case_prefix(), n)
    }
}

impl fmt::Display for ReviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Competitive => write!(f, "competitive"),
        }
    }
}

impl FromStr for ReviewType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "ui" => Ok(Self::Standard),
            "competitive" | "benchmark" | "competitive-benchmark" => Ok(Self::Competitive),
            _ => Err(ParseLabelError::new("review type", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Test case record
// ---------------------------------------------------------------------------

/// One row of the walk-through checklist.
///
/// `case_id` stays empty until the coordinator numbers the complete run, so
/// numbering is contiguous across every module of that run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(rename = "用例编号", default)]
    pub case_id: String,
    #[serde(rename = "页面/模块")]
    pub module: String,
    #[serde(rename = "检查点")]
    pub check_point: String,
    #[serde(rename = "设计原则")]
    pub principle: DesignPrinciple,
    #[serde(rename = "检查项")]
    pub check_item: String,
    #[serde(rename = "优先级")]
    pub priority: Priority,
    #[serde(rename = "预期结果/设计标准")]
    pub expected: String,
    #[serde(rename = "是否通过", default)]
    pub status: PassStatus,
    #[serde(rename = "截图/备注", default)]
    pub notes: String,
}

impl TestCase {
    /// Build an unnumbered, pending record. Text fields are flattened to a single line.
    pub fn new(
        module: impl Into<String>,
        check_point: impl Into<String>,
        principle: DesignPrinciple,
        check_item: impl Into<String>,
        priority: Priority,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            case_id: String::new(),
            module: flatten_line(&module.into()),
            check_point: flatten_line(&check_point.into()),
            principle,
            check_item: flatten_line(&check_item.into()),
            priority,
            expected: flatten_line(&expected.into()),
            status: PassStatus::Pending,
            notes: String::new(),
        }
    }

    /// Cell values in [`EXPORT_COLUMNS`] order.
    pub fn column_values(&self) -> [&str; 9] {
        [
            &self.case_id,
            &self.module,
            &self.check_point,
            self.principle.label(),
            &self.check_item,
            self.priority.label(),
            &self.expected,
            self.status.label(),
            &self.notes,
        ]
    }

    /// Whether the five required fields are populated and every value is single-line.
    pub fn is_well_formed(&self) -> bool {
        let required_present = [&self.check_point, &self.check_item, &self.expected]
            .iter()
            .all(|v| !v.trim().is_empty());
        required_present
            && self
                .column_values()
                .iter()
                .all(|v| !v.contains('\n') && !v.contains('\r'))
    }
}

/// Collapse line breaks to single spaces and trim surrounding whitespace.
pub fn flatten_line(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parses_labels_and_english() {
        assert_eq!("高".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Medium ".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_principle_accepts_short_label() {
        assert_eq!(
            "视觉一致性".parse::<DesignPrinciple>().unwrap(),
            DesignPrinciple::VisualConsistency
        );
        assert_eq!(
            "场景法".parse::<DesignPrinciple>().unwrap(),
            DesignPrinciple::ScenarioTesting
        );
        assert_eq!(
            "Negative Flow".parse::<DesignPrinciple>().unwrap(),
            DesignPrinciple::NegativeFlow
        );
        assert!("美观原则".parse::<DesignPrinciple>().is_err());
        assert!("".parse::<DesignPrinciple>().is_err());
    }

    #[test]
    fn test_category_round_trip_names() {
        for c in Category::ALL {
            assert_eq!(c.label().parse::<Category>().unwrap(), c);
            assert_eq!(c.english_name().parse::<Category>().unwrap(), c);
            assert_eq!(c.slug().parse::<Category>().unwrap(), c);
        }
        let err = "Performance".parse::<Category>().unwrap_err();
        assert_eq!(err.kind, "category");
    }

    #[test]
    fn test_category_dedup_keeps_first() {
        let picked = Category::dedup(&[
            Category::ExceptionScenario,
            Category::GlobalPage,
            Category::ExceptionScenario,
        ]);
        assert_eq!(picked, vec![Category::ExceptionScenario, Category::GlobalPage]);
    }

    #[test]
    fn test_case_number_format() {
        assert_eq!(ReviewType::Standard.case_number(1), "UI-TC001");
        assert_eq!(ReviewType::Competitive.case_number(42), "JP-TC042");
        assert_eq!(ReviewType::Standard.case_number(1234), "UI-TC1234");
    }

    #[test]
    fn test_flatten_line() {
        assert_eq!(flatten_line("  a\r\nb\nc\rd  "), "a b c d");
    }

    #[test]
    fn test_record_serializes_with_labels() {
        let case = TestCase::new(
            "首页",
            "页面标题",
            DesignPrinciple::VisualConsistency,
            "检查标题",
            Priority::High,
            "字号16px",
        );
        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["页面/模块"], "首页");
        assert_eq!(json["设计原则"], "视觉一致性原则");
        assert_eq!(json["优先级"], "高");
        assert_eq!(json["是否通过"], "待测试");
        assert_eq!(json["截图/备注"], "");

        let back: TestCase = serde_json::from_value(json).unwrap();
        assert_eq!(back, case);
    }

    #[test]
    fn test_new_flattens_multiline_text() {
        let case = TestCase::new(
            "m",
            "按钮\n状态",
            DesignPrinciple::ComponentStates,
            "检查\r\n按钮",
            Priority::Medium,
            "有默认\r悬停状态",
        );
        assert_eq!(case.check_point, "按钮 状态");
        assert_eq!(case.check_item, "检查 按钮");
        assert_eq!(case.expected, "有默认 悬停状态");
        assert!(case.is_well_formed());
    }
}
