//! The review-plan Markdown document that accompanies a case list.

use std::fmt::Write;
use uiwalk_core::{Priority, ReviewType, TestCase};

/// Document title for a review type, also used in the plan's file name.
pub fn plan_title(review_type: ReviewType) -> &'static str {
    match review_type {
        ReviewType::Standard => "UI走查计划",
        ReviewType::Competitive => "竞品走查计划",
    }
}

/// Render the review plan for the selected modules and their cases.
///
/// Module counts refer to `modules`, the selection; category blocks appear in
/// the case total but are not listed as modules.
pub fn render_plan(modules: &[String], cases: &[TestCase], review_type: ReviewType) -> String {
    let high = cases.iter().filter(|c| c.priority == Priority::High).count();

    let mut out = String::new();
    let _ = writeln!(out, "# {}", plan_title(review_type));
    let _ = writeln!(out);
    let _ = writeln!(out, "## 1. 走查目标");
    let _ = writeln!(out, "确保UI实现与设计稿在视觉和体验上保持一致");
    let _ = writeln!(out);
    let _ = writeln!(out, "## 2. 走查统计");
    let _ = writeln!(out, "- 用例总数: {}", cases.len());
    let _ = writeln!(out, "- 模块数量: {}", modules.len());
    let _ = writeln!(out, "- 高优先级: {high}");
    let _ = writeln!(out);
    let _ = writeln!(out, "## 3. 走查模块");
    let _ = writeln!(out, "共{}个模块：", modules.len());
    let _ = writeln!(out);
    for (i, module) in modules.iter().enumerate() {
        let count = cases.iter().filter(|c| &c.module == module).count();
        let _ = writeln!(out, "{}. **{}** - {}个用例", i + 1, module, count);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "## 4. 走查方法");
    let _ = writeln!(out, "采用两种方式相结合：");
    let _ = writeln!(out, "1. 按点走查：逐条检查每个UI元素");
    let _ = writeln!(out, "2. 按流程走查：模拟用户操作流程");
    let _ = writeln!(out);
    let _ = writeln!(out, "## 5. 验收标准");
    let _ = writeln!(out, "- 所有UI元素与设计稿一致度达到100%");
    let _ = writeln!(out, "- 所有交互状态都有对应的UI表现");
    let _ = writeln!(out, "- 所有异常场景都有友好的错误提示");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uiwalk_core::DesignPrinciple;

    fn case(module: &str, priority: Priority) -> TestCase {
        TestCase::new(
            module,
            "标题",
            DesignPrinciple::VisualConsistency,
            "检查标题",
            priority,
            "16px",
        )
    }

    #[test]
    fn test_plan_sections_and_counts() {
        let modules = vec!["首页".to_string(), "设置".to_string()];
        let cases = vec![
            case("首页", Priority::High),
            case("首页", Priority::Low),
            case("设置", Priority::High),
            case("全局页面", Priority::Medium),
        ];
        let plan = render_plan(&modules, &cases, ReviewType::Standard);
        assert!(plan.starts_with("# UI走查计划\n"));
        assert!(plan.contains("- 用例总数: 4\n"));
        assert!(plan.contains("- 模块数量: 2\n"));
        assert!(plan.contains("- 高优先级: 2\n"));
        assert!(plan.contains("共2个模块："));
        assert!(plan.contains("1. **首页** - 2个用例\n"));
        assert!(plan.contains("2. **设置** - 1个用例\n"));
        assert!(!plan.contains("**全局页面**"));
        assert!(plan.contains("## 5. 验收标准"));
    }

    #[test]
    fn test_competitive_plan_title() {
        let modules = vec!["首页".to_string()];
        let cases = vec![case("首页", Priority::High)];
        let plan = render_plan(&modules, &cases, ReviewType::Competitive);
        assert!(plan.starts_with("# 竞品走查计划\n"));
        assert!(!plan.contains("UI走查计划"));
        assert!(plan.contains("1. **首页** - 1个用例\n"));
    }

    #[test]
    fn test_empty_plan() {
        let plan = render_plan(&[], &[], ReviewType::Standard);
        assert!(plan.contains("共0个模块："));
        assert!(plan.contains("- 用例总数: 0"));
    }
}
