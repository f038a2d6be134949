//! Deterministic walk-through cases that need no model.
//!
//! Every module gets the eight base cases. Each enhancement category appends its
//! own supplement. Expected results carry illustrative design tokens (pixel
//! sizes, hex colors), not values from a real design source.

use uiwalk_core::{Category, DesignPrinciple, Priority, TestCase};

use DesignPrinciple::{
    ComponentStates, ContentAccuracy, InteractionFeedback, LayoutResponsiveness, NegativeFlow,
    ScenarioTesting, VisualConsistency,
};
use Priority::{High, Medium};

/// One pre-authored case. `{module}` in the check item is replaced by the module name.
struct Template {
    check_point: &'static str,
    principle: DesignPrinciple,
    check_item: &'static str,
    priority: Priority,
    expected: &'static str,
}

const fn t(
    check_point: &'static str,
    principle: DesignPrinciple,
    check_item: &'static str,
    priority: Priority,
    expected: &'static str,
) -> Template {
    Template {
        check_point,
        principle,
        check_item,
        priority,
        expected,
    }
}

const BASE: [Template; 8] = [
    t(
        "页面标题",
        VisualConsistency,
        "检查{module}页面标题的字体、字号、颜色",
        High,
        "标题字号16px，字重500，颜色#262626",
    ),
    t(
        "按钮状态",
        ComponentStates,
        "检查{module}中主要按钮的各种状态",
        High,
        "按钮有默认、悬停、点击、禁用状态，有平滑过渡动画",
    ),
    t(
        "操作反馈",
        InteractionFeedback,
        "检查{module}中操作是否有及时反馈",
        High,
        "操作成功/失败时显示Toast提示，加载时显示Loading",
    ),
    t(
        "输入框状态",
        ComponentStates,
        "检查{module}中输入框的各种状态",
        High,
        "输入框有占位符、聚焦、已输入、错误、禁用状态",
    ),
    t(
        "页面布局",
        LayoutResponsiveness,
        "检查{module}的页面布局和对齐",
        Medium,
        "元素按网格系统对齐，间距统一",
    ),
    t(
        "错误提示",
        NegativeFlow,
        "检查{module}中输入验证的错误提示",
        High,
        "输入错误时显示清晰的错误提示信息",
    ),
    t(
        "文案准确性",
        ContentAccuracy,
        "检查{module}中所有文案是否准确无误",
        Medium,
        "无错别字，专业术语准确，语句通顺",
    ),
    t(
        "加载状态",
        InteractionFeedback,
        "检查{module}中数据加载时的状态",
        Medium,
        "数据加载时显示骨架屏或Loading动画",
    ),
];

const GLOBAL_PAGE: [Template; 3] = [
    t(
        "顶部导航栏",
        VisualConsistency,
        "检查{module}顶部导航栏的样式与当前位置高亮",
        High,
        "导航栏高度56px，背景色#FFFFFF，当前菜单项高亮色#1890FF，与其他页面保持一致",
    ),
    t(
        "页面底部",
        VisualConsistency,
        "检查{module}页面底部版权信息与链接的样式",
        Medium,
        "底部文字12px，颜色#8C8C8C，链接悬停变为#1890FF，各页面一致",
    ),
    t(
        "通用组件",
        VisualConsistency,
        "检查{module}中面包屑、头像、消息提醒等通用组件的样式一致性",
        High,
        "通用组件复用同一规范：图标16px，间距8px，与全局组件库一致",
    ),
];

const SCENARIO_FLOW: [Template; 3] = [
    t(
        "多步骤流程",
        ScenarioTesting,
        "检查{module}中多步骤操作的步骤指示与切换",
        High,
        "步骤条清晰标示当前步骤，上一步/下一步切换后已填数据保留",
    ),
    t(
        "操作路径",
        ScenarioTesting,
        "按主流程完整走查{module}的操作路径",
        High,
        "从入口到完成的每一步都有明确的操作指引，无死路或多余跳转",
    ),
    t(
        "表单提交流程",
        InteractionFeedback,
        "检查{module}中表单提交前后的状态变化",
        High,
        "提交时按钮显示Loading并禁用防止重复提交，成功后跳转或提示结果",
    ),
];

const EXCEPTION_SCENARIO: [Template; 4] = [
    t(
        "网络异常",
        NegativeFlow,
        "检查{module}在网络断开或接口超时时的表现",
        High,
        "显示“网络异常，请稍后重试”提示并提供重试入口，页面不白屏",
    ),
    t(
        "边界值输入",
        NegativeFlow,
        "检查{module}中输入框对超长内容、特殊字符和空值的处理",
        High,
        "超出最大长度时禁止输入或提示，特殊字符不导致页面错乱，必填项为空时给出提示",
    ),
    t(
        "权限不足",
        NegativeFlow,
        "检查无权限用户访问{module}时的表现",
        Medium,
        "显示无权限提示页或隐藏无权限操作按钮，不暴露敏感数据",
    ),
    t(
        "空数据状态",
        ComponentStates,
        "检查{module}在无数据时的空状态展示",
        Medium,
        "显示空状态插图与说明文案“暂无数据”，并提供引导操作",
    ),
];

const UPSTREAM_DOWNSTREAM: [Template; 2] = [
    t(
        "数据传递",
        ScenarioTesting,
        "检查{module}与上下游页面之间的数据传递",
        High,
        "从上游页面带入的数据完整准确，提交后下游页面展示最新数据",
    ),
    t(
        "状态同步",
        InteractionFeedback,
        "检查{module}中操作后相关页面的状态同步",
        High,
        "新增、编辑、删除后列表页与详情页状态即时刷新，无需手动刷新页面",
    ),
];

fn supplement_templates(category: Category) -> &'static [Template] {
    match category {
        Category::GlobalPage => &GLOBAL_PAGE,
        Category::ScenarioFlow => &SCENARIO_FLOW,
        Category::ExceptionScenario => &EXCEPTION_SCENARIO,
        Category::UpstreamDownstream => &UPSTREAM_DOWNSTREAM,
    }
}

fn render(templates: &[Template], module_name: &str) -> impl Iterator<Item = TestCase> {
    templates.iter().map(move |tpl| {
        TestCase::new(
            module_name,
            tpl.check_point,
            tpl.principle,
            tpl.check_item.replace("{module}", module_name),
            tpl.priority,
            tpl.expected,
        )
    })
}

/// Number of cases a category adds.
pub fn supplement_len(category: Category) -> usize {
    supplement_templates(category).len()
}

/// The eight base cases for a module.
pub fn base_cases(module_name: &str) -> Vec<TestCase> {
    render(&BASE, module_name).collect()
}

/// The supplement one category adds to a module.
pub fn category_supplement(module_name: &str, category: Category) -> Vec<TestCase> {
    render(supplement_templates(category), module_name).collect()
}

/// Base cases followed by one supplement per supplied category, in order.
///
/// Categories are taken literally: a repeated category adds its supplement
/// again. Output depends only on the arguments.
pub fn synthesize(module_name: &str, categories: &[Category]) -> Vec<TestCase> {
    let mut cases = base_cases(module_name);
    for &category in categories {
        cases.extend(category_supplement(module_name, category));
    }
    cases
}

/// Cases for the virtual module named after a category.
pub fn category_module_cases(category: Category) -> Vec<TestCase> {
    category_supplement(category.label(), category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_cases_cover_fixed_angles() {
        let cases = base_cases("首页");
        assert_eq!(cases.len(), 8);
        let points: Vec<_> = cases.iter().map(|c| c.check_point.as_str()).collect();
        assert_eq!(
            points,
            vec![
                "页面标题",
                "按钮状态",
                "操作反馈",
                "输入框状态",
                "页面布局",
                "错误提示",
                "文案准确性",
                "加载状态"
            ]
        );
        assert_eq!(cases[0].check_item, "检查首页页面标题的字体、字号、颜色");
        assert!(cases.iter().all(|c| c.module == "首页"));
    }

    #[test]
    fn test_supplement_sizes() {
        assert_eq!(supplement_len(Category::GlobalPage), 3);
        assert_eq!(supplement_len(Category::ScenarioFlow), 3);
        assert_eq!(supplement_len(Category::ExceptionScenario), 4);
        assert_eq!(supplement_len(Category::UpstreamDownstream), 2);
    }

    #[test]
    fn test_global_page_supplement_is_visual() {
        let cases = synthesize("首页", &[Category::GlobalPage]);
        assert_eq!(cases.len(), 11);
        assert!(
            cases[8..]
                .iter()
                .all(|c| c.principle == DesignPrinciple::VisualConsistency)
        );
    }

    #[test]
    fn test_every_category_subset_is_additive() {
        let base = base_cases("订单列表");
        for mask in 0..16u8 {
            let categories: Vec<Category> = Category::ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, c)| *c)
                .collect();
            let cases = synthesize("订单列表", &categories);
            let expected: usize = 8 + categories.iter().map(|c| supplement_len(*c)).sum::<usize>();
            assert_eq!(cases.len(), expected, "categories {categories:?}");
            assert_eq!(cases[..8], base[..], "categories {categories:?}");
            assert_eq!(cases, synthesize("订单列表", &categories));
        }
    }

    #[test]
    fn test_repeated_category_is_literal() {
        let cases = synthesize("m", &[Category::UpstreamDownstream, Category::UpstreamDownstream]);
        assert_eq!(cases.len(), 12);
    }

    #[test]
    fn test_virtual_module_named_after_category() {
        let cases = category_module_cases(Category::ExceptionScenario);
        assert_eq!(cases.len(), 4);
        assert!(cases.iter().all(|c| c.module == "异常场景"));
        assert!(cases[0].check_item.contains("异常场景"));
    }

    #[test]
    fn test_template_records_are_well_formed() {
        let cases = synthesize("Home Page", &Category::ALL);
        assert!(cases.iter().all(TestCase::is_well_formed));
    }
}
