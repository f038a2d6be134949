//! Prompt construction for module analysis and case generation.
//!
//! Field names, principle names and priority values inside the prompts are the
//! exact labels the response parser accepts.

use uiwalk_core::case::{REQUIRED_FIELDS, labels};
use uiwalk_core::{Category, DesignPrinciple, Module};

pub const ANALYSIS_SYSTEM: &str = "你是一个专业的UI需求分析专家。";

pub const CASE_SYSTEM: &str = "你是一个专业的UI测试工程师，擅长编写详细的UI走查用例。请确保返回的JSON格式正确，所有字符串都要正确转义。";

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

/// Build the module-analysis request for a document prefix.
pub fn build_analysis_prompt(content: &str) -> String {
    format!(
        r#"请分析以下需求文档，识别页面级别的功能模块。

需求文档：
{content}

请返回JSON格式：
{{
    "modules": [
        {{
            "name": "模块名称",
            "description": "模块描述",
            "type": "页面类型"
        }}
    ],
    "total_modules": 数量
}}

识别规则：
1. 只识别页面级别的模块（如：首页、详情页、创建页、编辑页）
2. 不要识别小组件（如：按钮、输入框、下拉框）
3. 每个二级标题(##)通常代表一个页面模块
4. 弹窗、对话框如果功能独立也算一个模块
5. 模块名称要简洁明了（如：跨域训练首页、新建任务页）
6. 页面类型可以是：列表页、详情页、创建页、编辑页、弹窗等

注意：
- 不要过度拆分，一个完整的页面就是一个模块
- 避免识别出过多的小模块
"#
    )
}

fn category_focus(category: Category) -> &'static str {
    match category {
        Category::GlobalPage => {
            "重点检查导航栏、头部(Header)、底部(Footer)等通用组件在各页面间的一致性，包括导航高亮、Logo与用户信息区域、页脚链接与版权信息"
        }
        Category::ScenarioFlow => {
            "覆盖多步骤操作流程与完整操作路径，包括表单向导的步骤切换、返回或中断后的状态保持、流程完成后的结果反馈"
        }
        Category::ExceptionScenario => {
            "覆盖错误处理与边界条件，包括网络异常、接口报错、输入边界值验证、权限不足、空数据状态的提示与兜底展示"
        }
        Category::UpstreamDownstream => {
            "覆盖数据传递与状态同步，包括跨页面数据传递是否正确、接口返回数据的展示一致性、操作后上下游页面状态是否同步刷新"
        }
    }
}

/// Extra guidance for the selected enhancement categories. Empty when none
/// are selected.
pub fn category_guidance(categories: &[Category]) -> String {
    if categories.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n请额外关注以下建议选项，每个选项至少生成1-2个针对性用例：\n");
    for category in categories {
        out.push_str(&format!(
            "- 【{}】{}\n",
            category.label(),
            category_focus(*category)
        ));
    }
    out
}

fn principle_list() -> String {
    DesignPrinciple::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {} - {}", i + 1, p.label(), p.focus()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the case-generation request for one module.
///
/// `content` and `rules` are expected to be already truncated to their
/// configured prefixes.
pub fn build_case_prompt(
    module: &Module,
    content: &str,
    rules: &str,
    categories: &[Category],
) -> String {
    let rules_context = if rules.trim().is_empty() {
        String::new()
    } else {
        format!("\n请严格遵循以下UI走查规则：\n\n{rules}\n\n")
    };
    let principle_names = DesignPrinciple::ALL
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join("、");
    let field_names = REQUIRED_FIELDS.join("、");

    format!(
        r#"{rules_context}
请为"{name}"模块生成UI走查用例。

模块信息：
- 模块名称：{name}
- 模块描述：{description}

需求文档片段：
{content}

必须遵循8大UI走查原则：
{principles}
{guidance}
严格按照CSV格式规范返回JSON：
{{
    "cases": [
        {{
            "{check_point}": "具体的设计元素或组件",
            "{principle}": "从8大原则中选择",
            "{check_item}": "描述具体的检查内容",
            "{priority}": "高/中/低",
            "{expected}": "设计稿中的具体规范或期望表现"
        }}
    ]
}}

关键要求：
1. 生成8-12个用例，覆盖8大UI走查原则
2. 字段名必须完全匹配：{field_names}
3. 优先级只能是：高、中、低（高优先级占60%以上）
4. 所有文本内容保持单行，不要包含换行符
5. 预期结果必须具体可验证，引用设计规范的具体数值（如：字号16px，颜色#262626，间距24px）
6. 检查点基于具体的设计元素或组件（如按钮、输入框、列表等）
7. 设计原则必须从8大原则中选择：{principle_names}
8. 确保覆盖所有关键UI元素、组件状态、交互场景和异常流程
"#,
        name = module.name.trim(),
        description = module.description.trim(),
        principles = principle_list(),
        guidance = category_guidance(categories),
        check_point = labels::CHECK_POINT,
        principle = labels::PRINCIPLE,
        check_item = labels::CHECK_ITEM,
        priority = labels::PRIORITY,
        expected = labels::EXPECTED,
    )
}
