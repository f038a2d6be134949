use serde_json::json;
use std::time::Duration;
use uiwalk_core::{Category, Module, Priority};
use uiwalk_gen::generator::{CaseGenerator, CaseSource, GenerationError, GeneratorLimits};
use uiwalk_gen::provider::{LlmProvider, LlmResponse, OpenAiProvider, ProviderError, RequestSettings};
use uiwalk_gen::templates::synthesize;
use uiwalk_parser::DocumentFormat;

/// Provider that answers every request through a closure of (system, user).
struct Scripted<F> {
    reply: F,
}

fn scripted<F>(reply: F) -> Box<dyn LlmProvider>
where
    F: Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync + 'static,
{
    Box::new(Scripted { reply })
}

impl<F> LlmProvider for Scripted<F>
where
    F: Fn(&str, &str) -> Result<String, ProviderError> + Send + Sync,
{
    fn complete(&self, system: &str, user: &str) -> Result<LlmResponse, ProviderError> {
        (self.reply)(system, user).map(|text| LlmResponse {
            text,
            input_tokens: Some(1000),
            output_tokens: Some(400),
        })
    }
    fn model_name(&self) -> &str {
        "scripted"
    }
    fn cost_per_mtok_input(&self) -> f64 {
        1.0
    }
    fn cost_per_mtok_output(&self) -> f64 {
        2.0
    }
}

fn record(check_point: &str, priority: &str) -> serde_json::Value {
    json!({
        "检查点": check_point,
        "设计原则": "视觉一致性原则",
        "检查项": format!("检查{check_point}的样式"),
        "优先级": priority,
        "预期结果/设计标准": "字号14px，颜色#262626"
    })
}

fn ten_cases() -> String {
    let cases: Vec<_> = (0..10)
        .map(|i| record(&format!("元素{i}"), if i < 7 { "高" } else { "中" }))
        .collect();
    json!({ "cases": cases }).to_string()
}

#[test]
fn test_model_cases_are_used() {
    let generator = CaseGenerator::new(Some(scripted(|_, _| Ok(ten_cases()))));
    let batch = generator
        .generate_cases("## 首页", &Module::named("首页"), &[])
        .unwrap();
    assert_eq!(batch.cases.len(), 10);
    assert!(matches!(
        batch.source,
        CaseSource::Ai { dropped: 0, repaired: false, .. }
    ));
    assert!(batch.cases.iter().all(|c| c.module == "首页"));
    assert!(batch.cases.iter().all(|c| c.case_id.is_empty()));
    assert_eq!(batch.input_tokens, Some(1000));
    assert!(batch.meets_quality_targets());
}

#[test]
fn test_provider_error_falls_back() {
    let generator = CaseGenerator::new(Some(scripted(|_, _| {
        Err(ProviderError::Api {
            status: 500,
            message: "overloaded".into(),
        })
    })));
    let categories = [Category::ExceptionScenario];
    let batch = generator
        .generate_cases("", &Module::named("新建任务"), &categories)
        .unwrap();
    assert_eq!(batch.cases, synthesize("新建任务", &categories));
    assert!(matches!(
        batch.source,
        CaseSource::Template {
            reason: GenerationError::Provider(_)
        }
    ));
}

#[test]
fn test_empty_cases_array_falls_back() {
    let generator = CaseGenerator::new(Some(scripted(|_, _| {
        Ok(r#"{"cases": []}"#.to_string())
    })));
    let categories = [Category::GlobalPage, Category::UpstreamDownstream];
    let batch = generator
        .generate_cases("", &Module::named("Home Page"), &categories)
        .unwrap();
    assert_eq!(batch.cases, synthesize("Home Page", &categories));
    assert_eq!(
        batch.source,
        CaseSource::Template {
            reason: GenerationError::EmptyResponse
        }
    );
}

#[test]
fn test_unparseable_reply_falls_back() {
    let generator = CaseGenerator::new(Some(scripted(|_, _| {
        Ok("抱歉，我无法生成用例。".to_string())
    })));
    let batch = generator
        .generate_cases("", &Module::named("首页"), &[])
        .unwrap();
    assert_eq!(batch.cases.len(), 8);
    assert!(matches!(
        batch.source,
        CaseSource::Template {
            reason: GenerationError::MalformedPayload(_)
        }
    ));
}

#[test]
fn test_control_characters_are_repaired() {
    let reply = "```json\n{\"cases\": [{\"检查点\": \"按钮\", \"设计原则\": \"组件状态完整性原则\", \
                 \"检查项\": \"检查按钮\n悬停态\", \"优先级\": \"高\", \"预期结果/设计标准\": \"背景#1890FF\"}]}\n```";
    let generator = CaseGenerator::new(Some(scripted(move |_, _| Ok(reply.to_string()))));
    let batch = generator
        .generate_cases("", &Module::named("首页"), &[])
        .unwrap();
    assert_eq!(batch.cases.len(), 1);
    assert_eq!(batch.cases[0].check_item, "检查按钮 悬停态");
    assert!(matches!(batch.source, CaseSource::Ai { repaired: true, .. }));
}

#[test]
fn test_invalid_records_are_dropped() {
    let reply = json!({
        "cases": [
            record("标题", "高"),
            record("按钮", "紧急"),
            { "检查点": "缺字段" },
            "not a record",
            record("列表", "低")
        ]
    })
    .to_string();
    let generator = CaseGenerator::new(Some(scripted(move |_, _| Ok(reply.clone()))));
    let batch = generator
        .generate_cases("", &Module::named("首页"), &[])
        .unwrap();
    let points: Vec<_> = batch.cases.iter().map(|c| c.check_point.as_str()).collect();
    assert_eq!(points, vec!["标题", "列表"]);
    assert_eq!(batch.cases[1].priority, Priority::Low);
    assert!(matches!(batch.source, CaseSource::Ai { dropped: 3, .. }));
}

#[test]
fn test_all_records_invalid_falls_back() {
    let reply = json!({ "cases": [ { "检查点": "x" }, record("y", "urgent") ] }).to_string();
    let generator = CaseGenerator::new(Some(scripted(move |_, _| Ok(reply.clone()))));
    let batch = generator
        .generate_cases("", &Module::named("首页"), &[Category::ScenarioFlow])
        .unwrap();
    assert_eq!(batch.cases, synthesize("首页", &[Category::ScenarioFlow]));
    assert_eq!(
        batch.source,
        CaseSource::Template {
            reason: GenerationError::NoValidCases { dropped: 2 }
        }
    );
}

#[test]
fn test_prompt_carries_truncated_inputs() {
    let generator = CaseGenerator::new(Some(scripted(|system, user| {
        assert!(system.contains("UI测试工程师"));
        assert!(user.contains("走查规则"));
        assert!(user.contains("RULE"));
        assert!(!user.contains("RULEX"));
        assert!(user.contains("abcde"));
        assert!(!user.contains("abcdef"));
        assert!(user.contains("【全局页面】"));
        Ok(ten_cases())
    })))
    .with_rules("RULEX".into())
    .with_limits(GeneratorLimits {
        content_prefix_chars: 5,
        rules_prefix_chars: 4,
        analysis_prefix_chars: 10,
    });
    let batch = generator
        .generate_cases("abcdefgh", &Module::named("首页"), &[Category::GlobalPage])
        .unwrap();
    assert!(!batch.is_fallback());
}

#[test]
fn test_unreachable_endpoint_matches_templates() {
    let settings = RequestSettings {
        timeout: Duration::from_secs(2),
        ..RequestSettings::default()
    };
    let provider = OpenAiProvider::new(
        "sk-test".into(),
        None,
        Some("http://127.0.0.1:9".into()),
        settings,
    );
    let generator = CaseGenerator::new(Some(Box::new(provider)));
    let categories = [Category::ExceptionScenario, Category::GlobalPage];
    let batch = generator
        .generate_cases("## 首页", &Module::named("首页"), &categories)
        .unwrap();
    assert_eq!(batch.cases, synthesize("首页", &categories));
    assert!(batch.is_fallback());
}

#[test]
fn test_analysis_uses_model_modules() {
    let generator = CaseGenerator::new(Some(scripted(|system, _| {
        assert!(system.contains("需求分析"));
        Ok(json!({
            "modules": [
                {"name": "任务列表", "description": "全部任务", "type": "列表页"},
                {"name": "新建任务", "description": "", "type": ""}
            ],
            "total_modules": 2
        })
        .to_string())
    })));
    let modules = generator.analyze_requirement("## 其他标题", DocumentFormat::Markdown, 50);
    let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["任务列表", "新建任务"]);
}

#[test]
fn test_analysis_failure_uses_heading_scan() {
    let generator = CaseGenerator::new(Some(scripted(|_, _| {
        Ok(r#"{"modules": []}"#.to_string())
    })));
    let modules = generator.analyze_requirement(
        "# 需求\n## Home Page\n内容\n## Create Task\n",
        DocumentFormat::Markdown,
        50,
    );
    let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Home Page", "Create Task"]);
}

#[test]
fn test_template_only_analysis_skips_model() {
    let generator = CaseGenerator::template_only();
    let modules = generator.analyze_requirement("## 首页\n## 设置\n", DocumentFormat::Markdown, 1);
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].name, "首页");
}
