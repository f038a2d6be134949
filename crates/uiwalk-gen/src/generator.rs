//! Per-module case generation with template fallback.
//!
//! Each stage of the model path reports failure as a [`GenerationError`] value.
//! [`select_or_template`] inspects that result and substitutes the template
//! cases, so a generation call returns cases for every well-formed module.

use crate::prompts::{
    ANALYSIS_SYSTEM, CASE_SYSTEM, build_analysis_prompt, build_case_prompt, truncate_chars,
};
use crate::provider::{LlmProvider, ProviderError, RequestSettings, create_provider};
use crate::response::{self, Payload};
use crate::templates;
use std::time::Duration;
use uiwalk_core::config::LlmConfig;
use uiwalk_core::{Category, Module, Priority, TestCase};
use uiwalk_parser::{
    AnalysisError, AnalyzedModule, DocumentFormat, ModuleAnalyzer, Recognizer,
};

/// Record-count range the prompt asks the model for.
pub const TARGET_CASES_PER_MODULE: std::ops::RangeInclusive<usize> = 8..=12;
/// Share of High-priority records the prompt asks the model for.
pub const TARGET_HIGH_SHARE: f64 = 0.6;

/// Why the model path produced no cases for a module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("no language model configured")]
    NoProvider,
    #[error("provider call failed: {0}")]
    Provider(String),
    #[error("response is not valid JSON: {0}")]
    MalformedPayload(String),
    #[error("response contained no cases")]
    EmptyResponse,
    #[error("no valid cases after validation ({dropped} dropped)")]
    NoValidCases { dropped: usize },
}

/// A module descriptor that cannot be generated for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("module descriptor has an empty name")]
pub struct InvalidModule;

/// Characters of each input forwarded to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorLimits {
    pub content_prefix_chars: usize,
    pub rules_prefix_chars: usize,
    pub analysis_prefix_chars: usize,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        Self {
            content_prefix_chars: 1500,
            rules_prefix_chars: 3000,
            analysis_prefix_chars: 3000,
        }
    }
}

impl From<&LlmConfig> for GeneratorLimits {
    fn from(config: &LlmConfig) -> Self {
        Self {
            content_prefix_chars: config.content_prefix_chars,
            rules_prefix_chars: config.rules_prefix_chars,
            analysis_prefix_chars: config.analysis_prefix_chars,
        }
    }
}

/// Where a module's cases came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseSource {
    Ai {
        model: String,
        /// Records rejected by validation.
        dropped: usize,
        /// Whether the control-character repair pass was needed.
        repaired: bool,
    },
    Template {
        reason: GenerationError,
    },
}

/// The cases generated for one module.
#[derive(Debug, Clone)]
pub struct CaseBatch {
    pub module: String,
    pub cases: Vec<TestCase>,
    pub source: CaseSource,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

impl CaseBatch {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, CaseSource::Template { .. })
    }

    /// Share of High-priority records, 0.0 for an empty batch.
    pub fn high_share(&self) -> f64 {
        if self.cases.is_empty() {
            return 0.0;
        }
        let high = self
            .cases
            .iter()
            .filter(|c| c.priority == Priority::High)
            .count();
        high as f64 / self.cases.len() as f64
    }

    /// Whether the batch meets the count and priority targets given to the
    /// model. Informational only; batches outside the targets are kept.
    pub fn meets_quality_targets(&self) -> bool {
        TARGET_CASES_PER_MODULE.contains(&self.cases.len()) && self.high_share() >= TARGET_HIGH_SHARE
    }
}

/// Validated output of a successful model call.
#[derive(Debug, Clone)]
pub struct AiCases {
    pub cases: Vec<TestCase>,
    pub model: String,
    pub dropped: usize,
    pub repaired: bool,
}

/// Token usage of one attempt, reported even when the attempt failed.
#[derive(Debug, Clone, Copy, Default)]
struct Usage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

/// Choose between the model's cases and the template cases.
///
/// Any failure of the model path yields `synthesize(module_name, categories)`.
pub fn select_or_template(
    module_name: &str,
    categories: &[Category],
    outcome: Result<AiCases, GenerationError>,
) -> (Vec<TestCase>, CaseSource) {
    match outcome {
        Ok(ai) => (
            ai.cases,
            CaseSource::Ai {
                model: ai.model,
                dropped: ai.dropped,
                repaired: ai.repaired,
            },
        ),
        Err(reason) => {
            if reason != GenerationError::NoProvider {
                tracing::warn!(module = module_name, %reason, "falling back to template cases");
            }
            (
                templates::synthesize(module_name, categories),
                CaseSource::Template { reason },
            )
        }
    }
}

/// Turns modules into walk-through cases, via a language model when one is
/// configured.
pub struct CaseGenerator {
    provider: Option<Box<dyn LlmProvider>>,
    rules: String,
    limits: GeneratorLimits,
}

impl CaseGenerator {
    pub fn new(provider: Option<Box<dyn LlmProvider>>) -> Self {
        Self {
            provider,
            rules: String::new(),
            limits: GeneratorLimits::default(),
        }
    }

    /// A generator that always uses the template cases.
    pub fn template_only() -> Self {
        Self::new(None)
    }

    /// Build a generator from configuration. A missing or placeholder API key
    /// gives a template-only generator; an unknown provider name is an error.
    pub fn from_config(config: &LlmConfig, rules: String) -> Result<Self, ProviderError> {
        let provider = match config.resolve_api_key() {
            Some(key) => {
                let settings = RequestSettings {
                    temperature: config.temperature,
                    max_tokens: config.max_tokens,
                    timeout: Duration::from_secs(config.timeout_secs),
                };
                let provider = create_provider(
                    &config.provider,
                    &key,
                    config.model.as_deref(),
                    config.base_url.as_deref(),
                    settings,
                )?;
                tracing::info!(
                    provider = %config.provider,
                    model = provider.model_name(),
                    "language model configured"
                );
                Some(provider)
            }
            None => {
                tracing::info!(
                    provider = %config.provider,
                    "no API key configured, using template cases"
                );
                None
            }
        };
        Ok(Self::new(provider)
            .with_rules(rules)
            .with_limits(GeneratorLimits::from(config)))
    }

    #[must_use]
    pub fn with_rules(mut self, rules: String) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: GeneratorLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn provider(&self) -> Option<&dyn LlmProvider> {
        self.provider.as_deref()
    }

    pub fn limits(&self) -> &GeneratorLimits {
        &self.limits
    }

    pub fn rules(&self) -> &str {
        &self.rules
    }

    /// Generate cases for one module.
    ///
    /// Only an empty module name is an error. Provider, parsing and validation
    /// failures all produce the template cases for the module.
    pub fn generate_cases(
        &self,
        content: &str,
        module: &Module,
        categories: &[Category],
    ) -> Result<CaseBatch, InvalidModule> {
        let name = module.name.trim();
        if name.is_empty() {
            return Err(InvalidModule);
        }

        let mut usage = Usage::default();
        let outcome = self.try_ai_cases(content, module, name, categories, &mut usage);
        let (cases, source) = select_or_template(name, categories, outcome);

        let batch = CaseBatch {
            module: name.to_string(),
            cases,
            source,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
        };
        if let CaseSource::Ai { dropped, .. } = &batch.source {
            tracing::info!(module = name, count = batch.cases.len(), dropped, "model cases accepted");
            if !batch.meets_quality_targets() {
                tracing::debug!(
                    module = name,
                    count = batch.cases.len(),
                    high_share = batch.high_share(),
                    "batch outside requested count or priority targets"
                );
            }
        }
        Ok(batch)
    }

    fn try_ai_cases(
        &self,
        content: &str,
        module: &Module,
        name: &str,
        categories: &[Category],
        usage: &mut Usage,
    ) -> Result<AiCases, GenerationError> {
        let provider = self.provider.as_deref().ok_or(GenerationError::NoProvider)?;

        let prompt = build_case_prompt(
            module,
            truncate_chars(content, self.limits.content_prefix_chars),
            truncate_chars(&self.rules, self.limits.rules_prefix_chars),
            categories,
        );
        let response = provider
            .complete(CASE_SYSTEM, &prompt)
            .map_err(|e| GenerationError::Provider(e.to_string()))?;
        usage.input_tokens = response.input_tokens;
        usage.output_tokens = response.output_tokens;

        let Payload { value, repaired } = response::parse_payload(&response.text)
            .map_err(|e| GenerationError::MalformedPayload(e.0))?;
        if repaired {
            tracing::debug!(module = name, "response needed control-character repair");
        }

        let raw = response::raw_cases(&value);
        if raw.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let mut cases = Vec::with_capacity(raw.len());
        let mut dropped = 0;
        for record in raw {
            match response::validate_record(record, name) {
                Ok(case) => cases.push(case),
                Err(reason) => {
                    dropped += 1;
                    tracing::warn!(module = name, %reason, "dropping generated record");
                }
            }
        }
        if cases.is_empty() {
            return Err(GenerationError::NoValidCases { dropped });
        }

        Ok(AiCases {
            cases,
            model: provider.model_name().to_string(),
            dropped,
            repaired,
        })
    }

    /// Ask the model for the document's page-level modules.
    fn try_analysis(&self, content: &str) -> Result<Vec<AnalyzedModule>, GenerationError> {
        let provider = self.provider.as_deref().ok_or(GenerationError::NoProvider)?;
        let prompt = build_analysis_prompt(truncate_chars(
            content,
            self.limits.analysis_prefix_chars,
        ));
        let response = provider
            .complete(ANALYSIS_SYSTEM, &prompt)
            .map_err(|e| GenerationError::Provider(e.to_string()))?;
        let payload = response::parse_payload(&response.text)
            .map_err(|e| GenerationError::MalformedPayload(e.0))?;
        let modules = response::analyzed_modules(&payload.value);
        if modules.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        tracing::debug!(
            count = modules.len(),
            reported = ?payload.value.get("total_modules").and_then(serde_json::Value::as_u64),
            "module analysis returned"
        );
        Ok(modules)
    }

    /// Recognize the document's modules, asking the model first when one is
    /// configured. Never fails; any model failure uses the heading scan.
    pub fn analyze_requirement(
        &self,
        content: &str,
        format: DocumentFormat,
        max_modules: usize,
    ) -> Vec<Module> {
        let recognizer = Recognizer::new().with_max_modules(max_modules);
        if self.provider.is_some() {
            recognizer.with_analyzer(self).recognize(content, format)
        } else {
            recognizer.recognize(content, format)
        }
    }
}

impl ModuleAnalyzer for CaseGenerator {
    fn analyze(&self, content: &str) -> Result<Vec<AnalyzedModule>, AnalysisError> {
        self.try_analysis(content).map_err(|e| match e {
            GenerationError::NoProvider | GenerationError::Provider(_) => {
                AnalysisError::Unavailable(e.to_string())
            }
            GenerationError::MalformedPayload(msg) => AnalysisError::Malformed(msg),
            GenerationError::EmptyResponse | GenerationError::NoValidCases { .. } => {
                AnalysisError::Empty
            }
        })
    }
}
