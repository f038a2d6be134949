//! Cost estimation and usage tracking for case generation.

use crate::generator::GeneratorLimits;
use crate::prompts::{CASE_SYSTEM, build_case_prompt, truncate_chars};
use crate::provider::LlmProvider;
use uiwalk_core::{Category, Module};

/// Rough reply size for one module: about ten records of ~160 characters.
const REPLY_CHARS_PER_MODULE: usize = 1600;

fn chars_to_tokens(chars: usize) -> u64 {
    (chars as u64).div_ceil(4)
}

/// Pre-computed cost estimate for a generation run.
#[derive(Debug, Clone)]
pub struct CostEstimate {
    /// Modules that will be sent to the model, one request each.
    pub modules: usize,
    /// Category blocks, always built from templates at no cost.
    pub category_blocks: usize,
    /// Estimated input tokens across all requests.
    pub estimated_input_tokens: u64,
    /// Estimated output tokens across all requests.
    pub estimated_output_tokens: u64,
    /// Estimated total cost in USD.
    pub estimated_cost_usd: f64,
    /// Model name.
    pub model: String,
}

impl std::fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cost Estimate:")?;
        writeln!(f, "  Model requests: {} modules", self.modules)?;
        writeln!(
            f,
            "  Category blocks (template, free): {}",
            self.category_blocks
        )?;
        writeln!(
            f,
            "  Estimated tokens: ~{} input, ~{} output",
            self.estimated_input_tokens, self.estimated_output_tokens
        )?;
        writeln!(f, "  Model: {}", self.model)?;
        write!(f, "  Estimated cost: ${:.4}", self.estimated_cost_usd)
    }
}

/// Running token and cost totals for one run.
#[derive(Debug, Default, Clone)]
pub struct CostTracker {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    input_rate: f64,
    output_rate: f64,
}

impl CostTracker {
    pub fn new(provider: &dyn LlmProvider) -> Self {
        Self {
            total_input_tokens: 0,
            total_output_tokens: 0,
            input_rate: provider.cost_per_mtok_input(),
            output_rate: provider.cost_per_mtok_output(),
        }
    }

    /// Record token usage from a response.
    pub fn record(&mut self, input_tokens: Option<u64>, output_tokens: Option<u64>) {
        if let Some(t) = input_tokens {
            self.total_input_tokens += t;
        }
        if let Some(t) = output_tokens {
            self.total_output_tokens += t;
        }
    }

    /// Current total cost in USD.
    pub fn total_cost_usd(&self) -> f64 {
        (self.total_input_tokens as f64 / 1_000_000.0) * self.input_rate
            + (self.total_output_tokens as f64 / 1_000_000.0) * self.output_rate
    }
}

/// Estimate generation cost without making API calls.
///
/// Builds each module's actual prompt and applies the 4-chars-per-token
/// heuristic to it and to an assumed reply size.
pub fn estimate_cost(
    provider: &dyn LlmProvider,
    content: &str,
    rules: &str,
    modules: &[Module],
    categories: &[Category],
    limits: &GeneratorLimits,
) -> CostEstimate {
    let content = truncate_chars(content, limits.content_prefix_chars);
    let rules = truncate_chars(rules, limits.rules_prefix_chars);
    let categories = Category::dedup(categories);

    let input_chars: usize = modules
        .iter()
        .map(|m| {
            build_case_prompt(m, content, rules, &categories).chars().count()
                + CASE_SYSTEM.chars().count()
        })
        .sum();
    let estimated_input_tokens = chars_to_tokens(input_chars);
    let estimated_output_tokens = chars_to_tokens(REPLY_CHARS_PER_MODULE * modules.len());

    let estimated_cost_usd = (estimated_input_tokens as f64 / 1_000_000.0)
        * provider.cost_per_mtok_input()
        + (estimated_output_tokens as f64 / 1_000_000.0) * provider.cost_per_mtok_output();

    CostEstimate {
        modules: modules.len(),
        category_blocks: categories.len(),
        estimated_input_tokens,
        estimated_output_tokens,
        estimated_cost_usd,
        model: provider.model_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{LlmResponse, ProviderError};

    struct Priced;

    impl LlmProvider for Priced {
        fn complete(&self, _system: &str, _user: &str) -> Result<LlmResponse, ProviderError> {
            Err(ProviderError::EmptyResponse)
        }
        fn model_name(&self) -> &str {
            "priced"
        }
        fn cost_per_mtok_input(&self) -> f64 {
            1.0
        }
        fn cost_per_mtok_output(&self) -> f64 {
            2.0
        }
    }

    #[test]
    fn test_tracker_accumulates() {
        let mut tracker = CostTracker::new(&Priced);
        tracker.record(Some(500_000), Some(250_000));
        tracker.record(None, Some(250_000));
        assert_eq!(tracker.total_input_tokens, 500_000);
        assert_eq!(tracker.total_output_tokens, 500_000);
        assert!((tracker.total_cost_usd() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_scales_with_modules() {
        let limits = GeneratorLimits::default();
        let one = estimate_cost(&Priced, "## 首页", "", &[Module::named("首页")], &[], &limits);
        let two = estimate_cost(
            &Priced,
            "## 首页",
            "",
            &[Module::named("首页"), Module::named("设置")],
            &[Category::GlobalPage, Category::GlobalPage],
            &limits,
        );
        assert_eq!(one.modules, 1);
        assert_eq!(two.category_blocks, 1);
        assert!(two.estimated_input_tokens > one.estimated_input_tokens);
        assert_eq!(two.estimated_output_tokens, 2 * one.estimated_output_tokens);
        assert!(two.to_string().contains("priced"));
    }

    #[test]
    fn test_estimate_empty_run_is_free() {
        let est = estimate_cost(&Priced, "text", "", &[], &[], &GeneratorLimits::default());
        assert_eq!(est.estimated_input_tokens, 0);
        assert_eq!(est.estimated_cost_usd, 0.0);
    }
}
