//! Run-level orchestration: module blocks, category blocks, numbering.

use crate::cost::CostTracker;
use crate::generator::{CaseBatch, CaseGenerator, CaseSource, InvalidModule};
use crate::templates;
use uiwalk_core::{Category, Module, PassStatus, Priority, ReviewType, TestCase};

/// Inputs for one generation run.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub content: &'a str,
    pub modules: &'a [Module],
    pub categories: &'a [Category],
    pub review_type: ReviewType,
    /// Generate module blocks on the rayon pool. Output order is unaffected.
    pub parallel: bool,
}

/// Callbacks fired while a run progresses. `on_module_done` may be called from
/// worker threads, in completion order.
pub trait GenerationObserver: Sync {
    fn on_start(&self, _modules: usize) {}
    fn on_module_done(&self, _batch: &CaseBatch) {}
    fn on_finish(&self) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}

/// How one module's block was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    pub module: String,
    pub case_count: usize,
    /// `None` when the model's cases were used.
    pub fallback_reason: Option<String>,
    pub dropped_records: usize,
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub cases: Vec<TestCase>,
    pub modules: Vec<ModuleOutcome>,
    pub category_blocks: Vec<Category>,
    pub review_type: ReviewType,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cost_usd: f64,
}

impl GenerationReport {
    /// Modules whose cases came from templates.
    pub fn fallback_count(&self) -> usize {
        self.modules
            .iter()
            .filter(|m| m.fallback_reason.is_some())
            .count()
    }

    pub fn high_priority_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.priority == Priority::High)
            .count()
    }
}

/// Drives a [`CaseGenerator`] over a whole request.
pub struct Coordinator<'a> {
    generator: &'a CaseGenerator,
}

impl<'a> Coordinator<'a> {
    pub fn new(generator: &'a CaseGenerator) -> Self {
        Self { generator }
    }

    /// Generate the full, numbered case list for a request.
    ///
    /// Module blocks come first in request order, then one block per distinct
    /// category in first-occurrence order. Case IDs run gaplessly from 001 in
    /// that final order.
    pub fn generate(
        &self,
        request: &GenerationRequest<'_>,
        observer: &dyn GenerationObserver,
    ) -> Result<GenerationReport, InvalidModule> {
        if request.modules.iter().any(|m| m.name.trim().is_empty()) {
            return Err(InvalidModule);
        }
        let categories = Category::dedup(request.categories);

        observer.on_start(request.modules.len());
        let run_one = |module: &Module| {
            let batch = self
                .generator
                .generate_cases(request.content, module, &categories)?;
            observer.on_module_done(&batch);
            Ok::<_, InvalidModule>(batch)
        };
        let batches: Vec<CaseBatch> = if request.parallel {
            use rayon::prelude::*;
            request
                .modules
                .par_iter()
                .map(run_one)
                .collect::<Result<_, _>>()?
        } else {
            request
                .modules
                .iter()
                .map(run_one)
                .collect::<Result<_, _>>()?
        };
        observer.on_finish();

        let mut tracker = self
            .generator
            .provider()
            .map(CostTracker::new)
            .unwrap_or_default();
        let mut cases = Vec::new();
        let mut outcomes = Vec::with_capacity(batches.len());
        for batch in batches {
            tracker.record(batch.input_tokens, batch.output_tokens);
            let (fallback_reason, dropped_records) = match &batch.source {
                CaseSource::Ai { dropped, .. } => (None, *dropped),
                CaseSource::Template { reason } => (Some(reason.to_string()), 0),
            };
            outcomes.push(ModuleOutcome {
                module: batch.module,
                case_count: batch.cases.len(),
                fallback_reason,
                dropped_records,
            });
            cases.extend(batch.cases);
        }
        for &category in &categories {
            cases.extend(templates::category_module_cases(category));
        }
        number_cases(&mut cases, request.review_type);

        tracing::info!(
            cases = cases.len(),
            modules = outcomes.len(),
            category_blocks = categories.len(),
            review_type = %request.review_type,
            "generation complete"
        );

        Ok(GenerationReport {
            cases,
            modules: outcomes,
            category_blocks: categories,
            review_type: request.review_type,
            total_input_tokens: tracker.total_input_tokens,
            total_output_tokens: tracker.total_output_tokens,
            total_cost_usd: tracker.total_cost_usd(),
        })
    }
}

/// Assign sequential IDs and reset review state.
pub fn number_cases(cases: &mut [TestCase], review_type: ReviewType) {
    for (i, case) in cases.iter_mut().enumerate() {
        case.case_id = review_type.case_number(i + 1);
        case.status = PassStatus::Pending;
        case.notes.clear();
    }
}
