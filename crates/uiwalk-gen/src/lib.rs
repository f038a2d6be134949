//! UI walk-through case generation.
//!
//! Each recognized module is sent to a language model for 8-12 structured
//! cases. Any failure on that path (no key, transport error, malformed JSON,
//! nothing valid after validation) substitutes deterministic template cases, so
//! a run always produces a complete, numbered case list.
//!
//! # Architecture
//!
//! - **provider**: `LlmProvider` trait with DeepSeek, OpenAI and Anthropic implementations
//! - **prompts**: Analysis and case-generation prompt text
//! - **response**: JSON extraction, control-character repair and record validation
//! - **templates**: Base cases and category supplements
//! - **generator**: Per-module generation with explicit template fallback
//! - **coordinator**: Module blocks, category blocks and gapless numbering
//! - **cost**: Pre-run cost estimation and runtime tracking
//! - **progress**: Terminal progress bars via `indicatif`

pub mod coordinator;
pub mod cost;
pub mod generator;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod response;
pub mod templates;

pub use coordinator::{
    Coordinator, GenerationObserver, GenerationReport, GenerationRequest, ModuleOutcome,
    NoopObserver,
};
pub use cost::{CostEstimate, CostTracker, estimate_cost};
pub use generator::{
    CaseBatch, CaseGenerator, CaseSource, GenerationError, GeneratorLimits, InvalidModule,
};
pub use progress::{GenerationProgress, SuspendedStderr};
pub use provider::{LlmProvider, LlmResponse, ProviderError, available_providers, create_provider};
pub use templates::synthesize;
