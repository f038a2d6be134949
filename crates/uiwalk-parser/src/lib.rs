//! Module recognition for requirements documents.
//!
//! Segments markdown, plain text and word-derived text into page-level
//! [`Module`](uiwalk_core::Module)s. A [`ModuleAnalyzer`] may take over the
//! segmentation; any analyzer failure falls back to the heading scan.

pub mod format;
pub mod headings;
pub mod page_type;
pub mod recognizer;
pub mod stats;

pub use format::{DocumentFormat, RecognizeError};
pub use page_type::infer_page_type;
pub use recognizer::{AnalysisError, AnalyzedModule, ModuleAnalyzer, Recognizer, recognize};
pub use stats::DocumentStats;
