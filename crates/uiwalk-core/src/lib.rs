//! Core types for uiwalk, the UI walk-through case generator.
//!
//! Provides the recognized page/feature [`module::Module`], the walk-through
//! [`case::TestCase`] record with its enumerated fields, layered configuration
//! ([`config::UiwalkConfig`]) and JSON run history ([`storage`]).

pub mod case;
pub mod config;
pub mod module;
pub mod storage;

pub use case::{
    Category, DesignPrinciple, ParseLabelError, PassStatus, Priority, ReviewType, TestCase,
};
pub use module::{Module, ModuleSet, PageType};
