//! Core types and shared functionality for a11ysweep.
//!
//! This crate provides:
//! - The report data model (findings, per-document reports, aggregates)
//! - The rule registry with the built-in WCAG 2.2 checks
//! - The content-addressed result cache
//! - Unified error types
//! - Configuration loading and validation

pub mod cache;
pub mod config;
pub mod error;
pub mod report;
pub mod rules;

pub use cache::ReportCache;
pub use config::AppConfig;
pub use error::Error;
pub use report::{AggregateError, AggregateReport, Document, Finding, Level, Report, Severity};
pub use rules::{Rule, RuleSet, builtin_rules, parse_document};
