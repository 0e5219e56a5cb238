//! Orchestration layer for a11ysweep.
//!
//! This crate coordinates validation work across many documents:
//! - HTTP page fetching behind the [`PageFetcher`] trait
//! - Outbound link extraction and filtering for crawls
//! - A parallel dispatcher with a bounded worker pool and result caching
//! - A bounded-frontier breadth-first website crawler
//! - A batch processor for large static file sets

pub mod batch;
pub mod crawl;
pub mod dispatch;
pub mod extract;
pub mod fetch;

pub use batch::{BatchProcessor, aggregate};
pub use crawl::{CrawlConfig, Crawler};
pub use dispatch::Dispatcher;
pub use extract::{LinkFilter, outbound_links};
pub use fetch::{FetchConfig, HttpFetcher, PageFetcher};
