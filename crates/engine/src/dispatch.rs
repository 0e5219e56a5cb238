//! Parallel validation dispatcher.
//!
//! Runs many independent document validations concurrently across a bounded
//! worker pool, consulting the result cache before invoking the rule engine.
//! Rule evaluation is CPU-bound and runs on the blocking pool; the bound on
//! in-flight documents is the dispatcher's worker count.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::Mutex;

use sweep_core::cache::cache_key;
use sweep_core::{Document, Report, ReportCache, RuleSet};

use crate::fetch::PageFetcher;

/// Dispatches document validations across a fixed-size worker pool.
pub struct Dispatcher {
    rules: RuleSet,
    cache: Option<ReportCache>,
    workers: usize,
    /// One lock per cache key, shared across workers, so identical content
    /// submitted concurrently is computed once and the second caller is
    /// served from cache. Entries are dropped once no task holds them.
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Dispatcher {
    /// Create a dispatcher. `cache: None` disables caching entirely.
    pub fn new(rules: RuleSet, cache: Option<ReportCache>, workers: usize) -> Self {
        Self { rules, cache, workers, inflight: Mutex::new(HashMap::new()) }
    }

    /// Active rule IDs, exposed for callers building cache keys or summaries.
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.ids()
    }

    /// Validate many documents concurrently.
    ///
    /// The returned map is keyed by source URI and is only handed back once
    /// every submitted document has completed or failed; partial maps are
    /// never exposed.
    pub async fn validate_many(&self, documents: Vec<Document>) -> HashMap<String, Report> {
        futures::stream::iter(documents)
            .map(|document| async move {
                let report = self.validate_document(document).await;
                (report.source_uri.clone(), report)
            })
            .buffer_unordered(self.workers)
            .collect()
            .await
    }

    /// Validate a single document, using the cache when enabled.
    ///
    /// Never fails: fetch-level and rule-level problems are recorded on the
    /// returned report.
    pub async fn validate_document(&self, document: Document) -> Report {
        let Some(cache) = &self.cache else {
            return self.run_rules(document).await;
        };

        let ids = self.rules.ids();
        let key = cache_key(&document.content, &ids);
        let guard = self.keyed_lock(&key).await;

        if let Some(mut hit) = cache.get(&document.content, &ids).await {
            // The cached report may have been computed for a different URI
            // with identical content; re-tag it for this document.
            hit.source_uri = document.source_uri.clone();
            drop(guard);
            self.release_lock(&key).await;
            return hit;
        }

        let content = document.content.clone();
        let report = self.run_rules(document).await;
        cache.put(&content, &ids, &report).await;
        drop(guard);
        self.release_lock(&key).await;
        report
    }

    /// Fetch a single page and validate it.
    ///
    /// A fetch failure becomes an error-only report for the URL, matching
    /// how crawl and batch inputs degrade; it never surfaces as an `Err`.
    pub async fn validate_url(&self, fetcher: &dyn PageFetcher, url: &str) -> Report {
        match fetcher.fetch(url).await {
            Ok(content) => self.validate_document(Document::new(url, content)).await,
            Err(e) => {
                tracing::warn!(url, error = %e, "fetch failed");
                Report::from_document_error(url, e.to_string())
            }
        }
    }

    async fn run_rules(&self, document: Document) -> Report {
        let rules = self.rules.clone();
        let source_uri = document.source_uri.clone();
        match tokio::task::spawn_blocking(move || rules.run(&document.content, &document.source_uri)).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(uri = source_uri, error = %e, "rule engine task failed");
                Report::from_document_error(source_uri, format!("rule engine task failed: {e}"))
            }
        }
    }

    async fn keyed_lock(&self, key: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(inflight.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop a key's lock entry once the caller's guard is released and no
    /// other task holds a clone (waiters keep the strong count above one).
    async fn release_lock(&self, key: &str) {
        let mut inflight = self.inflight.lock().await;
        if inflight.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            inflight.remove(key);
        }
    }

    #[cfg(test)]
    async fn inflight_len(&self) -> usize {
        self.inflight.lock().await.len()
    }
}
