//! Batch processor for large static file sets.
//!
//! Partitions a file list into fixed-size batches processed one at a time;
//! concurrency is bounded to within a batch by the dispatcher's worker
//! pool, so peak in-flight document count never exceeds the batch size.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use sweep_core::{AggregateReport, Document, Error, Report};

use crate::dispatch::Dispatcher;

/// Drives the parallel dispatcher over chunked file sets.
pub struct BatchProcessor {
    dispatcher: Arc<Dispatcher>,
    batch_size: usize,
}

impl BatchProcessor {
    pub fn new(dispatcher: Arc<Dispatcher>, batch_size: usize) -> Self {
        Self { dispatcher, batch_size: batch_size.max(1) }
    }

    /// Validate a list of HTML files in batches.
    ///
    /// A read failure yields an error-only report for that path without
    /// aborting the batch; every input path has an entry in the result.
    pub async fn process_files(&self, paths: &[PathBuf]) -> HashMap<PathBuf, Report> {
        let mut results = HashMap::new();
        let batches = paths.len().div_ceil(self.batch_size);

        for (index, batch) in paths.chunks(self.batch_size).enumerate() {
            tracing::info!(batch = index + 1, of = batches, files = batch.len(), "processing batch");

            let mut documents = Vec::new();
            let mut uri_to_path = HashMap::new();

            for path in batch {
                let uri = file_uri(path);
                match tokio::fs::read_to_string(path).await {
                    Ok(content) => {
                        uri_to_path.insert(uri.clone(), path.clone());
                        documents.push(Document::new(uri, content));
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "failed to read file");
                        results.insert(
                            path.clone(),
                            Report::from_document_error(uri, format!("failed to read file: {e}")),
                        );
                    }
                }
            }

            let mut batch_results = self.dispatcher.validate_many(documents).await;

            // Map synthetic URIs back to the original paths.
            for (uri, path) in uri_to_path {
                if let Some(report) = batch_results.remove(&uri) {
                    results.insert(path, report);
                }
            }
        }

        results
    }

    /// Validate every file in a directory whose name matches `pattern`
    /// (shell-style `*`/`?` wildcards, e.g. `*.html`).
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid or the directory cannot
    /// be listed.
    pub async fn process_directory(&self, dir: &Path, pattern: &str) -> Result<HashMap<PathBuf, Report>, Error> {
        let matcher = glob_to_regex(pattern)?;

        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|name| matcher.is_match(name));
            if matches && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        tracing::info!(dir = %dir.display(), pattern, files = paths.len(), "expanded directory");
        Ok(self.process_files(&paths).await)
    }
}

/// Merge per-document reports into one aggregate.
///
/// Pure, order-independent fold: documents are absorbed in source-URI order
/// so the output is deterministic regardless of map iteration order.
pub fn aggregate<K>(results: &HashMap<K, Report>) -> AggregateReport {
    let mut reports: Vec<&Report> = results.values().collect();
    reports.sort_by_key(|report| &report.source_uri);

    let mut merged = AggregateReport::default();
    for report in reports {
        merged.absorb(report);
    }
    merged
}

/// Synthetic URI for a file path, absolute where possible.
fn file_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

/// Convert a shell-style wildcard pattern into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex, Error> {
    let mut regex = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|e| Error::InvalidPattern(format!("'{pattern}': {e}")))
}
