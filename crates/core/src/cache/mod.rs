//! Content-addressed result cache.
//!
//! Maps (document content, active rule set) to a previously computed report.
//! One JSON file per cache key under a configurable directory, wrapped in a
//! versioned envelope with the storage timestamp used for TTL checks.
//!
//! Caching is a performance optimization, never a correctness dependency:
//! every I/O failure degrades to a miss (reads) or a skipped write.

pub mod key;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::report::Report;

pub use key::{cache_key, rule_fingerprint};

const ENVELOPE_VERSION: u32 = 1;

/// On-disk representation of one cache entry.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    stored_at: DateTime<Utc>,
    report: Report,
}

/// File-backed cache of validation reports.
#[derive(Debug, Clone)]
pub struct ReportCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ReportCache {
    /// Open a cache rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>, ttl: Duration) -> Result<Self, Error> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::CacheIo(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir, ttl })
    }

    pub(crate) fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up a previously computed report.
    ///
    /// Returns `None` on a miss, an expired entry (removed lazily), a
    /// corrupt entry (also removed), or any read failure.
    pub async fn get(&self, content: &str, rule_ids: &[&str]) -> Option<Report> {
        let key = cache_key(content, rule_ids);
        let path = self.path_for(&key);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        let envelope: Envelope = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt cache entry, removing");
                self.remove_entry(&path).await;
                return None;
            }
        };

        if envelope.version != ENVELOPE_VERSION {
            tracing::warn!(key, version = envelope.version, "unknown cache envelope version, removing");
            self.remove_entry(&path).await;
            return None;
        }

        let age = (Utc::now() - envelope.stored_at).to_std().unwrap_or_default();
        if age > self.ttl {
            tracing::debug!(key, age_secs = age.as_secs(), "cache entry expired");
            self.remove_entry(&path).await;
            return None;
        }

        tracing::debug!(key, "cache hit");
        Some(envelope.report)
    }

    /// Store a freshly computed report.
    ///
    /// Write failures are logged and skipped. Concurrent writers to the
    /// same key are last-write-wins; the key is content-derived, so both
    /// writes carry the same report.
    pub async fn put(&self, content: &str, rule_ids: &[&str], report: &Report) {
        let key = cache_key(content, rule_ids);
        let envelope = Envelope {
            version: ENVELOPE_VERSION,
            stored_at: Utc::now(),
            report: report.clone(),
        };
        let bytes = match serde_json::to_vec(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache serialization failed, skipping write");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(self.path_for(&key), bytes).await {
            tracing::warn!(key, error = %e, "cache write failed, skipping");
        } else {
            tracing::debug!(key, "cached report");
        }
    }

    /// Remove cache entries, returning the count removed.
    ///
    /// With `max_age = None` removes every entry; otherwise only entries
    /// older than the bound. Corrupt entries count as removable.
    pub async fn clear(&self, max_age: Option<Duration>) -> usize {
        let mut removed = 0;
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "cache directory unreadable, nothing cleared");
                return 0;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(age) = max_age {
                match self.entry_age(&path).await {
                    Some(entry_age) if entry_age <= age => continue,
                    // Older than the bound, or corrupt: remove below.
                    _ => {}
                }
            }
            if tokio::fs::remove_file(&path).await.is_ok() {
                removed += 1;
            }
        }

        removed
    }

    async fn entry_age(&self, path: &Path) -> Option<Duration> {
        let bytes = tokio::fs::read(path).await.ok()?;
        let envelope: Envelope = serde_json::from_slice(&bytes).ok()?;
        (Utc::now() - envelope.stored_at).to_std().ok()
    }

    async fn remove_entry(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Finding, Level, Severity};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sweep-cache-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn sample_report(uri: &str) -> Report {
        let mut report = Report::new(uri);
        report.findings.push(Finding {
            rule_id: "1.1.1".to_string(),
            rule_name: "Non-text Content".to_string(),
            level: Level::A,
            severity: Severity::Critical,
            selector: "img".to_string(),
            snippet: "<img src=\"a.png\">".to_string(),
            description: "Image missing alt attribute".to_string(),
            how_to_fix: None,
        });
        report
    }

    /// Overwrite an entry's envelope with a back-dated timestamp.
    async fn backdate(cache: &ReportCache, content: &str, rule_ids: &[&str], age: Duration) {
        let key = cache_key(content, rule_ids);
        let path = cache.path_for(&key);
        let bytes = tokio::fs::read(&path).await.unwrap();
        let mut envelope: Envelope = serde_json::from_slice(&bytes).unwrap();
        envelope.stored_at = Utc::now() - chrono::Duration::from_std(age).unwrap();
        tokio::fs::write(&path, serde_json::to_vec(&envelope).unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn test_put_get_roundtrip_idempotent() {
        let cache = ReportCache::open(temp_dir("roundtrip"), Duration::from_secs(3600)).await.unwrap();
        let rules = ["1.1.1", "3.1.1"];
        let report = sample_report("https://x.test/");

        assert!(cache.get("<html></html>", &rules).await.is_none());
        cache.put("<html></html>", &rules, &report).await;

        for _ in 0..3 {
            let hit = cache.get("<html></html>", &rules).await.unwrap();
            assert_eq!(hit.findings.len(), report.findings.len());
            assert_eq!(hit.findings[0].description, report.findings[0].description);
        }
    }

    #[tokio::test]
    async fn test_get_rule_order_independent() {
        let cache = ReportCache::open(temp_dir("order"), Duration::from_secs(3600)).await.unwrap();
        cache.put("<html></html>", &["1.1.1", "3.1.1"], &sample_report("x")).await;
        assert!(cache.get("<html></html>", &["3.1.1", "1.1.1"]).await.is_some());
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_and_removed() {
        let cache = ReportCache::open(temp_dir("ttl"), Duration::from_secs(60)).await.unwrap();
        let rules = ["1.1.1"];
        cache.put("<html></html>", &rules, &sample_report("x")).await;
        backdate(&cache, "<html></html>", &rules, Duration::from_secs(120)).await;

        assert!(cache.get("<html></html>", &rules).await.is_none());
        let path = cache.path_for(&cache_key("<html></html>", &rules));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_miss_and_removed() {
        let cache = ReportCache::open(temp_dir("corrupt"), Duration::from_secs(3600)).await.unwrap();
        let rules = ["1.1.1"];
        let path = cache.path_for(&cache_key("<html></html>", &rules));
        tokio::fs::write(&path, b"not json at all").await.unwrap();

        assert!(cache.get("<html></html>", &rules).await.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let cache = ReportCache::open(temp_dir("clear-all"), Duration::from_secs(3600)).await.unwrap();
        cache.put("a", &["1.1.1"], &sample_report("a")).await;
        cache.put("b", &["1.1.1"], &sample_report("b")).await;

        assert_eq!(cache.clear(None).await, 2);
        assert_eq!(cache.clear(None).await, 0);
    }

    #[tokio::test]
    async fn test_clear_with_age_bound() {
        let cache = ReportCache::open(temp_dir("clear-age"), Duration::from_secs(3600)).await.unwrap();
        cache.put("old", &["1.1.1"], &sample_report("old")).await;
        cache.put("new", &["1.1.1"], &sample_report("new")).await;
        backdate(&cache, "old", &["1.1.1"], Duration::from_secs(7200)).await;

        assert_eq!(cache.clear(Some(Duration::from_secs(3600))).await, 1);
        assert!(cache.get("new", &["1.1.1"]).await.is_some());
        assert!(cache.get("old", &["1.1.1"]).await.is_none());
    }
}
