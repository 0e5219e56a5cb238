//! Unified error types for a11ysweep.
//!
//! Fetch, parse, rule, and cache failures are recorded as data on the
//! affected document's `Report` and never abort a crawl, batch, or dispatch.
//! `Result` is reserved for caller misuse: invalid seed URLs, unreadable
//! directories, invalid configuration.

/// Unified error types for the a11ysweep workspace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// URL could not be parsed or has no host.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response or network failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch exceeded the configured timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response exceeded the configured byte limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Glob or URL filter pattern could not be compiled.
    #[error("INVALID_PATTERN: {0}")]
    InvalidPattern(String),

    /// Document could not be parsed as HTML.
    #[error("PARSE_FAILED: {0}")]
    ParseFailed(String),

    /// A single rule failed while evaluating a document.
    #[error("RULE_FAILED: {0}")]
    RuleFailed(String),

    /// Cache read/write/corruption. Never surfaced to callers of the
    /// dispatcher; degrades to a miss or a skipped write.
    #[error("CACHE_IO: {0}")]
    CacheIo(String),

    /// Filesystem error outside the cache (batch reads, directory listing).
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_prefix() {
        let err = Error::FetchTimeout("10s elapsed".to_string());
        assert!(err.to_string().contains("FETCH_TIMEOUT"));
        assert!(err.to_string().contains("10s elapsed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(err.to_string().starts_with("IO:"));
    }
}
