//! Report data model: findings, per-document reports, and aggregates.
//!
//! A `Report` is created fresh per document and owned exclusively by the
//! dispatcher until handed to the caller; an `AggregateReport` is the merged
//! view across many documents with every finding re-tagged by its origin.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One HTML document to validate.
///
/// Identity for caching purposes is the content bytes, not the URI: two
/// URIs with identical content hit the same cache entry.
#[derive(Debug, Clone)]
pub struct Document {
    /// URL or `file://` path this content came from.
    pub source_uri: String,
    /// Raw HTML content.
    pub content: String,
}

impl Document {
    pub fn new(source_uri: impl Into<String>, content: impl Into<String>) -> Self {
        Self { source_uri: source_uri.into(), content: content.into() }
    }
}

/// WCAG conformance level.
///
/// Ordered so that a configured ceiling of `AA` admits `A` and `AA` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    A,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AAA")]
    Aaa,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::A => write!(f, "A"),
            Level::Aa => write!(f, "AA"),
            Level::Aaa => write!(f, "AAA"),
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Level::A),
            "AA" => Ok(Level::Aa),
            "AAA" => Ok(Level::Aaa),
            other => Err(format!("invalid conformance level: {other}")),
        }
    }
}

/// User impact of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Serious,
    Moderate,
    Minor,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::Serious => "serious",
            Severity::Moderate => "moderate",
            Severity::Minor => "minor",
        };
        write!(f, "{s}")
    }
}

/// One rule violation against one document. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Success criterion identifier, e.g. "1.1.1".
    pub rule_id: String,
    /// Human-readable criterion name, e.g. "Non-text Content".
    pub rule_name: String,
    /// Conformance level of the criterion.
    pub level: Level,
    /// User impact.
    pub severity: Severity,
    /// CSS-ish selector locating the offending element.
    pub selector: String,
    /// HTML snippet of the offending element.
    pub snippet: String,
    /// What is wrong.
    pub description: String,
    /// Guidance for fixing the issue, when the rule provides it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how_to_fix: Option<String>,
}

/// Rule-error key used for failures that prevent any rule from running
/// (fetch, read, or parse failures).
pub const DOCUMENT_ERROR_KEY: &str = "document";

/// Per-document validation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// URL or `file://` path of the validated document.
    pub source_uri: String,
    /// All findings, in rule evaluation order.
    pub findings: Vec<Finding>,
    /// Rule ID -> error message for rules that failed on this document.
    /// Document-level failures use [`DOCUMENT_ERROR_KEY`].
    pub rule_errors: BTreeMap<String, String>,
    /// Wall-clock time spent validating, in milliseconds.
    pub elapsed_ms: u64,
}

impl Report {
    /// Empty report for a document that has not produced findings yet.
    pub fn new(source_uri: impl Into<String>) -> Self {
        Self {
            source_uri: source_uri.into(),
            findings: Vec::new(),
            rule_errors: BTreeMap::new(),
            elapsed_ms: 0,
        }
    }

    /// Report consisting solely of one document-level error and no findings.
    /// Used when the document could not be fetched, read, or parsed.
    pub fn from_document_error(source_uri: impl Into<String>, message: impl Into<String>) -> Self {
        let mut report = Self::new(source_uri);
        report.rule_errors.insert(DOCUMENT_ERROR_KEY.to_string(), message.into());
        report
    }

    pub fn has_issues(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.rule_errors.is_empty()
    }

    pub fn total_findings(&self) -> usize {
        self.findings.len()
    }

    /// Findings grouped by rule ID, in rule-ID order.
    pub fn findings_by_rule(&self) -> BTreeMap<&str, Vec<&Finding>> {
        let mut grouped: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for finding in &self.findings {
            grouped.entry(finding.rule_id.as_str()).or_default().push(finding);
        }
        grouped
    }

    /// Finding count per severity.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

/// A rule error carried into an aggregate, tagged with its origin so that
/// the same rule failing on two documents never collides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateError {
    pub source_uri: String,
    pub rule_id: String,
    pub message: String,
}

/// Merged view across many per-document reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Number of documents merged in.
    pub documents: usize,
    /// Every finding from every document, descriptions prefixed with the
    /// origin URI for traceability.
    pub findings: Vec<Finding>,
    /// Every rule error from every document.
    pub rule_errors: Vec<AggregateError>,
}

impl AggregateReport {
    /// Fold one document's report into the aggregate.
    pub fn absorb(&mut self, report: &Report) {
        self.documents += 1;
        for finding in &report.findings {
            let mut tagged = finding.clone();
            tagged.description = format!("[{}] {}", report.source_uri, finding.description);
            self.findings.push(tagged);
        }
        for (rule_id, message) in &report.rule_errors {
            self.rule_errors.push(AggregateError {
                source_uri: report.source_uri.clone(),
                rule_id: rule_id.clone(),
                message: message.clone(),
            });
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.rule_errors.is_empty()
    }
}
