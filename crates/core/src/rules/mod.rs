//! Rule registry and the built-in WCAG 2.2 checks.
//!
//! Rules are a static table populated at startup from configuration (include
//! and exclude lists plus a conformance ceiling). There is no runtime
//! discovery: adding a rule means adding it to [`builtin_rules`].
//!
//! Each rule is a pure function from a parsed document to a list of
//! findings. A failing rule is isolated to a `rule_errors` entry on the
//! document's report; the remaining rules still run.

mod contrast;
mod focus_visible;
mod form_labels;
mod name_role_value;
mod non_text_content;
mod page_language;
mod target_size;

use std::sync::Arc;
use std::time::Instant;

use scraper::{ElementRef, Html};

use crate::error::Error;
use crate::report::{Level, Report};

pub use contrast::Contrast;
pub use focus_visible::FocusVisible;
pub use form_labels::FormLabels;
pub use name_role_value::NameRoleValue;
pub use non_text_content::NonTextContent;
pub use page_language::PageLanguage;
pub use target_size::TargetSize;

/// One accessibility check against a parsed document.
///
/// Implementations must not mutate the parsed document and must be safe to
/// invoke concurrently from multiple worker threads.
pub trait Rule: Send + Sync {
    /// Success criterion identifier, e.g. "1.1.1".
    fn id(&self) -> &'static str;

    /// Human-readable criterion name.
    fn name(&self) -> &'static str;

    /// Conformance level this criterion belongs to.
    fn level(&self) -> Level;

    /// Evaluate the document, returning all violations found.
    fn evaluate(&self, document: &Html, raw: &str) -> Result<Vec<crate::report::Finding>, Error>;
}

/// The full built-in rule table.
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(NonTextContent),
        Arc::new(Contrast),
        Arc::new(FocusVisible),
        Arc::new(TargetSize),
        Arc::new(PageLanguage),
        Arc::new(FormLabels),
        Arc::new(NameRoleValue),
    ]
}

/// Parse raw content into a document.
///
/// Parsing is lenient (malformed markup still yields a tree), so the only
/// document-level rejection is content with nothing in it at all.
pub fn parse_document(raw: &str) -> Result<Html, Error> {
    if raw.trim().is_empty() {
        return Err(Error::ParseFailed("document is empty".to_string()));
    }
    Ok(Html::parse_document(raw))
}

/// The set of rules active for one validation run.
///
/// Carries a deterministic fingerprint of its rule IDs so cached results are
/// invalidated when the active configuration changes.
#[derive(Clone)]
pub struct RuleSet {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleSet {
    /// Build from an explicit rule list (tests, embedding).
    pub fn with_rules(rules: Vec<Arc<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Filter the built-in table by conformance ceiling and ID lists.
    ///
    /// An empty include list means "all"; excludes are applied after.
    pub fn from_config(ceiling: Level, include: &[String], exclude: &[String]) -> Self {
        let rules = builtin_rules()
            .into_iter()
            .filter(|rule| rule.level() <= ceiling)
            .filter(|rule| include.is_empty() || include.iter().any(|id| id == rule.id()))
            .filter(|rule| !exclude.iter().any(|id| id == rule.id()))
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Active rule IDs, in registry order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Deterministic digest of the sorted active rule IDs.
    ///
    /// Order-independent: the same rules in any order produce the same
    /// fingerprint.
    pub fn fingerprint(&self) -> String {
        crate::cache::rule_fingerprint(&self.ids())
    }

    /// Validate one document against every active rule.
    ///
    /// A rule failure is captured under that rule's ID and the remaining
    /// rules still run. A parse failure yields an error-only report.
    pub fn run(&self, raw: &str, source_uri: &str) -> Report {
        let start = Instant::now();
        let mut report = match parse_document(raw) {
            Ok(document) => {
                let mut report = Report::new(source_uri);
                for rule in &self.rules {
                    tracing::debug!(rule = rule.id(), uri = source_uri, "evaluating rule");
                    match rule.evaluate(&document, raw) {
                        Ok(findings) => report.findings.extend(findings),
                        Err(e) => {
                            tracing::warn!(rule = rule.id(), uri = source_uri, error = %e, "rule failed");
                            report.rule_errors.insert(rule.id().to_string(), e.to_string());
                        }
                    }
                }
                report
            }
            Err(e) => Report::from_document_error(source_uri, e.to_string()),
        };
        report.elapsed_ms = start.elapsed().as_millis() as u64;
        report
    }
}

/// Short selector identifying an element: tag name plus id/classes.
pub(crate) fn element_selector(element: ElementRef<'_>) -> String {
    let value = element.value();
    let mut selector = value.name().to_string();
    if let Some(id) = value.attr("id") {
        selector.push('#');
        selector.push_str(id);
    } else if let Some(class) = value.attr("class") {
        for part in class.split_whitespace().take(2) {
            selector.push('.');
            selector.push_str(part);
        }
    }
    selector
}

/// Pull a declaration's value out of an inline style string.
pub(crate) fn style_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style.split(';').find_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        (name.trim().eq_ignore_ascii_case(property)).then(|| value.trim())
    })
}

/// Outer HTML of an element, truncated to keep reports readable.
pub(crate) fn element_snippet(element: ElementRef<'_>) -> String {
    const MAX_SNIPPET: usize = 200;
    let html = element.html();
    if html.len() <= MAX_SNIPPET {
        html
    } else {
        let mut end = MAX_SNIPPET;
        while !html.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &html[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Finding;

    struct FailingRule;

    impl Rule for FailingRule {
        fn id(&self) -> &'static str {
            "9.9.9"
        }

        fn name(&self) -> &'static str {
            "Always Fails"
        }

        fn level(&self) -> Level {
            Level::A
        }

        fn evaluate(&self, _document: &Html, _raw: &str) -> Result<Vec<Finding>, Error> {
            Err(Error::RuleFailed("synthetic failure".to_string()))
        }
    }

    #[test]
    fn test_builtin_rule_ids_unique() {
        let mut ids: Vec<_> = builtin_rules().iter().map(|r| r.id()).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_from_config_level_ceiling() {
        let all = RuleSet::from_config(Level::Aaa, &[], &[]);
        let level_a = RuleSet::from_config(Level::A, &[], &[]);
        assert!(level_a.len() < all.len());
        assert!(!level_a.ids().contains(&"1.4.3"));
    }

    #[test]
    fn test_aa_ceiling_includes_focus_and_target_rules() {
        let ids = RuleSet::from_config(Level::Aa, &[], &[]).ids();
        assert!(ids.contains(&"2.4.7"));
        assert!(ids.contains(&"2.5.8"));

        let level_a = RuleSet::from_config(Level::A, &[], &[]).ids();
        assert!(!level_a.contains(&"2.4.7"));
        assert!(!level_a.contains(&"2.5.8"));
    }

    #[test]
    fn test_from_config_include_exclude() {
        let only = RuleSet::from_config(Level::Aa, &["1.1.1".to_string()], &[]);
        assert_eq!(only.ids(), vec!["1.1.1"]);

        let without = RuleSet::from_config(Level::Aa, &[], &["1.1.1".to_string()]);
        assert!(!without.ids().contains(&"1.1.1"));
        assert!(!without.is_empty());
    }

    #[test]
    fn test_fingerprint_order_independent() {
        let forward = RuleSet::with_rules(vec![Arc::new(NonTextContent), Arc::new(PageLanguage)]);
        let reverse = RuleSet::with_rules(vec![Arc::new(PageLanguage), Arc::new(NonTextContent)]);
        assert_eq!(forward.fingerprint(), reverse.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_rules() {
        let one = RuleSet::with_rules(vec![Arc::new(NonTextContent)]);
        let two = RuleSet::with_rules(vec![Arc::new(NonTextContent), Arc::new(PageLanguage)]);
        assert_ne!(one.fingerprint(), two.fingerprint());
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(matches!(parse_document("   \n "), Err(Error::ParseFailed(_))));
    }

    #[test]
    fn test_run_empty_document_is_error_only() {
        let rules = RuleSet::with_rules(vec![Arc::new(NonTextContent)]);
        let report = rules.run("", "https://x.test/");
        assert!(report.findings.is_empty());
        assert!(report.rule_errors.contains_key(crate::report::DOCUMENT_ERROR_KEY));
    }

    #[test]
    fn test_rule_failure_is_isolated() {
        let rules = RuleSet::with_rules(vec![Arc::new(FailingRule), Arc::new(NonTextContent)]);
        let report = rules.run("<html><body><img src=\"a.png\"></body></html>", "x");
        // The failing rule is recorded, the healthy rule still finds issues.
        assert!(report.rule_errors.contains_key("9.9.9"));
        assert!(report.findings.iter().any(|f| f.rule_id == "1.1.1"));
    }
}
