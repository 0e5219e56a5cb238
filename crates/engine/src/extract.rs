//! Outbound link extraction and filtering for crawls.
//!
//! Links are resolved against the page URL, stripped of fragments, and
//! filtered down to same-origin http(s) targets that pass the configured
//! include/exclude patterns.

use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use sweep_core::Error;

/// Schemes that never lead to a crawlable page.
const SKIPPED_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:"];

/// Decides which discovered URLs enter the crawl frontier.
pub struct LinkFilter {
    seed: Url,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl LinkFilter {
    /// Build a filter rooted at the crawl's seed URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if any pattern fails to compile.
    pub fn new(seed: &Url, include_patterns: &[String], exclude_patterns: &[String]) -> Result<Self, Error> {
        let compile = |patterns: &[String]| -> Result<Vec<Regex>, Error> {
            patterns
                .iter()
                .map(|p| Regex::new(p).map_err(|e| Error::InvalidPattern(format!("'{p}': {e}"))))
                .collect()
        };
        Ok(Self {
            seed: seed.clone(),
            include: compile(include_patterns)?,
            exclude: compile(exclude_patterns)?,
        })
    }

    /// Whether a resolved URL should be crawled.
    ///
    /// Admits only http(s) URLs sharing the seed's origin (scheme + host +
    /// port), matching at least one include pattern when includes are
    /// configured, and matching no exclude pattern.
    pub fn admits(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }
        if url.origin() != self.seed.origin() {
            return false;
        }
        let as_str = url.as_str();
        if !self.include.is_empty() && !self.include.iter().any(|p| p.is_match(as_str)) {
            return false;
        }
        if self.exclude.iter().any(|p| p.is_match(as_str)) {
            return false;
        }
        true
    }
}

/// Extract crawlable outbound links from a page.
///
/// Resolves relative hrefs against `page_url`, drops fragment-only and
/// mailto/tel/javascript targets, strips fragments from the rest, applies
/// the filter, and de-duplicates within the page.
pub fn outbound_links(html: &str, page_url: &Url, filter: &LinkFilter) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("invalid selector");

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else { continue };
        let href = href.trim();

        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        if SKIPPED_PREFIXES.iter().any(|prefix| href.to_ascii_lowercase().starts_with(prefix)) {
            continue;
        }

        let Ok(mut resolved) = page_url.join(href) else { continue };
        resolved.set_fragment(None);

        if !filter.admits(&resolved) {
            continue;
        }

        let resolved = resolved.to_string();
        if seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(seed: &str) -> LinkFilter {
        LinkFilter::new(&Url::parse(seed).unwrap(), &[], &[]).unwrap()
    }

    fn extract(html: &str, page: &str, filter: &LinkFilter) -> Vec<String> {
        outbound_links(html, &Url::parse(page).unwrap(), filter)
    }

    #[test]
    fn test_relative_links_resolved() {
        let f = filter("https://x.test/");
        let links = extract(
            r#"<a href="/docs">Docs</a><a href="about">About</a>"#,
            "https://x.test/pages/",
            &f,
        );
        assert_eq!(links, vec!["https://x.test/docs", "https://x.test/pages/about"]);
    }

    #[test]
    fn test_cross_domain_dropped() {
        let f = filter("https://x.test/");
        let links = extract(
            r#"<a href="https://other.test/">Other</a><a href="/in">In</a>"#,
            "https://x.test/",
            &f,
        );
        assert_eq!(links, vec!["https://x.test/in"]);
    }

    #[test]
    fn test_scheme_change_dropped() {
        // Same host but different scheme is a different origin.
        let f = filter("https://x.test/");
        let links = extract(r#"<a href="http://x.test/in">In</a>"#, "https://x.test/", &f);
        assert!(links.is_empty());
    }

    #[test]
    fn test_anchor_mailto_javascript_dropped() {
        let f = filter("https://x.test/");
        let links = extract(
            r##"<a href="#top">Top</a>
               <a href="mailto:a@x.test">Mail</a>
               <a href="tel:+15551234">Call</a>
               <a href="javascript:void(0)">JS</a>"##,
            "https://x.test/",
            &f,
        );
        assert!(links.is_empty());
    }

    #[test]
    fn test_fragment_stripped_and_deduped() {
        let f = filter("https://x.test/");
        let links = extract(
            r#"<a href="/page#a">A</a><a href="/page#b">B</a><a href="/page">C</a>"#,
            "https://x.test/",
            &f,
        );
        assert_eq!(links, vec!["https://x.test/page"]);
    }

    #[test]
    fn test_include_patterns() {
        let seed = Url::parse("https://x.test/").unwrap();
        let f = LinkFilter::new(&seed, &["/docs/".to_string()], &[]).unwrap();
        let links = extract(
            r#"<a href="/docs/a">A</a><a href="/blog/b">B</a>"#,
            "https://x.test/",
            &f,
        );
        assert_eq!(links, vec!["https://x.test/docs/a"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let seed = Url::parse("https://x.test/").unwrap();
        let f = LinkFilter::new(&seed, &[], &["\\.pdf$".to_string()]).unwrap();
        let links = extract(
            r#"<a href="/report.pdf">PDF</a><a href="/report">HTML</a>"#,
            "https://x.test/",
            &f,
        );
        assert_eq!(links, vec!["https://x.test/report"]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let seed = Url::parse("https://x.test/").unwrap();
        let result = LinkFilter::new(&seed, &["[unclosed".to_string()], &[]);
        assert!(matches!(result, Err(Error::InvalidPattern(_))));
    }
}
