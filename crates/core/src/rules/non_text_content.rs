//! WCAG 2.2 - 1.1.1 Non-text Content (Level A).
//!
//! All non-text content presented to the user has a text alternative that
//! serves the equivalent purpose.

use scraper::{Html, Selector};

use super::{Rule, element_selector, element_snippet};
use crate::error::Error;
use crate::report::{Finding, Level, Severity};

/// Alt texts that name the medium instead of describing the content.
const PLACEHOLDER_ALT_TEXTS: &[&str] = &[
    "image", "photo", "picture", "pic", "graphic", "logo", "icon", "img", "photograph",
    "image of", "picture of", "photograph of",
];

pub struct NonTextContent;

impl NonTextContent {
    fn finding(
        &self,
        element: scraper::ElementRef<'_>,
        severity: Severity,
        description: &str,
        how_to_fix: &str,
    ) -> Finding {
        Finding {
            rule_id: self.id().to_string(),
            rule_name: self.name().to_string(),
            level: self.level(),
            severity,
            selector: element_selector(element),
            snippet: element_snippet(element),
            description: description.to_string(),
            how_to_fix: Some(how_to_fix.to_string()),
        }
    }
}

impl Rule for NonTextContent {
    fn id(&self) -> &'static str {
        "1.1.1"
    }

    fn name(&self) -> &'static str {
        "Non-text Content"
    }

    fn level(&self) -> Level {
        Level::A
    }

    fn evaluate(&self, document: &Html, _raw: &str) -> Result<Vec<Finding>, Error> {
        let mut findings = Vec::new();

        let img = Selector::parse("img").expect("invalid selector");
        for element in document.select(&img) {
            let value = element.value();
            // Explicitly decorative images are exempt.
            if value.attr("role") == Some("presentation") || value.attr("aria-hidden") == Some("true") {
                continue;
            }
            match value.attr("alt") {
                None => findings.push(self.finding(
                    element,
                    Severity::Critical,
                    "Image missing alt attribute",
                    "Add an alt attribute describing the image's content and function, \
                     or alt=\"\" with role=\"presentation\" for decorative images.",
                )),
                Some(alt) => {
                    let normalized = alt.trim().to_ascii_lowercase();
                    if PLACEHOLDER_ALT_TEXTS.contains(&normalized.as_str()) {
                        findings.push(self.finding(
                            element,
                            Severity::Moderate,
                            "Image alt text is a placeholder that does not describe the content",
                            "Replace the generic alt text with a description of what the image conveys.",
                        ));
                    }
                }
            }
        }

        let input_image = Selector::parse("input[type=\"image\"]").expect("invalid selector");
        for element in document.select(&input_image) {
            if element.value().attr("alt").map(str::trim).unwrap_or("").is_empty() {
                findings.push(self.finding(
                    element,
                    Severity::Critical,
                    "Image button missing alt attribute",
                    "Add an alt attribute describing the button's action.",
                ));
            }
        }

        let area = Selector::parse("area[href]").expect("invalid selector");
        for element in document.select(&area) {
            if element.value().attr("alt").map(str::trim).unwrap_or("").is_empty() {
                findings.push(self.finding(
                    element,
                    Severity::Serious,
                    "Image map area missing alt attribute",
                    "Add an alt attribute describing the link target of this area.",
                ));
            }
        }

        Ok(findings)
    }
}
