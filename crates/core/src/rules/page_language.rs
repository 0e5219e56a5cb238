//! WCAG 2.2 - 3.1.1 Language of Page (Level A).
//!
//! The default human language of each page can be programmatically
//! determined.

use scraper::{Html, Selector};

use super::{Rule, element_selector};
use crate::error::Error;
use crate::report::{Finding, Level, Severity};

pub struct PageLanguage;

impl Rule for PageLanguage {
    fn id(&self) -> &'static str {
        "3.1.1"
    }

    fn name(&self) -> &'static str {
        "Language of Page"
    }

    fn level(&self) -> Level {
        Level::A
    }

    fn evaluate(&self, document: &Html, _raw: &str) -> Result<Vec<Finding>, Error> {
        let html = Selector::parse("html").expect("invalid selector");
        let Some(root) = document.select(&html).next() else {
            return Ok(Vec::new());
        };

        let lang = root.value().attr("lang").map(str::trim).unwrap_or("");
        if !lang.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![Finding {
            rule_id: self.id().to_string(),
            rule_name: self.name().to_string(),
            level: self.level(),
            severity: Severity::Serious,
            selector: element_selector(root),
            snippet: "<html>".to_string(),
            description: "Page is missing a lang attribute on the html element".to_string(),
            how_to_fix: Some(
                "Add a lang attribute with the page's primary language, e.g. <html lang=\"en\">."
                    .to_string(),
            ),
        }])
    }
}
