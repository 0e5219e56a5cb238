//! WCAG 2.2 - 4.1.2 Name, Role, Value (Level A).
//!
//! Interactive components expose a programmatically determinable name.
//! Flags links and buttons whose accessible name would compute to nothing.

use scraper::{ElementRef, Html, Selector};

use super::{Rule, element_selector, element_snippet};
use crate::error::Error;
use crate::report::{Finding, Level, Severity};

pub struct NameRoleValue;

/// Rough accessible-name computation for static HTML: aria-label,
/// aria-labelledby, text content, title, or (for image links/buttons)
/// contained image alt text.
fn has_accessible_name(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if value.attr("aria-label").map(str::trim).is_some_and(|v| !v.is_empty())
        || value.attr("aria-labelledby").map(str::trim).is_some_and(|v| !v.is_empty())
        || value.attr("title").map(str::trim).is_some_and(|v| !v.is_empty())
    {
        return true;
    }

    if element.text().any(|t| !t.trim().is_empty()) {
        return true;
    }

    let img = Selector::parse("img[alt]").expect("invalid selector");
    element
        .select(&img)
        .any(|img| img.value().attr("alt").map(str::trim).is_some_and(|alt| !alt.is_empty()))
}

impl Rule for NameRoleValue {
    fn id(&self) -> &'static str {
        "4.1.2"
    }

    fn name(&self) -> &'static str {
        "Name, Role, Value"
    }

    fn level(&self) -> Level {
        Level::A
    }

    fn evaluate(&self, document: &Html, _raw: &str) -> Result<Vec<Finding>, Error> {
        let mut findings = Vec::new();

        let interactive = Selector::parse("a[href], button, [role=\"button\"], [role=\"link\"]")
            .expect("invalid selector");
        for element in document.select(&interactive) {
            if element.value().attr("aria-hidden") == Some("true") {
                continue;
            }
            if has_accessible_name(element) {
                continue;
            }

            // input[type=button] carries its name in the value attribute.
            if element.value().name() == "input"
                && element.value().attr("value").map(str::trim).is_some_and(|v| !v.is_empty())
            {
                continue;
            }

            findings.push(Finding {
                rule_id: self.id().to_string(),
                rule_name: self.name().to_string(),
                level: self.level(),
                severity: Severity::Serious,
                selector: element_selector(element),
                snippet: element_snippet(element),
                description: format!(
                    "Interactive element <{}> has no accessible name",
                    element.value().name()
                ),
                how_to_fix: Some(
                    "Provide visible text content, an aria-label, or alt text on a contained image."
                        .to_string(),
                ),
            });
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Vec<Finding> {
        NameRoleValue.evaluate(&Html::parse_document(html), html).unwrap()
    }

    #[test]
    fn test_empty_link() {
        let findings = run("<a href=\"/next\"></a>");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "4.1.2");
    }

    #[test]
    fn test_text_link_passes() {
        assert!(run("<a href=\"/next\">Next page</a>").is_empty());
    }

    #[test]
    fn test_icon_button_without_name() {
        let findings = run("<button><svg viewBox=\"0 0 1 1\"></svg></button>");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_aria_label_passes() {
        assert!(run("<button aria-label=\"Close\"><svg></svg></button>").is_empty());
    }

    #[test]
    fn test_image_link_with_alt_passes() {
        assert!(run("<a href=\"/\"><img src=\"logo.png\" alt=\"Home\"></a>").is_empty());
    }

    #[test]
    fn test_image_link_with_empty_alt_fails() {
        assert_eq!(run("<a href=\"/\"><img src=\"logo.png\" alt=\"\"></a>").len(), 1);
    }

    #[test]
    fn test_aria_hidden_exempt() {
        assert!(run("<a href=\"/next\" aria-hidden=\"true\"></a>").is_empty());
    }
}
