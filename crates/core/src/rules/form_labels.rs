//! WCAG 2.2 - 3.3.2 Labels or Instructions (Level A).
//!
//! Labels or instructions are provided when content requires user input.
//! Flags text-entry controls with no programmatically associated label.

use std::collections::HashSet;

use scraper::{Html, Selector};

use super::{Rule, element_selector, element_snippet};
use crate::error::Error;
use crate::report::{Finding, Level, Severity};

/// Input types that take no user-entered value and need no label.
const UNLABELED_INPUT_TYPES: &[&str] =
    &["hidden", "submit", "reset", "button", "image"];

pub struct FormLabels;

impl Rule for FormLabels {
    fn id(&self) -> &'static str {
        "3.3.2"
    }

    fn name(&self) -> &'static str {
        "Labels or Instructions"
    }

    fn level(&self) -> Level {
        Level::A
    }

    fn evaluate(&self, document: &Html, _raw: &str) -> Result<Vec<Finding>, Error> {
        let label = Selector::parse("label[for]").expect("invalid selector");
        let labeled_ids: HashSet<&str> = document
            .select(&label)
            .filter_map(|el| el.value().attr("for"))
            .collect();

        let controls = Selector::parse("input, textarea, select").expect("invalid selector");
        let mut findings = Vec::new();

        for element in document.select(&controls) {
            let value = element.value();
            if value.name() == "input" {
                let input_type = value.attr("type").unwrap_or("text").to_ascii_lowercase();
                if UNLABELED_INPUT_TYPES.contains(&input_type.as_str()) {
                    continue;
                }
            }

            let has_label = value.attr("id").is_some_and(|id| labeled_ids.contains(id))
                || value.attr("aria-label").map(str::trim).is_some_and(|v| !v.is_empty())
                || value.attr("aria-labelledby").map(str::trim).is_some_and(|v| !v.is_empty())
                || value.attr("title").map(str::trim).is_some_and(|v| !v.is_empty())
                || element
                    .ancestors()
                    .filter_map(scraper::ElementRef::wrap)
                    .any(|ancestor| ancestor.value().name() == "label");

            if !has_label {
                findings.push(Finding {
                    rule_id: self.id().to_string(),
                    rule_name: self.name().to_string(),
                    level: self.level(),
                    severity: Severity::Serious,
                    selector: element_selector(element),
                    snippet: element_snippet(element),
                    description: format!(
                        "Form control <{}> has no associated label",
                        value.name()
                    ),
                    how_to_fix: Some(
                        "Associate a <label for=\"...\"> with the control, wrap it in a label, \
                         or add an aria-label attribute."
                            .to_string(),
                    ),
                });
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Vec<Finding> {
        FormLabels.evaluate(&Html::parse_document(html), html).unwrap()
    }

    #[test]
    fn test_unlabeled_input() {
        let findings = run("<form><input type=\"text\" name=\"q\"></form>");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "3.3.2");
    }

    #[test]
    fn test_label_for_association() {
        assert!(run("<label for=\"q\">Query</label><input id=\"q\" type=\"text\">").is_empty());
    }

    #[test]
    fn test_wrapping_label() {
        assert!(run("<label>Query <input type=\"text\"></label>").is_empty());
    }

    #[test]
    fn test_aria_label() {
        assert!(run("<input type=\"search\" aria-label=\"Search\">").is_empty());
    }

    #[test]
    fn test_buttons_exempt() {
        assert!(run("<input type=\"submit\" value=\"Go\"><input type=\"hidden\" name=\"t\">").is_empty());
    }

    #[test]
    fn test_unlabeled_textarea_and_select() {
        let findings = run("<textarea></textarea><select><option>a</option></select>");
        assert_eq!(findings.len(), 2);
    }
}
