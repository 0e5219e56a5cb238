//! WCAG 2.2 - 2.4.7 Focus Visible (Level AA).
//!
//! Any keyboard operable user interface has a mode of operation where the
//! keyboard focus indicator is visible.
//!
//! Static analysis cannot observe rendered focus styles, so this check
//! flags the concrete ways markup suppresses the default indicator: inline
//! `outline: none`/`outline: 0` on a focusable element, and `<style>`
//! blocks carrying outline-suppressing declarations.

use scraper::{ElementRef, Html, Selector};

use super::{Rule, element_selector, element_snippet, style_property};
use crate::error::Error;
use crate::report::{Finding, Level, Severity};

/// ARIA roles that imply keyboard focusability.
const FOCUSABLE_ROLES: &[&str] = &["button", "link", "checkbox", "radio", "tab", "menuitem"];

pub struct FocusVisible;

/// Whether an inline-style `outline` family value suppresses the indicator.
fn suppresses_outline(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "none" | "0" | "0px")
}

/// Whether a style declaration block anywhere suppresses the outline.
/// Whitespace-insensitive so `outline : none` and `outline:none` both match.
fn css_suppresses_outline(css: &str) -> bool {
    let compact = css.split_whitespace().collect::<String>().to_ascii_lowercase();
    ["outline:none", "outline:0", "outline-style:none", "outline-width:0"]
        .iter()
        .any(|needle| compact.contains(needle))
}

/// Rough focusability test for static HTML.
fn is_focusable(element: ElementRef<'_>) -> bool {
    let value = element.value();
    match value.name() {
        "a" => value.attr("href").is_some(),
        "button" | "select" | "textarea" => true,
        "input" => value.attr("type").map(str::to_ascii_lowercase).as_deref() != Some("hidden"),
        _ => {
            value.attr("tabindex").is_some_and(|t| t.trim() != "-1")
                || value.attr("contenteditable").is_some_and(|c| c.trim() != "false")
                || value.attr("role").is_some_and(|r| FOCUSABLE_ROLES.contains(&r.trim()))
        }
    }
}

impl Rule for FocusVisible {
    fn id(&self) -> &'static str {
        "2.4.7"
    }

    fn name(&self) -> &'static str {
        "Focus Visible"
    }

    fn level(&self) -> Level {
        Level::Aa
    }

    fn evaluate(&self, document: &Html, _raw: &str) -> Result<Vec<Finding>, Error> {
        let mut findings = Vec::new();

        let styled = Selector::parse("[style]").expect("invalid selector");
        for element in document.select(&styled) {
            let Some(style) = element.value().attr("style") else { continue };
            let suppressed = style_property(style, "outline").is_some_and(suppresses_outline)
                || style_property(style, "outline-style").is_some_and(suppresses_outline)
                || style_property(style, "outline-width").is_some_and(suppresses_outline);
            if suppressed && is_focusable(element) {
                findings.push(Finding {
                    rule_id: self.id().to_string(),
                    rule_name: self.name().to_string(),
                    level: self.level(),
                    severity: Severity::Serious,
                    selector: element_selector(element),
                    snippet: element_snippet(element),
                    description: "Focusable element has inline styles that hide the focus indicator"
                        .to_string(),
                    how_to_fix: Some(
                        "Remove the outline suppression or add a visible alternative focus style \
                         such as a box-shadow."
                            .to_string(),
                    ),
                });
            }
        }

        let style_blocks = Selector::parse("style").expect("invalid selector");
        for element in document.select(&style_blocks) {
            let css: String = element.text().collect();
            if css_suppresses_outline(&css) {
                findings.push(Finding {
                    rule_id: self.id().to_string(),
                    rule_name: self.name().to_string(),
                    level: self.level(),
                    severity: Severity::Serious,
                    selector: element_selector(element),
                    snippet: element_snippet(element),
                    description: "Style element contains CSS that hides focus indicators"
                        .to_string(),
                    how_to_fix: Some(
                        "Replace outline suppression with a visible focus style so keyboard \
                         users can see where focus is."
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
        FocusVisible.evaluate(&Html::parse_document(html), html).unwrap()
    }

    #[test]
    fn test_inline_outline_none_on_link() {
        let findings = run("<a href=\"/next\" style=\"outline: none\">Next</a>");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "2.4.7");
    }

    #[test]
    fn test_inline_outline_zero_on_button() {
        assert_eq!(run("<button style=\"outline:0\">Go</button>").len(), 1);
    }

    #[test]
    fn test_outline_on_non_focusable_ignored() {
        assert!(run("<div style=\"outline: none\">decoration</div>").is_empty());
    }

    #[test]
    fn test_tabindex_element_flagged() {
        assert_eq!(run("<div tabindex=\"0\" style=\"outline: none\">widget</div>").len(), 1);
        assert!(run("<div tabindex=\"-1\" style=\"outline: none\">skipped</div>").is_empty());
    }

    #[test]
    fn test_style_element_suppression() {
        let findings = run("<style>a:focus { outline: none; }</style><a href=\"/\">Home</a>");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_style_element_whitespace_variants() {
        assert_eq!(run("<style>button:focus{outline : 0}</style>").len(), 1);
        assert_eq!(run("<style>.btn:focus { outline-style: none; }</style>").len(), 1);
    }

    #[test]
    fn test_visible_focus_style_passes() {
        assert!(run("<style>a:focus { outline: 2px solid #4d90fe; }</style>").is_empty());
    }

    #[test]
    fn test_plain_outline_style_passes() {
        assert!(run("<a href=\"/\" style=\"outline: 1px dotted\">Home</a>").is_empty());
    }
}
