//! WCAG 2.2 - 2.5.8 Target Size (Minimum) (Level AA).
//!
//! The size of the target for pointer inputs is at least 24 by 24 CSS
//! pixels.
//!
//! Rendered size is a layout question, so this check only fires when the
//! markup itself pins both dimensions: pixel values in the inline style
//! (`width`/`height`, falling back to `min-width`/`min-height`) or the
//! `width`/`height` attributes. Unknown dimensions are never flagged.

use scraper::{ElementRef, Html, Selector};

use super::{Rule, element_selector, element_snippet, style_property};
use crate::error::Error;
use crate::report::{Finding, Level, Severity};

const MIN_TARGET_PX: u32 = 24;

pub struct TargetSize;

/// Parse `"18"` or `"18px"` into pixels. Anything else is indeterminate.
fn px_value(value: &str) -> Option<u32> {
    let value = value.trim();
    let digits = value.strip_suffix("px").map(str::trim).unwrap_or(value);
    digits.parse().ok()
}

/// Best-effort dimension from inline style then markup attributes.
fn dimension(element: ElementRef<'_>, axis: &str, min_axis: &str) -> Option<u32> {
    let value = element.value();
    if let Some(style) = value.attr("style")
        && let Some(px) = style_property(style, axis)
            .or_else(|| style_property(style, min_axis))
            .and_then(px_value)
    {
        return Some(px);
    }
    value.attr(axis).and_then(px_value)
}

/// Exemptions: hidden elements and unstyled native controls, whose size the
/// user agent owns.
fn is_exempt(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if value.attr("aria-hidden") == Some("true") {
        return true;
    }
    matches!(value.name(), "input" | "select")
        && value.attr("style").is_none()
        && value.attr("class").is_none()
}

impl Rule for TargetSize {
    fn id(&self) -> &'static str {
        "2.5.8"
    }

    fn name(&self) -> &'static str {
        "Target Size (Minimum)"
    }

    fn level(&self) -> Level {
        Level::Aa
    }

    fn evaluate(&self, document: &Html, _raw: &str) -> Result<Vec<Finding>, Error> {
        let interactive = Selector::parse(
            "a[href], button, input[type=\"button\"], input[type=\"submit\"], \
             input[type=\"reset\"], input[type=\"checkbox\"], input[type=\"radio\"], \
             select, [role=\"button\"], [role=\"link\"], [tabindex]",
        )
        .expect("invalid selector");

        let mut findings = Vec::new();
        for element in document.select(&interactive) {
            if element.value().attr("tabindex").is_some_and(|t| t.trim() == "-1") {
                continue;
            }
            if is_exempt(element) {
                continue;
            }

            let width = dimension(element, "width", "min-width");
            let height = dimension(element, "height", "min-height");
            let (Some(width), Some(height)) = (width, height) else { continue };

            if width < MIN_TARGET_PX || height < MIN_TARGET_PX {
                findings.push(Finding {
                    rule_id: self.id().to_string(),
                    rule_name: self.name().to_string(),
                    level: self.level(),
                    severity: Severity::Moderate,
                    selector: element_selector(element),
                    snippet: element_snippet(element),
                    description: format!(
                        "Interactive element target size {width}x{height} is below the \
                         required {MIN_TARGET_PX}x{MIN_TARGET_PX} CSS pixels"
                    ),
                    how_to_fix: Some(format!(
                        "Increase the element to at least {MIN_TARGET_PX}x{MIN_TARGET_PX} CSS \
                         pixels or ensure sufficient spacing around it."
                    )),
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
        TargetSize.evaluate(&Html::parse_document(html), html).unwrap()
    }

    #[test]
    fn test_px_value_forms() {
        assert_eq!(px_value("18"), Some(18));
        assert_eq!(px_value("18px"), Some(18));
        assert_eq!(px_value(" 24 px "), Some(24));
        assert_eq!(px_value("1.5em"), None);
        assert_eq!(px_value("auto"), None);
    }

    #[test]
    fn test_small_inline_style_button() {
        let findings = run("<button style=\"width: 16px; height: 16px\">x</button>");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "2.5.8");
    }

    #[test]
    fn test_small_attribute_dimensions() {
        let findings = run("<a href=\"/\" role=\"button\" width=\"20\" height=\"20\">x</a>");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_adequate_size_passes() {
        assert!(run("<button style=\"width: 44px; height: 44px\">Go</button>").is_empty());
    }

    #[test]
    fn test_one_axis_too_small_flagged() {
        assert_eq!(run("<button style=\"width: 48px; height: 20px\">Go</button>").len(), 1);
    }

    #[test]
    fn test_unknown_dimensions_not_flagged() {
        assert!(run("<button>Go</button><a href=\"/\">Home</a>").is_empty());
    }

    #[test]
    fn test_min_width_height_fallback() {
        let findings =
            run("<button style=\"min-width: 16px; min-height: 16px\">x</button>");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_unstyled_native_control_exempt() {
        assert!(run("<input type=\"checkbox\" width=\"13\" height=\"13\">").is_empty());
    }

    #[test]
    fn test_aria_hidden_exempt() {
        assert!(
            run("<button aria-hidden=\"true\" style=\"width:10px;height:10px\">x</button>")
                .is_empty()
        );
    }
}
