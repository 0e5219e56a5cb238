//! WCAG 2.2 - 1.4.3 Contrast (Minimum) (Level AA).
//!
//! Text and its background have a contrast ratio of at least 4.5:1.
//!
//! Static analysis only sees inline styles, so this check fires when an
//! element declares both a foreground and a background color inline and the
//! pair falls below the threshold. Stylesheet-driven contrast is out of
//! reach without rendering.

use scraper::{Html, Selector};

use super::{Rule, element_selector, element_snippet, style_property};
use crate::error::Error;
use crate::report::{Finding, Level, Severity};

const MIN_CONTRAST: f64 = 4.5;

pub struct Contrast;

/// Parse `#rgb` or `#rrggbb` into linear-ish sRGB components.
fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    match hex.len() {
        3 => {
            let mut components = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let digit = c.to_digit(16)? as u8;
                components[i] = digit * 16 + digit;
            }
            Some((components[0], components[1], components[2]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// WCAG relative luminance of an sRGB color.
fn relative_luminance((r, g, b): (u8, u8, u8)) -> f64 {
    fn channel(c: u8) -> f64 {
        let c = f64::from(c) / 255.0;
        if c <= 0.03928 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
    }
    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// Contrast ratio between two colors, in [1, 21].
fn contrast_ratio(a: (u8, u8, u8), b: (u8, u8, u8)) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la > lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

impl Rule for Contrast {
    fn id(&self) -> &'static str {
        "1.4.3"
    }

    fn name(&self) -> &'static str {
        "Contrast (Minimum)"
    }

    fn level(&self) -> Level {
        Level::Aa
    }

    fn evaluate(&self, document: &Html, _raw: &str) -> Result<Vec<Finding>, Error> {
        let styled = Selector::parse("[style]").expect("invalid selector");
        let mut findings = Vec::new();

        for element in document.select(&styled) {
            let Some(style) = element.value().attr("style") else { continue };
            let foreground = style_property(style, "color").and_then(parse_hex_color);
            let background = style_property(style, "background-color")
                .or_else(|| style_property(style, "background"))
                .and_then(parse_hex_color);
            let (Some(fg), Some(bg)) = (foreground, background) else { continue };

            // Only elements that actually show text.
            if !element.text().any(|t| !t.trim().is_empty()) {
                continue;
            }

            let ratio = contrast_ratio(fg, bg);
            if ratio < MIN_CONTRAST {
                findings.push(Finding {
                    rule_id: self.id().to_string(),
                    rule_name: self.name().to_string(),
                    level: self.level(),
                    severity: Severity::Serious,
                    selector: element_selector(element),
                    snippet: element_snippet(element),
                    description: format!(
                        "Text contrast ratio {ratio:.2}:1 is below the required {MIN_CONTRAST}:1"
                    ),
                    how_to_fix: Some(
                        "Darken the text color or lighten the background until the ratio \
                         reaches 4.5:1."
                            .to_string(),
                    ),
                });
            }
        }

        Ok(findings)
    }
}
