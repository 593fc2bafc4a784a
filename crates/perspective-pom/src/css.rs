//! Parsing of computed CSS values reported by the driver.

use crate::result::{PomError, PomResult};
use regex::Regex;

const PX_VALUE: &str = r"^\s*(-?\d+(?:\.\d+)?)px\s*$";
const GRID_SPAN: &str = r"span\s+(\d+)";
const GRID_START: &str = r"^\s*(\d+)";
const STYLE_WIDTH: &str = r"(?:^|;)\s*width:\s*([^;]+)";

fn pattern(source: &str) -> PomResult<Regex> {
    Regex::new(source).map_err(|e| PomError::contract(format!("invalid pattern {source}: {e}")))
}

fn capture<'a>(source: &str, value: &'a str, what: &str) -> PomResult<&'a str> {
    pattern(source)?
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| PomError::contract(format!("expected {what}, got {value:?}")))
}

/// Drop everything from the first `px` on: `"24px"` becomes `"24"`
#[must_use]
pub fn strip_px(value: &str) -> String {
    value.split("px").next().unwrap_or_default().to_string()
}

/// Parse a pixel length such as `"12.5px"`
pub fn parse_px(value: &str) -> PomResult<f64> {
    let number = capture(PX_VALUE, value, "a pixel length")?;
    number
        .parse()
        .map_err(|_| PomError::contract(format!("expected a pixel length, got {value:?}")))
}

/// Column count from a `grid-column-end` value such as `"span 3"`
pub fn grid_span(value: &str) -> PomResult<u32> {
    let number = capture(GRID_SPAN, value, "a grid span")?;
    number
        .parse()
        .map_err(|_| PomError::contract(format!("expected a grid span, got {value:?}")))
}

/// Starting column from a `grid-column` value such as `"2 / span 3"`
pub fn grid_start(value: &str) -> PomResult<u32> {
    let number = capture(GRID_START, value, "a grid column")?;
    number
        .parse()
        .map_err(|_| PomError::contract(format!("expected a grid column, got {value:?}")))
}

/// Whether the inline `style` declares its width in percent
pub fn width_is_percent(style: &str) -> PomResult<bool> {
    Ok(capture(STYLE_WIDTH, style, "an inline width")?.contains('%'))
}

/// Render a rect dimension the way the browser reports integral sizes
#[must_use]
pub fn format_dimension(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
