//! A single numeric measurement taken from vendor tool output.
//!
//! Vendor tools print numbers as free text and occasionally print markers such as
//! `[N/A]` or `[Not Supported]` in place of a value. Instead of collapsing those to zero,
//! a failed parse is kept as [`Reading::Unavailable`] so that "0 W" and "unknown" stay
//! distinguishable all the way to the wire payload.
//!
//! A measured reading keeps the text the tool printed, so `75.50` is served as `75.50W`
//! rather than a re-formatted float.

/// Text rendered in place of a value that could not be read
pub const UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// A finite measured value and the text it is rendered as
    Value { value: f64, text: String },
    /// The source text was missing or not a finite number
    Unavailable,
}

impl Reading {
    /// Parse a trimmed decimal number, falling back to `Unavailable`
    ///
    /// Non-finite values (`NaN`, `inf`) are treated as unparseable.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Reading::Value {
                value,
                text: text.to_string(),
            },
            _ => Reading::Unavailable,
        }
    }

    /// Divide a measured value by `divisor`, e.g. to move from MiB to GiB
    ///
    /// Converted values no longer match any source text and render with two decimals.
    pub fn scaled_down(self, divisor: f64) -> Self {
        match self {
            Reading::Value { value, .. } => {
                let value = value / divisor;
                Reading::Value {
                    value,
                    text: format!("{:.2}", value),
                }
            }
            Reading::Unavailable => Reading::Unavailable,
        }
    }

    /// Rendered text without a unit
    pub fn text(&self) -> &str {
        match self {
            Reading::Value { text, .. } => text,
            Reading::Unavailable => UNAVAILABLE,
        }
    }

    /// Render with a unit suffix, e.g. `45°C`; unavailable readings carry no suffix
    pub fn with_unit(&self, unit: &str) -> String {
        match self {
            Reading::Value { text, .. } => format!("{}{}", text, unit),
            Reading::Unavailable => UNAVAILABLE.to_string(),
        }
    }
}
