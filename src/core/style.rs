//! Terminal style tables
//!
//! Maps symbolic color, highlight and attribute names to ANSI escape codes.
//! The tables are fixed; what varies is whether the target stream supports
//! styling at all. On an unstyled stream every code resolves to the empty
//! string, so style wrapping stays a uniform no-op.

use crate::core::error::{LoggerError, Result};

/// Foreground color names and their ANSI codes.
const COLORS: &[(&str, &str)] = &[
    ("black", "30"),
    ("red", "31"),
    ("green", "32"),
    ("orange", "33"),
    ("blue", "34"),
    ("magenta", "35"),
    ("cyan", "36"),
    ("grey", "37"),
    ("dark grey", "90"),
    ("light red", "91"),
    ("light green", "92"),
    ("yellow", "93"),
    ("light blue", "94"),
    ("pink", "95"),
    ("light cyan", "96"),
];

/// Background (highlight) color names and their ANSI codes.
const HIGHLIGHTS: &[(&str, &str)] = &[
    ("black", "40"),
    ("red", "41"),
    ("green", "42"),
    ("orange", "43"),
    ("blue", "44"),
    ("magenta", "45"),
    ("cyan", "46"),
    ("grey", "47"),
];

/// Text attribute names and their ANSI codes.
const ATTRIBUTES: &[(&str, &str)] = &[
    ("bold", "1"),
    ("underline", "4"),
    ("blink", "5"),
    ("invisible", "8"),
    ("strike through", "9"),
];

const RESET: &str = "0";

/// Pre-rendered escape sequences cached on a log type.
///
/// Both strings are empty when the type carries no styling or the stream
/// does not support it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleCodes {
    pub prefix: String,
    pub suffix: String,
}

impl StyleCodes {
    /// Wrap a message body in the cached escape sequences.
    #[must_use]
    pub fn wrap(&self, text: &str) -> String {
        if self.prefix.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.prefix, text, self.suffix)
        }
    }

    /// Whether wrapping is a no-op.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.prefix.is_empty()
    }
}

/// Name-to-code lookup gated by a stream capability probe.
///
/// Unknown names are rejected even when styling is disabled; only the
/// resolved codes differ between styled and unstyled streams.
#[derive(Debug, Clone, Copy)]
pub struct StyleTable {
    enabled: bool,
}

impl StyleTable {
    /// Build a table for a stream whose styling support is already probed.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether this table emits real escape codes.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn lookup(
        &self,
        table: &'static [(&'static str, &'static str)],
        kind: &'static str,
        name: &str,
    ) -> Result<&'static str> {
        let code = table
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| *code)
            .ok_or_else(|| LoggerError::unknown_style(kind, name))?;
        Ok(if self.enabled { code } else { "" })
    }

    /// Resolve a foreground color name.
    pub fn color_code(&self, name: &str) -> Result<&'static str> {
        self.lookup(COLORS, "color", name)
    }

    /// Resolve a highlight (background) color name.
    pub fn highlight_code(&self, name: &str) -> Result<&'static str> {
        self.lookup(HIGHLIGHTS, "highlight", name)
    }

    /// Resolve a text attribute name.
    pub fn attribute_code(&self, name: &str) -> Result<&'static str> {
        self.lookup(ATTRIBUTES, "attribute", name)
    }

    /// Resolve a full selector set into cached escape sequences.
    ///
    /// Every name is validated; the resulting codes are empty (and wrapping
    /// a no-op) when the stream is unstyled or no selector is given.
    pub fn resolve(
        &self,
        color: Option<&str>,
        highlight: Option<&str>,
        attributes: &[String],
    ) -> Result<StyleCodes> {
        let mut codes = String::new();
        let mut push = |code: &str| {
            if !code.is_empty() {
                codes.push(';');
                codes.push_str(code);
            }
        };
        if let Some(name) = color {
            push(self.color_code(name)?);
        }
        if let Some(name) = highlight {
            push(self.highlight_code(name)?);
        }
        for name in attributes {
            push(self.attribute_code(name)?);
        }
        if codes.is_empty() {
            Ok(StyleCodes::default())
        } else {
            Ok(StyleCodes {
                prefix: format!("\x1b[{}{}m", RESET, codes),
                suffix: format!("\x1b[{}m", RESET),
            })
        }
    }
}
