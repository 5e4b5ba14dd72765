// crates/sendgrid-template-transport/src/mime/headers.rs
// ============================================================================
// Module: Header List
// Description: Ordered header storage with case-insensitive lookup.
// Purpose: Carry custom message headers and prepared MIME part headers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`HeaderList`] keeps headers in insertion order. Names are compared without
//! regard to ASCII case. Structured values such as
//! `attachment; filename="a.txt"` expose their leading value through
//! [`HeaderList::body`] and their parameters through [`HeaderList::parameter`].

// ============================================================================
// SECTION: Header List
// ============================================================================

/// Ordered list of `(name, value)` header pairs.
///
/// # Invariants
/// - Iteration order equals insertion order.
/// - Duplicate names are allowed; lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    /// Header entries in insertion order.
    entries: Vec<(String, String)>,
}

impl HeaderList {
    /// Creates an empty header list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a header.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the value of `name` without its parameters.
    ///
    /// For `Content-Type: text/plain; charset=utf-8` this is `text/plain`.
    #[must_use]
    pub fn body(&self, name: &str) -> Option<&str> {
        self.get(name).map(header_body)
    }

    /// Returns the named parameter of header `name`, unquoted.
    #[must_use]
    pub fn parameter(&self, name: &str, parameter: &str) -> Option<String> {
        self.get(name).and_then(|value| header_parameter(value, parameter))
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(name, value)| (name.into(), value.into())).collect(),
        }
    }
}

// ============================================================================
// SECTION: Structured Values
// ============================================================================

/// Returns the leading value of a structured header, trimmed.
pub(crate) fn header_body(value: &str) -> &str {
    split_segments(value).first().copied().unwrap_or("").trim()
}

/// Returns a named parameter of a structured header value.
pub(crate) fn header_parameter(value: &str, parameter: &str) -> Option<String> {
    split_segments(value).into_iter().skip(1).find_map(|segment| {
        let (key, raw) = segment.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case(parameter) {
            return None;
        }
        let raw = raw.trim();
        let unquoted = raw
            .strip_prefix('"')
            .and_then(|inner| inner.strip_suffix('"'))
            .map_or_else(|| raw.to_string(), unescape);
        Some(unquoted)
    })
}

/// Resolves `\x` escapes inside a quoted string to `x`.
fn unescape(quoted: &str) -> String {
    let mut unescaped = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => unescaped.extend(chars.next()),
            _ => unescaped.push(ch),
        }
    }
    unescaped
}

/// Splits a structured value on `;` separators outside quoted strings.
fn split_segments(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (index, ch) in value.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                segments.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}
