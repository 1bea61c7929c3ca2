//! Filter expressions
//!
//! Builds the backend's filter language (`field = "value" && ...`) with
//! values always quoted and escaped, so user-supplied ids cannot change
//! the shape of a query.

use std::fmt;

/// A filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter(String);

impl Filter {
    fn compare(field: &str, op: &str, value: &str) -> Self {
        Filter(format!("{} {} {}", field, op, quote(value)))
    }

    pub fn eq(field: &str, value: impl AsRef<str>) -> Self {
        Self::compare(field, "=", value.as_ref())
    }

    pub fn ne(field: &str, value: impl AsRef<str>) -> Self {
        Self::compare(field, "!=", value.as_ref())
    }

    pub fn eq_bool(field: &str, value: bool) -> Self {
        Filter(format!("{} = {}", field, value))
    }

    pub fn and(self, other: Filter) -> Self {
        Filter(format!("{} && {}", self.0, other.0))
    }

    pub fn or(self, other: Filter) -> Self {
        Filter(format!("({} || {})", self.0, other.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
