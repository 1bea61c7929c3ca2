//! Learning Domain Services
//!
//! Pure helpers shared by the stores: name handling, price parsing and the
//! dashboard's display formatting.

use chrono::{DateTime, Utc};

/// Avatar background colours, picked by list position
pub const AVATAR_COLORS: [&str; 5] = ["#86efac", "#93c5fd", "#fca5a5", "#c4b5fd", "#fdba74"];

pub fn avatar_color(index: usize) -> &'static str {
    AVATAR_COLORS[index % AVATAR_COLORS.len()]
}

/// First word and the remainder, e.g. `"Mary Jane Doe"` -> `("Mary", "Jane Doe")`
pub fn split_name(name: &str) -> (&str, &str) {
    name.split_once(' ').unwrap_or((name, ""))
}

/// Inverse of [`split_name`]; an empty half leaves no stray space
pub fn join_name(first: &str, last: &str) -> String {
    [first.trim(), last.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First letters of the first two words, or the first two characters of a
/// single word, upper-cased
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace();
    let initials: String = match (words.next(), words.next()) {
        (Some(first), Some(second)) => first.chars().take(1).chain(second.chars().take(1)).collect(),
        (Some(only), None) => only.chars().take(2).collect(),
        _ => String::new(),
    };
    initials.to_uppercase()
}

/// Leading decimal number of a price string, `0.0` when there is none
///
/// `"49.99"` -> 49.99, `"12 EUR"` -> 12.0, `"free"` -> 0.0
pub fn parse_price(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return 0.0;
    }
    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Sum of prices rounded to a whole amount
pub fn total_revenue(prices: impl IntoIterator<Item = f64>) -> u64 {
    let sum: f64 = prices.into_iter().sum();
    sum.round().max(0.0) as u64
}

/// `YYYY-MM-DD`
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Human readable age of `then` relative to `now`
pub fn relative_time(then: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(*then).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} minute{} ago", plural(minutes));
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("about {hours} hour{} ago", plural(hours));
    }

    let days = hours / 24;
    if days < 7 {
        return format!("{days} day{} ago", plural(days));
    }

    format_date(then)
}
