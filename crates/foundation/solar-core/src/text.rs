//! Small text helpers shared by the HTML and email renderers.

use chrono::{DateTime, Utc};

/// Escape text for interpolation into HTML bodies and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `Mar 4, 2025, 09:30` in UTC.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %H:%M").to_string()
}

/// Five-character star row: filled stars for the whole part of the rating.
pub fn star_row(rating: f64) -> String {
    let filled = rating.floor().clamp(0.0, 5.0) as usize;
    let mut row = "★".repeat(filled);
    row.push_str(&"☆".repeat(5 - filled));
    row
}
