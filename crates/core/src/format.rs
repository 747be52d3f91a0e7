use chrono::{DateTime, Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static SPOILER_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(No spoilers|Spoiler).*?\.").expect("valid regex"));

/// Placeholder shown for missing values
pub const MISSING: &str = "-";

/// Parse an upstream date (RFC 3339 timestamp or plain `YYYY-MM-DD`)
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .or_else(|| {
            value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Format a date as `dd/mm/yyyy`, or `-` when missing or unparseable
pub fn format_date(value: Option<&str>) -> String {
    parse_date(value)
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn year_of(value: Option<&str>) -> Option<i32> {
    parse_date(value).map(|date| date.year())
}

/// Format a USD amount with thousands separators, e.g. `$1,234.50`
pub fn format_currency(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return MISSING.to_string();
    };

    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    format!("{sign}${}.{cents}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format a signed percentage with two decimals, e.g. `+1.25%`
pub fn format_percentage(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) if v > 0.0 => format!("+{v:.2}%"),
        Some(v) => format!("{v:.2}%"),
        None => MISSING.to_string(),
    }
}

/// Remove spoiler notes from a synopsis; drop it entirely if little is left
pub fn clean_synopsis(value: Option<&str>) -> Option<String> {
    let cleaned = SPOILER_NOTE.replace_all(value?, "");
    let cleaned = cleaned.trim();

    (cleaned.chars().count() > 30).then(|| cleaned.to_string())
}

/// Truncate to `max_chars` characters, appending `...` when shortened
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head.trim_end())
    }
}

/// Upper-case the first letter of every word
pub fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
