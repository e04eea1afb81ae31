use crate::domain::row::{NormalizedRow, Row, is_date_field};
use chrono::{Days, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::LazyLock;

/// Inclusive range of spreadsheet day serials treated as dates (1954-10-03 to 2119-01-10).
pub const SERIAL_RANGE: (f64, f64) = (20_000.0, 80_000.0);

const CANONICAL_FORMAT: &str = "%m/%d/%Y";

static FULL_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").expect("static regex"));
static SHORT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2})$").expect("static regex"));
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[/-](\d{1,2})[/-](\d{1,2})$").expect("static regex"));
static SERIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("static regex"));

/// Rewrites every date field of `row` (at any nesting depth) to `MM/DD/YYYY`.
///
/// Values that cannot be interpreted as a date are passed through untouched,
/// so this never fails. Applying it to an already normalized row is a no-op.
pub fn normalize(row: &Row) -> NormalizedRow {
    let mut row = row.clone();
    normalize_map(row.fields_mut());
    NormalizedRow::new(row)
}

fn normalize_map(fields: &mut Map<String, Value>) {
    for (name, value) in fields.iter_mut() {
        if is_date_field(name) && !value.is_object() && !value.is_array() {
            *value = normalize_date_value(value);
        } else {
            normalize_nested(value);
        }
    }
}

fn normalize_nested(value: &mut Value) {
    match value {
        Value::Object(fields) => normalize_map(fields),
        Value::Array(items) => items.iter_mut().for_each(normalize_nested),
        _ => {}
    }
}

/// Canonicalizes a single date value, best effort.
pub fn normalize_date_value(value: &Value) -> Value {
    let canonical = match value {
        Value::Number(number) => number.as_f64().and_then(serial_to_date),
        Value::String(text) => canonicalize_date_text(text.trim()),
        _ => None,
    };

    match canonical {
        Some(date) => Value::String(date.format(CANONICAL_FORMAT).to_string()),
        None => value.clone(),
    }
}

fn canonicalize_date_text(text: &str) -> Option<NaiveDate> {
    if SERIAL.is_match(text) {
        return text.parse::<f64>().ok().and_then(serial_to_date);
    }
    if let Some(caps) = FULL_YEAR.captures(text) {
        return ymd(&caps[3], &caps[1], &caps[2], |year| year);
    }
    if let Some(caps) = SHORT_YEAR.captures(text) {
        return ymd(&caps[3], &caps[1], &caps[2], expand_two_digit_year);
    }
    if let Some(caps) = ISO_DATE.captures(text) {
        return ymd(&caps[1], &caps[2], &caps[3], |year| year);
    }
    None
}

fn ymd(year: &str, month: &str, day: &str, expand: impl Fn(i32) -> i32) -> Option<NaiveDate> {
    let year = expand(year.parse().ok()?);
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

/// Sliding century window: `00..=49` land in the 2000s, `50..=99` in the 1900s.
pub fn expand_two_digit_year(year: i32) -> i32 {
    if year < 50 { 2000 + year } else { 1900 + year }
}

/// Converts a 1900-date-system day serial into a calendar date.
///
/// Day 0 is 1899-12-30, which absorbs the phantom 1900-02-29 of that system.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(SERIAL_RANGE.0..=SERIAL_RANGE.1).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Parses a canonical `MM/DD/YYYY` date.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), CANONICAL_FORMAT).ok()
}

/// Parses a formatted amount as a signed decimal.
///
/// Currency symbols and codes around the number, whitespace and thousands
/// separators are stripped. `(12.50)` and `12.50-` are read as negative, and
/// `1.234,50` is read with a decimal comma. Letters inside the number make
/// the amount unparseable.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let parenthesized = trimmed.len() > 1 && trimmed.starts_with('(') && trimmed.ends_with(')');
    let inner = if parenthesized {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let body = inner.trim_matches(|c: char| !is_number_char(c));
    if body.chars().any(char::is_alphabetic) {
        return None;
    }

    let mut cleaned: String = body
        .chars()
        .filter(|&c| is_number_char(c) || c == ',')
        .collect();
    let mut negative = parenthesized;
    if cleaned.len() > 1 && cleaned.ends_with('-') {
        cleaned.pop();
        negative = true;
    }

    let decimal_comma = matches!(
        (cleaned.rfind(','), cleaned.rfind('.')),
        (Some(comma), Some(dot)) if comma > dot
    );
    let cleaned: String = if decimal_comma {
        cleaned
            .chars()
            .filter(|&c| c != '.')
            .map(|c| if c == ',' { '.' } else { c })
            .collect()
    } else {
        cleaned.chars().filter(|&c| c != ',').collect()
    };
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    Some(if negative { -value.abs() } else { value })
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date_of(value: Value) -> Value {
        let row = Row::new().with("Date", value);
        normalize(&row).get("Date").cloned().unwrap()
    }

    #[test]
    fn test_full_year_is_zero_padded() {
        assert_eq!(date_of(json!("1/5/2024")), json!("01/05/2024"));
        assert_eq!(date_of(json!("01-29-2024")), json!("01/29/2024"));
    }

    #[test]
    fn test_two_digit_year_window() {
        assert_eq!(expand_two_digit_year(24), 2024);
        assert_eq!(expand_two_digit_year(71), 1971);
        assert_eq!(expand_two_digit_year(49), 2049);
        assert_eq!(expand_two_digit_year(50), 1950);
        assert_eq!(date_of(json!("1/29/24")), json!("01/29/2024"));
        assert_eq!(date_of(json!("12-31-71")), json!("12/31/1971"));
    }

    #[test]
    fn test_serial_number_converts() {
        // 45320 is 2024-01-29 in the 1900 date system
        assert_eq!(date_of(json!(45320)), json!("01/29/2024"));
        assert_eq!(date_of(json!(45320.75)), json!("01/29/2024"));
        assert_eq!(date_of(json!("45320")), json!("01/29/2024"));
    }

    #[test]
    fn test_out_of_range_serial_passes_through() {
        assert_eq!(date_of(json!(24)), json!(24));
        assert_eq!(date_of(json!("24")), json!("24"));
        assert_eq!(date_of(json!(999_999)), json!(999_999));
    }

    #[test]
    fn test_iso_date_converts() {
        assert_eq!(date_of(json!("2024-01-29")), json!("01/29/2024"));
        assert_eq!(date_of(json!("2024/1/9")), json!("01/09/2024"));
    }

    #[test]
    fn test_unparseable_passes_through_unchanged() {
        assert_eq!(date_of(json!("next tuesday")), json!("next tuesday"));
        assert_eq!(date_of(json!("13/45/2024")), json!("13/45/2024"));
        assert_eq!(date_of(json!(null)), json!(null));
    }

    #[test]
    fn test_only_date_fields_are_touched() {
        let row = Row::new()
            .with("Posted", "1/5/2024")
            .with(" DATE ", "1/5/2024");
        let normalized = normalize(&row);
        assert_eq!(normalized.get("Posted"), Some(&json!("1/5/2024")));
        assert_eq!(normalized.get(" DATE "), Some(&json!("01/05/2024")));
    }

    #[test]
    fn test_nested_date_fields_are_normalized() {
        let row = Row::new().with(
            "meta",
            json!({"date": "2/3/24", "lines": [{"Date": 45320}, {"memo": "x"}]}),
        );
        let normalized = normalize(&row);
        assert_eq!(
            normalized.get("meta"),
            Some(&json!({"date": "02/03/2024", "lines": [{"Date": "01/29/2024"}, {"memo": "x"}]}))
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let rows = [
            Row::new().with("Date", "1/5/24"),
            Row::new().with("Date", json!(45320)),
            Row::new().with("Date", "2024-01-29"),
            Row::new().with("Date", "garbage"),
            Row::new().with("date", json!({"date": "7-4-1999"})),
        ];
        for row in rows {
            let once = normalize(&row);
            let twice = normalize(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(
            parse_calendar_date("01/29/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 29)
        );
        assert_eq!(parse_calendar_date("2024-01-29"), None);
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("1000.00"), Some(dec!(1000.00)));
        assert_eq!(parse_amount("$1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount("USD 99"), Some(dec!(99)));
        assert_eq!(parse_amount("-42.10"), Some(dec!(-42.10)));
        assert_eq!(parse_amount("(1,000.00)"), Some(dec!(-1000.00)));
        assert_eq!(parse_amount("250.00-"), Some(dec!(-250.00)));
    }

    #[test]
    fn test_parse_amount_failures() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("5e3"), None);
        assert_eq!(parse_amount("12abc34"), None);
    }

    #[test]
    fn test_parse_amount_edges_and_decimal_comma() {
        assert_eq!(parse_amount("1.000,50"), Some(dec!(1000.50)));
        assert_eq!(parse_amount("EUR 2.500,00"), Some(dec!(2500.00)));
        assert_eq!(parse_amount("1,000"), Some(dec!(1000)));
        assert_eq!(parse_amount("99 USD"), Some(dec!(99)));
        assert_eq!(parse_amount("-$5.25"), Some(dec!(-5.25)));
    }
}
