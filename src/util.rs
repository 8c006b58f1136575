// Utility helpers for value coercion and number formatting.
//
// This module centralizes all the "dirty" value handling so the rest of the
// code can assume clean, typed numbers.
use num_format::{Locale, ToFormattedString};
use serde_json::Value;

/// Coerce an arbitrary scalar value into `f64`, falling back to `default`
/// whenever the value cannot be read as a number.
///
/// - `Null` (absent field) yields the default.
/// - JSON numbers are converted losslessly; non-finite values fall back.
/// - Strings are trimmed and parsed as floats.
/// - Booleans, arrays, objects and unparseable strings all fall back.
///
/// Every aggregation and export goes through this function; it is the single
/// point where malformed upstream data is neutralized, and it never fails.
pub fn safe_number(value: &Value, default: f64) -> f64 {
    match value {
        Value::Null => default,
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => f,
            _ => default,
        },
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return default;
            }
            s.parse::<f64>().unwrap_or(default)
        }
        _ => default,
    }
}

pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>().ok()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // row counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_yields_default() {
        assert_eq!(safe_number(&Value::Null, 0.0), 0.0);
        assert_eq!(safe_number(&Value::Null, 7.5), 7.5);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(safe_number(&json!(20.5), 0.0), 20.5);
        assert_eq!(safe_number(&json!(42), 0.0), 42.0);
        assert_eq!(safe_number(&json!(-3), 1.0), -3.0);
    }

    #[test]
    fn parseable_strings_are_parsed() {
        assert_eq!(safe_number(&json!("15.3"), 0.0), 15.3);
        assert_eq!(safe_number(&json!("  8 "), 0.0), 8.0);
    }

    #[test]
    fn garbage_yields_default() {
        assert_eq!(safe_number(&json!("not-a-number"), 0.0), 0.0);
        assert_eq!(safe_number(&json!(""), 2.0), 2.0);
        assert_eq!(safe_number(&json!(true), 3.0), 3.0);
        assert_eq!(safe_number(&json!([1, 2]), 4.0), 4.0);
    }

    #[test]
    fn formats_with_thousands_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1200.5, 2), "-1,200.50");
        assert_eq!(format_number(0.0, 2), "0.00");
    }
}
