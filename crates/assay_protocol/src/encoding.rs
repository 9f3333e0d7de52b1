//! Value encodings used by the collector and quartermaster argument maps.
//!
//! Numeric values arrive underscore-encoded (a type tag, an underscore run,
//! then the payload, e.g. `i__42`), dates arrive in ctime-like form, and
//! missing text is represented by the literal string `"null"`. The decoders
//! are deliberately forgiving: a malformed value is logged and decoded to
//! the type's zero rather than failing the whole request.

use crate::ProtocolError;
use chrono::NaiveDateTime;
use tracing::warn;

/// Literal stand-in for absent text values.
pub const NULL_STRING: &str = "null";

/// Input pattern for assessment dates, e.g. `Mon Jul 4 12:30:05 2016`.
const DATE_FORMAT_IN: &str = "%a %b %d %H:%M:%S %Y";
/// Storage pattern for assessment dates.
const DATE_FORMAT_OUT: &str = "%Y-%m-%d %H:%M:%S";

/// Decode an underscore-encoded integer. `i__42` decodes to 42; anything
/// that cannot be decoded yields 0.
pub fn decode_integer_from_string(value: Option<&str>) -> i64 {
    let Some(value) = value else { return 0 };
    if value.is_empty() {
        return 0;
    }
    if !value.contains('_') {
        warn!(value, "integer value is not underscore encoded");
        return 0;
    }
    let payload = value.rsplit('_').next().unwrap_or_default();
    match payload.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            warn!(value, "could not decode integer value");
            0
        }
    }
}

/// Decode an underscore-encoded double, 0.0 on any failure.
pub fn decode_double_from_string(value: Option<&str>) -> f64 {
    let Some(value) = value else { return 0.0 };
    if value.is_empty() {
        return 0.0;
    }
    if !value.contains('_') {
        warn!(value, "double value is not underscore encoded");
        return 0.0;
    }
    let payload = value.rsplit('_').next().unwrap_or_default();
    match payload.parse::<f64>() {
        Ok(x) => x,
        Err(_) => {
            warn!(value, "could not decode double value");
            0.0
        }
    }
}

/// Reformat an assessment date from `Mon Jul 4 12:30:05 2016` form to
/// `2016-07-04 12:30:05` form.
pub fn convert_date_string(value: &str) -> Result<String, ProtocolError> {
    let parsed = NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT_IN)
        .map_err(|_| ProtocolError::DateParse(value.to_string()))?;
    Ok(parsed.format(DATE_FORMAT_OUT).to_string())
}

/// Normalize absent or empty text to the literal `"null"`.
pub fn validate_string_argument(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NULL_STRING.to_string(),
    }
}

/// Normalize absent text to the empty string.
pub fn check_string_for_null(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_integer() {
        assert_eq!(decode_integer_from_string(Some("i__42")), 42);
        assert_eq!(decode_integer_from_string(Some("i_7")), 7);
        assert_eq!(decode_integer_from_string(Some("")), 0);
        assert_eq!(decode_integer_from_string(None), 0);
        assert_eq!(decode_integer_from_string(Some("42")), 0);
        assert_eq!(decode_integer_from_string(Some("i__oops")), 0);
        assert_eq!(decode_integer_from_string(Some("i__-3")), -3);
    }

    #[test]
    fn test_decode_double() {
        assert_eq!(decode_double_from_string(Some("d__2.5")), 2.5);
        assert_eq!(decode_double_from_string(Some("")), 0.0);
        assert_eq!(decode_double_from_string(None), 0.0);
        assert_eq!(decode_double_from_string(Some("2.5")), 0.0);
        assert_eq!(decode_double_from_string(Some("d__oops")), 0.0);
    }

    #[test]
    fn test_convert_date_string() {
        assert_eq!(
            convert_date_string("Mon Jul 4 12:30:05 2016").unwrap(),
            "2016-07-04 12:30:05"
        );
        assert_eq!(
            convert_date_string("Fri Feb 14 01:02:03 2020").unwrap(),
            "2020-02-14 01:02:03"
        );
        assert!(convert_date_string("not a date").is_err());
        assert!(convert_date_string("").is_err());
    }

    #[test]
    fn test_validate_string_argument() {
        assert_eq!(validate_string_argument(Some("x")), "x");
        assert_eq!(validate_string_argument(Some("")), "null");
        assert_eq!(validate_string_argument(None), "null");
    }

    #[test]
    fn test_check_string_for_null() {
        assert_eq!(check_string_for_null(Some("x")), "x");
        assert_eq!(check_string_for_null(None), "");
    }
}
