//! Scalar coercers: raw query strings into typed `Bson` scalars.
//!
//! Pure functions. The field name is threaded through only so failures can
//! name the offending parameter in the client error payload.

use crate::errors::ApiError;
use bson::Bson;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").expect("number pattern")
});

/// Accepts an unambiguous signed integer or decimal. Integers come back as
/// `Bson::Int64`, decimals as `Bson::Double`. No exponents, no hex, no
/// inf/nan spellings, no surrounding whitespace.
///
/// # Errors
/// `ApiError::InvalidNumber` carrying the field and the raw value.
pub fn coerce_number(field: &str, raw: &str) -> Result<Bson, ApiError> {
    let invalid = || ApiError::InvalidNumber { field: field.to_string(), value: raw.to_string() };
    if !NUMBER_RE.is_match(raw) {
        return Err(invalid());
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Bson::Int64(i));
    }
    raw.parse::<f64>().map(Bson::Double).map_err(|_| invalid())
}

/// Accepts exactly `DD.MM.YYYY`, fixed-width and zero-padded, and returns
/// the UTC midnight instant as `Bson::DateTime`. Calendar validation is
/// strict: month 13 or 29.02 of a non-leap year fail instead of rolling
/// over.
///
/// # Errors
/// `ApiError::InvalidDate` carrying the field and the raw value.
pub fn coerce_date(field: &str, raw: &str) -> Result<Bson, ApiError> {
    let invalid = || ApiError::InvalidDate { field: field.to_string(), value: raw.to_string() };
    if !is_date_shaped(raw) {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(raw, "%d.%m.%Y").map_err(|_| invalid())?;
    let millis = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    Ok(Bson::DateTime(bson::DateTime::from_millis(millis)))
}

// chrono accepts unpadded day/month for %d.%m; the wire format is fixed
// width, so the shape is checked first.
fn is_date_shaped(raw: &str) -> bool {
    let b = raw.as_bytes();
    b.len() == 10
        && b[2] == b'.'
        && b[5] == b'.'
        && b.iter().enumerate().all(|(i, c)| i == 2 || i == 5 || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Datelike, Utc};

    #[test]
    fn integers_and_decimals_coerce() {
        assert_eq!(coerce_number("year", "2020").unwrap(), Bson::Int64(2020));
        assert_eq!(coerce_number("rating.kp", "-5").unwrap(), Bson::Int64(-5));
        assert_eq!(coerce_number("rating.kp", "7.5").unwrap(), Bson::Double(7.5));
        assert_eq!(coerce_number("rating.kp", "+7.5").unwrap(), Bson::Double(7.5));
    }

    #[test]
    fn junk_numbers_fail_with_field_and_value() {
        for raw in ["", " 5", "5 ", "abc", "1e5", "0x10", "nan", "inf", "5.", ".5", "1,5"] {
            let err = coerce_number("year", raw).unwrap_err();
            match err {
                ApiError::InvalidNumber { field, value } => {
                    assert_eq!(field, "year");
                    assert_eq!(value, raw);
                }
                other => panic!("unexpected error for {raw:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn valid_date_round_trips() {
        let Bson::DateTime(dt) = coerce_date("premiere.world", "01.01.2021").unwrap() else {
            panic!("expected DateTime");
        };
        let back = DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).unwrap();
        assert_eq!((back.day(), back.month(), back.year()), (1, 1, 2021));
    }

    #[test]
    fn calendar_is_strict_not_lenient() {
        // 2021 is not a leap year; must fail, never roll to 01.03.
        assert!(matches!(
            coerce_date("birthday", "29.02.2021"),
            Err(ApiError::InvalidDate { .. })
        ));
        assert!(coerce_date("birthday", "29.02.2020").is_ok());
        assert!(coerce_date("birthday", "32.01.2021").is_err());
        assert!(coerce_date("birthday", "05.13.2021").is_err());
    }

    #[test]
    fn fixed_width_zero_padded_only() {
        for raw in ["5.9.2021", "05.9.2021", "5.09.2021", "2021-09-05", "05/09/2021", "05.09.21"] {
            assert!(coerce_date("birthday", raw).is_err(), "{raw}");
        }
        assert!(coerce_date("birthday", "05.09.2021").is_ok());
    }
}
