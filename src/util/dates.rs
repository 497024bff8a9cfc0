//! Date parsing for request payloads.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {field}: expected YYYY-MM-DD, got '{value}'")]
pub struct DateParseError {
    pub field: String,
    pub value: String,
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| DateParseError {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Empty strings count as "no date".
pub fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, DateParseError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(field, v).map(Some),
    }
}

/// Local calendar date of the server.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Deserializes `Option<Option<T>>` so a missing field (`None`) differs from
/// an explicit `null` (`Some(None)`). Use with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        fitting_date: Option<Option<String>>,
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("booking_date", "2024-02-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
        let err = parse_date("booking_date", "01/02/2024").unwrap_err();
        assert_eq!(err.field, "booking_date");
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date("d", None).unwrap(), None);
        assert_eq!(parse_optional_date("d", Some("")).unwrap(), None);
        assert!(parse_optional_date("d", Some("2024-13-01")).is_err());
    }

    #[test]
    fn test_double_option_distinguishes_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.fitting_date, None);
        let null: Patch = serde_json::from_str(r#"{"fitting_date": null}"#).unwrap();
        assert_eq!(null.fitting_date, Some(None));
        let set: Patch = serde_json::from_str(r#"{"fitting_date": "2024-03-01"}"#).unwrap();
        assert_eq!(set.fitting_date, Some(Some("2024-03-01".to_string())));
    }
}
