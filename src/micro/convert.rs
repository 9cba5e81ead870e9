use super::node::MicroElement;
use crate::core::{DaoError, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Converts a domain type to and from a [`MicroElement`].
pub trait MicroTypeConverter {
    type Native;

    fn to_micro_element(value: &Self::Native, tag_name: &str) -> MicroElement;

    fn to_native(element: &MicroElement) -> Result<Self::Native>;
}

pub fn format_date_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse_date_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DaoError::Conversion(format!("Invalid date time '{}': {}", value, e)))
}

/// Optional date-time attribute; absent is `None`, malformed is an error.
pub fn date_time_attribute(element: &MicroElement, name: &str) -> Result<Option<DateTime<Utc>>> {
    element.attribute(name).map(parse_date_time).transpose()
}

/// Lenient boolean as written by older files: only "true" (any case) is true.
pub fn parse_bool(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

pub fn required_attribute<'a>(element: &'a MicroElement, name: &str) -> Result<&'a str> {
    element.attribute(name).ok_or_else(|| {
        DaoError::Conversion(format!(
            "Element '{}' is missing attribute '{}'",
            element.name(),
            name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_time_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 2, 29, 13, 5, 9).unwrap();
        let text = format_date_time(&dt);
        assert_eq!(text, "2024-02-29T13:05:09Z");
        assert_eq!(parse_date_time(&text).unwrap(), dt);
        assert!(parse_date_time("yesterday").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some("TRUE")));
        assert!(!parse_bool(Some("yes")));
        assert!(!parse_bool(None));
    }

    #[test]
    fn test_attribute_helpers() {
        let mut e = MicroElement::new("e");
        e.set_attribute("id", "x").set_attribute("dt", "bad");
        assert_eq!(required_attribute(&e, "id").unwrap(), "x");
        assert!(required_attribute(&e, "other").is_err());
        assert!(date_time_attribute(&e, "dt").is_err());
        assert!(date_time_attribute(&e, "none").unwrap().is_none());
    }
}
