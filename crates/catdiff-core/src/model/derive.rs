//! Derived image attributes.
//!
//! Computed once while a snapshot is built so that every comparison sees
//! the same normalized values.

use crate::model::value::{GeoPoint, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts seen in catalog capture times; interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y:%m:%d %H:%M:%S",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

/// Parse a capture-time string.
///
/// Returns `None` when no known layout matches; callers log and treat the
/// value as absent.
pub fn parse_capture_time(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(s, format) {
            return Some(t.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(n) = NaiveDateTime::parse_from_str(s, format) {
            return Some(n.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

/// Compose a coordinate pair.
///
/// Both coordinates must be present and numeric; anything else collapses to
/// a single absent value so that two missing locations compare equal.
pub fn compose_location(latitude: Option<&Value>, longitude: Option<&Value>) -> Option<GeoPoint> {
    let lat = latitude.and_then(Value::as_f64)?;
    let lon = longitude.and_then(Value::as_f64)?;
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    Some(GeoPoint::new(lat, lon))
}

/// Compose a `file://` link from root folder, folder path and file name.
pub fn compose_file_link(
    root_path: Option<&Value>,
    folder_path: Option<&Value>,
    filename: Option<&Value>,
) -> Option<String> {
    let root = root_path.and_then(Value::as_text)?;
    let folder = folder_path.and_then(Value::as_text)?;
    let filename = filename.and_then(Value::as_text)?;

    let mut link = String::from("file://");
    for segment in [root, folder] {
        link.push_str(segment);
        if !segment.is_empty() && !segment.ends_with('/') {
            link.push('/');
        }
    }
    link.push_str(filename);
    Some(link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_catalog_layouts() {
        let expected = Utc.with_ymd_and_hms(2019, 8, 10, 14, 33, 21).unwrap();
        assert_eq!(parse_capture_time("2019-08-10T14:33:21"), Some(expected));
        assert_eq!(parse_capture_time("2019-08-10 14:33:21"), Some(expected));
        assert_eq!(parse_capture_time("2019:08:10 14:33:21"), Some(expected));
        assert_eq!(parse_capture_time("2019-08-10T16:33:21+02:00"), Some(expected));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let t = parse_capture_time("2019-08-10T14:33:21.53").unwrap();
        assert_eq!(t.timestamp_subsec_millis(), 530);
    }

    #[test]
    fn test_parse_date_only() {
        let expected = Utc.with_ymd_and_hms(2019, 8, 10, 0, 0, 0).unwrap();
        assert_eq!(parse_capture_time("2019-08-10"), Some(expected));
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_capture_time("not a date"), None);
        assert_eq!(parse_capture_time(""), None);
    }

    #[test]
    fn test_location_requires_both_coordinates() {
        let lat = Value::Real(48.1);
        let lon = Value::Real(11.5);
        assert_eq!(
            compose_location(Some(&lat), Some(&lon)),
            Some(GeoPoint::new(48.1, 11.5))
        );
        assert_eq!(compose_location(Some(&lat), None), None);
        assert_eq!(compose_location(None, Some(&lon)), None);
        assert_eq!(compose_location(None, None), None);
    }

    #[test]
    fn test_file_link() {
        let root = Value::from("/Users/me/Pictures/");
        let folder = Value::from("2019/08");
        let name = Value::from("photo.jpg");
        assert_eq!(
            compose_file_link(Some(&root), Some(&folder), Some(&name)).as_deref(),
            Some("file:///Users/me/Pictures/2019/08/photo.jpg")
        );
        assert_eq!(compose_file_link(Some(&root), None, Some(&name)), None);
    }
}
