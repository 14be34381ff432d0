use chrono::{DateTime as ChronoDateTime, NaiveDate, NaiveDateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::ApiError;

pub fn parse_object_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::validation("Identificador inválido"))
}

pub fn serialize_object_id<S>(id: &Option<ObjectId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id {
        Some(id) => serializer.serialize_str(&id.to_hex()),
        None => serializer.serialize_none(),
    }
}

/// Anchored case-insensitive equality filter for query-time joins on
/// `titulo` / `nombre` fields. Metacharacters in the user-supplied value
/// are escaped so the match stays an exact comparison.
pub fn ci_exact(value: &str) -> Document {
    doc! { "$regex": format!("^{}$", escape_regex(value)), "$options": "i" }
}

pub fn escape_regex(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(
            c,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Parses the ISO-8601 date forms the API accepts: a full RFC 3339 string
/// (a trailing `Z` is treated as `+00:00`), a naive date-time with `T` or
/// space separator, or a bare date. Naive forms are taken as UTC; a bare
/// date means midnight.
pub fn parse_iso_datetime(value: &str) -> Option<ChronoDateTime<Utc>> {
    if let Ok(dt) = ChronoDateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Builds a `$set` document from a partial-update struct: the struct is
/// serialized to JSON and every non-null field becomes an update entry.
/// An empty result means the request carried nothing updatable.
pub fn update_document<T: Serialize>(update: &T) -> Document {
    let json = serde_json::to_value(update).unwrap_or_else(|_| Value::Object(Default::default()));

    let mut update_doc = Document::new();
    if let Value::Object(obj) = json {
        for (key, value) in obj {
            if !value.is_null() {
                let bson_value = match Bson::try_from(value) {
                    Ok(bv) => bv,
                    Err(_) => continue,
                };
                update_doc.insert(key, bson_value);
            }
        }
    }
    update_doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn escapes_regex_metacharacters() {
        assert_eq!(escape_regex("Sala 1"), "Sala 1");
        assert_eq!(escape_regex("C.R.E.A.M"), "C\\.R\\.E\\.A\\.M");
        assert_eq!(escape_regex("(500) Days"), "\\(500\\) Days");
    }

    #[test]
    fn ci_exact_is_anchored() {
        let filter = ci_exact("Dune");
        assert_eq!(filter.get_str("$regex").unwrap(), "^Dune$");
        assert_eq!(filter.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn parses_rfc3339_with_z_suffix() {
        let dt = parse_iso_datetime("2025-12-09T19:00:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-12-09T19:00:00+00:00");
    }

    #[test]
    fn parses_explicit_offset() {
        let dt = parse_iso_datetime("2025-12-09T19:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-12-09T17:00:00+00:00");
    }

    #[test]
    fn naive_datetime_is_taken_as_utc() {
        let dt = parse_iso_datetime("2025-12-09T19:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-12-09T19:00:00+00:00");
    }

    #[test]
    fn space_separated_datetime_is_taken_as_utc() {
        let dt = parse_iso_datetime("2025-12-09 19:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-12-09T19:00:00+00:00");
        let dt = parse_iso_datetime("2025-12-09 19:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-12-09T19:00:00+00:00");
    }

    #[test]
    fn bare_date_means_midnight_utc() {
        let dt = parse_iso_datetime("2025-12-09").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-12-09T00:00:00+00:00");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_iso_datetime("mañana por la tarde").is_none());
        assert!(parse_iso_datetime("2025-13-40T99:00:00Z").is_none());
        assert!(parse_iso_datetime("").is_none());
    }

    #[derive(Serialize)]
    struct PartialUpdate {
        titulo: Option<String>,
        imagen_uri: Option<String>,
    }

    #[test]
    fn update_document_drops_nulls() {
        let update = PartialUpdate {
            titulo: Some("Dune".into()),
            imagen_uri: None,
        };
        let doc = update_document(&update);
        assert_eq!(doc.get_str("titulo").unwrap(), "Dune");
        assert!(!doc.contains_key("imagen_uri"));
    }

    #[test]
    fn update_document_empty_when_nothing_set() {
        let update = PartialUpdate {
            titulo: None,
            imagen_uri: None,
        };
        assert!(update_document(&update).is_empty());
    }

    #[test]
    fn object_id_serializes_as_hex_string() {
        #[derive(Serialize)]
        struct Doc {
            #[serde(serialize_with = "serialize_object_id")]
            id: Option<ObjectId>,
        }
        let id = ObjectId::parse_str("65f0123456789abcdef01234").unwrap();
        let json = serde_json::to_value(Doc { id: Some(id) }).unwrap();
        assert_eq!(json["id"], "65f0123456789abcdef01234");
    }
}
