//! Lenient readers for loosely-typed BSON documents.
//!
//! Legacy documents mix numeric widths and occasionally store the wrong type
//! altogether, so readers return `None` instead of failing.

use bson::{Bson, Document};

/// Resolve a dotted path through nested documents. Arrays are not traversed.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        match current {
            Bson::Document(inner) => current = inner.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Numeric value as `f64`. Non-numeric values (including strings) are `None`.
pub fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) if v.is_finite() => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

/// Integral value as `i64`. Doubles are accepted only when they hold a whole number.
pub fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
        _ => None,
    }
}

/// String value that is present and not empty.
pub fn as_non_empty_str(value: &Bson) -> Option<&str> {
    match value {
        Bson::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Render an identifier-like value as an opaque string.
///
/// Strings pass through; object ids become hex; integers are formatted.
/// `null`, missing and structured values yield `None`.
pub fn id_string(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) if !s.is_empty() => Some(s.clone()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        Bson::Int32(v) => Some(v.to_string()),
        Bson::Int64(v) => Some(v.to_string()),
        _ => None,
    }
}

/// Numeric field of a document, see [`as_f64`].
pub fn f64_field(doc: &Document, path: &str) -> Option<f64> {
    get_path(doc, path).and_then(as_f64)
}

/// Integral field of a document, see [`as_i64`].
pub fn i64_field(doc: &Document, path: &str) -> Option<i64> {
    get_path(doc, path).and_then(as_i64)
}
