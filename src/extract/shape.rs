//! Cheap shape probes over raw payload bodies.
//!
//! Vendor firmware revisions answer the same endpoints with different
//! shapes. Each body is tagged with the one variant it resembles before
//! any full decode runs, so malformed responses short-circuit here
//! instead of failing deep inside index arithmetic.

use serde_json::Value;

use crate::fetcher::RawBody;

/// Positional arrays shorter than this carry nothing we can index safely.
pub const MIN_ARRAY_LEN: usize = 29;

/// Main fixed-index fields need the longer revision of the array.
pub const FULL_ARRAY_LEN: usize = 30;

/// Recognized vendor response shapes, in no particular order.
#[derive(Debug, Clone, Copy)]
pub enum VendorShape<'a> {
    /// Small object with numeric-coded state fields.
    CodedStatus(&'a serde_json::Map<String, Value>),
    /// Flat positional array, meaning defined by element order.
    PositionalArrayV1(&'a [Value]),
    /// Divergent revision: array elements are themselves JSON-encoded
    /// nested arrays needing a second decode pass.
    PositionalArrayV2Nested(&'a [Value]),
    /// HTML page with at least one table row.
    HtmlTable(&'a str),
    /// HTML or plain text without usable rows; line-oriented fallback.
    HtmlFreeText(&'a str),
}

/// Parses a string element as JSON and checks for the array-of-arrays
/// layout the v2 firmware uses for channel tables.
pub fn parse_nested_table(element: &Value) -> Option<Vec<Value>> {
    let text = element.as_str()?;
    let parsed: Value = serde_json::from_str(text).ok()?;
    let rows = match parsed {
        Value::Array(rows) => rows,
        _ => return None,
    };
    if rows.is_empty() || !rows.iter().all(Value::is_array) {
        return None;
    }
    Some(rows)
}

/// Tags a body with the shape its decode strategy expects, or `None`
/// when no strategy can use it.
pub fn classify(body: &RawBody) -> Option<VendorShape<'_>> {
    match body {
        RawBody::Json(Value::Object(map)) => Some(VendorShape::CodedStatus(map)),
        RawBody::Json(Value::Array(items)) => {
            if items.iter().any(|e| parse_nested_table(e).is_some()) {
                Some(VendorShape::PositionalArrayV2Nested(items))
            } else if items.len() >= MIN_ARRAY_LEN {
                Some(VendorShape::PositionalArrayV1(items))
            } else {
                None
            }
        }
        RawBody::Json(_) => None,
        RawBody::Html(text) => {
            if text.to_lowercase().contains("<tr") {
                Some(VendorShape::HtmlTable(text))
            } else {
                Some(VendorShape::HtmlFreeText(text))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_short_array_has_no_shape() {
        let body = RawBody::Json(json!(["a", "b", "c"]));
        assert!(classify(&body).is_none());
    }

    #[test]
    fn test_long_array_is_v1() {
        let body = RawBody::Json(json!(vec!["x"; 29]));
        assert!(matches!(
            classify(&body),
            Some(VendorShape::PositionalArrayV1(_))
        ));
    }

    #[test]
    fn test_nested_string_elements_are_v2() {
        let body = RawBody::Json(json!(["[[1,2],[3,4]]", "Locked"]));
        assert!(matches!(
            classify(&body),
            Some(VendorShape::PositionalArrayV2Nested(_))
        ));
    }

    #[test]
    fn test_scalar_json_has_no_shape() {
        let body = RawBody::Json(json!(42));
        assert!(classify(&body).is_none());
    }

    #[test]
    fn test_html_with_rows_is_table() {
        let body = RawBody::Html("<table><tr><td>x</td></tr></table>".into());
        assert!(matches!(classify(&body), Some(VendorShape::HtmlTable(_))));
    }

    #[test]
    fn test_plain_text_is_free_text() {
        let body = RawBody::Html("Cable Modem Status\nOnline".into());
        assert!(matches!(
            classify(&body),
            Some(VendorShape::HtmlFreeText(_))
        ));
    }

    mod nested_table_tests {
        use super::*;

        #[test]
        fn test_rejects_flat_array_string() {
            assert!(parse_nested_table(&json!("[1,2,3]")).is_none());
        }

        #[test]
        fn test_rejects_empty_array_string() {
            assert!(parse_nested_table(&json!("[]")).is_none());
        }

        #[test]
        fn test_accepts_array_of_arrays() {
            let rows = parse_nested_table(&json!("[[1],[2],[3]]")).unwrap();
            assert_eq!(rows.len(), 3);
        }

        #[test]
        fn test_rejects_malformed_json() {
            assert!(parse_nested_table(&json!("[[1,2")).is_none());
        }
    }
}
