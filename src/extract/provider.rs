//! ISP provider identification.
//!
//! Liberty Global ships the same firmware to several brands and stamps a
//! numeric customer id into the management pages. Two decode paths exist:
//! the positional array carries the id as an integer, the root page as a
//! `customerId` JavaScript literal. Their unknown-id fallback strings
//! differ on purpose; both are pinned by tests and must not be unified
//! without product-owner sign-off.

use regex::Regex;

use crate::extract::shape::VendorShape;
use crate::models::{Field, StatusRecord, Value};

/// Closed customer-id table, collected from live devices.
const PROVIDERS: [(i64, &str); 7] = [
    (6, "Virgin Media (VTR)"),
    (8, "Virgin Media"),
    (20, "Ziggo"),
    (41, "Virgin Media Ireland"),
    (44, "Telekom Austria"),
    (50, "Yallo"),
    (51, "Sunrise"),
];

/// Brand-specific identifiers seen in the firmware's JavaScript when no
/// numeric customer id is exposed.
const BRAND_MARKERS: [(&str, &str); 4] = [
    ("virginmedia", "Virgin Media"),
    ("ziggo", "Ziggo"),
    ("sunrise", "Sunrise"),
    ("yallo", "Yallo"),
];

pub fn name_for_id(id: i64) -> Option<&'static str> {
    PROVIDERS
        .iter()
        .find(|(code, _)| *code == id)
        .map(|(_, name)| *name)
}

/// Rendering used by the positional-array decode path.
pub fn from_array_id(id: i64) -> String {
    match name_for_id(id) {
        Some(name) => name.to_string(),
        None => format!("Unknown ISP ID={}", id),
    }
}

/// Rendering used by the JavaScript-literal decode path.
fn from_script_id(id: i64) -> String {
    match name_for_id(id) {
        Some(name) => name.to_string(),
        None => format!("Liberty Global International (ID: {})", id),
    }
}

/// Two-stage decode over the root page: `customerId` literal first, brand
/// marker scan second. Only runs when some HTML body was fetched.
pub fn strategy(shapes: &[VendorShape<'_>]) -> StatusRecord {
    let mut record = StatusRecord::new();
    for shape in shapes {
        let html = match shape {
            VendorShape::HtmlTable(text) | VendorShape::HtmlFreeText(text) => text,
            _ => continue,
        };
        if !record.contains(Field::IspProvider) {
            record.set(Field::IspProvider, Value::Text(detect(html)));
        }
    }
    record
}

pub fn detect(html: &str) -> String {
    if let Some(id) = customer_id_literal(html) {
        return from_script_id(id);
    }

    let lowered = html.to_lowercase();
    for (marker, name) in BRAND_MARKERS {
        if lowered.contains(marker) {
            return name.to_string();
        }
    }
    "Unknown Provider".to_string()
}

/// Matches the customer id however the firmware spells it: assignment,
/// object property or function call.
fn customer_id_literal(html: &str) -> Option<i64> {
    let patterns = [
        r#"customerId\s*[:=]\s*['"]?(\d+)"#,
        r"customerId\s*\(\s*(\d+)\s*\)",
    ];
    for pattern in patterns {
        // The pattern literals are compile-checked by tests; per-cycle
        // compilation is fine at one page every 30 seconds.
        let re = Regex::new(pattern).ok()?;
        if let Some(captures) = re.captures(html) {
            if let Ok(id) = captures[1].parse() {
                return Some(id);
            }
        }
    }
    None
}
