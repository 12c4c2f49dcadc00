//! Decode of the network-status positional array, both firmware flavors.
//!
//! The array's meaning is defined purely by element order. Index and type
//! mismatches skip the affected field, never the strategy; a count element
//! that is not all-digit decodes to 0.

use serde_json::Value as Json;

use crate::extract::provider;
use crate::extract::shape::{self, VendorShape, FULL_ARRAY_LEN};
use crate::models::{Field, StatusRecord, Value};

// Fixed indices in the v1 array. Discovered against live firmware; there
// is no vendor documentation to cite.
const IDX_PRIMARY_LOCK: usize = 2;
const IDX_CUSTOMER_ID: usize = 4;
const IDX_NETWORK_ACCESS: usize = 5;
const IDX_MAX_CPES: usize = 6;
const IDX_BASELINE_PRIVACY: usize = 7;
const IDX_DOCSIS_MODE: usize = 8;
const IDX_CONFIG_FILE: usize = 9;
const IDX_SERVICE_FLOW_START: usize = 10;
const IDX_US_30_COUNT: usize = 25;
const IDX_DS_30_COUNT: usize = 26;
const IDX_DS_31_COUNT: usize = 27;
const IDX_US_31_COUNT: usize = 28;

/// Service-flow fields at indices 10..=19, in array order.
const SERVICE_FLOW_FIELDS: [Field; 10] = [
    Field::PrimaryDownstreamSfid,
    Field::PrimaryDownstreamMaxTrafficRate,
    Field::PrimaryDownstreamMaxTrafficBurst,
    Field::PrimaryDownstreamMinTrafficRate,
    Field::PrimaryUpstreamSfid,
    Field::PrimaryUpstreamMaxTrafficRate,
    Field::PrimaryUpstreamMaxTrafficBurst,
    Field::PrimaryUpstreamMinTrafficRate,
    Field::PrimaryUpstreamMaxConcatenatedBurst,
    Field::PrimaryUpstreamSchedulingType,
];

/// Flat positional array (v1 firmware).
pub fn v1_strategy(shapes: &[VendorShape<'_>]) -> StatusRecord {
    let mut record = StatusRecord::new();
    for shape in shapes {
        if let VendorShape::PositionalArrayV1(items) = shape {
            decode_v1(items, &mut record);
        }
    }
    record
}

fn decode_v1(items: &[Json], record: &mut StatusRecord) {
    // The shorter array revision still carries the channel counts at the
    // tail indices; only the fixed-index main fields need the full length.
    if items.len() >= FULL_ARRAY_LEN {
        decode_main_fields(items, record);
    }
    decode_channel_counts(items, record);
}

fn decode_main_fields(items: &[Json], record: &mut StatusRecord) {
    if let Some(Json::String(s)) = items.get(IDX_PRIMARY_LOCK) {
        if s == "Locked" {
            record.set(Field::PrimaryDownstreamChannel, Value::text("Locked"));
        }
    }

    // Customer id must be an actual integer; numeric strings here have
    // historically been row indexes from a different firmware, so they
    // are not trusted.
    if let Some(Json::Number(n)) = items.get(IDX_CUSTOMER_ID) {
        if let Some(id) = n.as_i64() {
            record.set(Field::IspProvider, Value::Text(provider::from_array_id(id)));
        }
    }

    let verbatim_fields = [
        (IDX_NETWORK_ACCESS, Field::NetworkAccess),
        (IDX_MAX_CPES, Field::MaxCpes),
        (IDX_BASELINE_PRIVACY, Field::BaselinePrivacy),
        (IDX_DOCSIS_MODE, Field::DocsisVersion),
        (IDX_DOCSIS_MODE, Field::DocsisMode),
        (IDX_CONFIG_FILE, Field::ConfigFile),
    ];
    for (index, field) in verbatim_fields {
        if let Some(value) = items.get(index).and_then(verbatim) {
            record.set(field, value);
        }
    }

    for (offset, field) in SERVICE_FLOW_FIELDS.into_iter().enumerate() {
        if let Some(value) = items.get(IDX_SERVICE_FLOW_START + offset).and_then(verbatim) {
            record.set(field, value);
        }
    }
}

fn decode_channel_counts(items: &[Json], record: &mut StatusRecord) {
    let counts = [
        (IDX_US_30_COUNT, Field::Docsis30Upstream),
        (IDX_DS_30_COUNT, Field::Docsis30Downstream),
        (IDX_DS_31_COUNT, Field::Docsis31Downstream),
        (IDX_US_31_COUNT, Field::Docsis31Upstream),
    ];
    for (index, field) in counts {
        if let Some(element) = items.get(index) {
            record.set(field, Value::Count(digit_count(element)));
        }
    }
}

/// Channel counts decode as integers only when the raw element is
/// all-digit; everything else is 0, never an error.
fn digit_count(element: &Json) -> i64 {
    match element {
        Json::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().unwrap_or(0)
        }
        Json::Number(n) => match n.as_i64() {
            Some(v) if v >= 0 => v,
            _ => 0,
        },
        _ => 0,
    }
}

/// Verbatim pass-through for service-flow and config fields. This is the
/// one documented path where vendor text reaches the record untransformed.
fn verbatim(element: &Json) -> Option<Value> {
    match element {
        Json::String(s) => Some(Value::text(s.clone())),
        Json::Number(n) => n.as_i64().map(Value::Count),
        _ => None,
    }
}

/// Nested-array revision (v2 firmware): channel tables arrive as
/// JSON-encoded strings inside the outer array.
pub fn v2_strategy(shapes: &[VendorShape<'_>]) -> StatusRecord {
    let mut record = StatusRecord::new();
    for shape in shapes {
        if let VendorShape::PositionalArrayV2Nested(items) = shape {
            decode_v2(items, &mut record);
        }
    }
    record
}

fn decode_v2(items: &[Json], record: &mut StatusRecord) {
    // Fragile but observed: a "3.1" token anywhere in the array is the
    // only signal for which bucket the channel table belongs to.
    let saw_31_token = items
        .iter()
        .filter_map(Json::as_str)
        .any(|s| s.contains("3.1"));

    for element in items {
        if element.as_str() == Some("Locked") && !record.contains(Field::PrimaryDownstreamChannel)
        {
            record.set(Field::PrimaryDownstreamChannel, Value::text("Locked"));
        }

        if let Some(rows) = shape::parse_nested_table(element) {
            let field = if saw_31_token {
                Field::Docsis31Downstream
            } else {
                Field::Docsis30Downstream
            };
            if !record.contains(field) {
                record.set(field, Value::Count(rows.len() as i64));
            }
        }
    }
}
