//! Decode of the coded-status object (connection troubleshoot endpoint).
//!
//! The endpoint reports modem state as small numeric codes under `js_*`
//! keys. Every code goes through a bounded mapping; unknown codes render
//! as an explicit "Unknown (n)" rather than leaking raw values.

use serde_json::Value as Json;

use crate::extract::shape::VendorShape;
use crate::models::{Field, StatusRecord, Value};

const KEY_OPER: &str = "js_cm_oper_value";
const KEY_REG: &str = "js_cm_reg_value";
const KEY_WAN_MODE: &str = "js_wan_ip_prov_mode";
const KEY_FAIL_SAFE: &str = "js_fail_safe_mode";
const KEY_NO_RF: &str = "js_NoRF_Detected";

/// Decodes every coded-status object in the payload set.
pub fn strategy(shapes: &[VendorShape<'_>]) -> StatusRecord {
    let mut record = StatusRecord::new();
    for shape in shapes {
        if let VendorShape::CodedStatus(map) = shape {
            decode_into(map, &mut record);
        }
    }
    record
}

fn decode_into(map: &serde_json::Map<String, Json>, record: &mut StatusRecord) {
    if let Some(value) = map.get(KEY_OPER).and_then(decode_operational) {
        record.set(Field::CableModemStatus, value);
    }
    if let Some(value) = map.get(KEY_REG).and_then(decode_registration) {
        record.set(Field::CableModemRegistration, value);
    }
    if let Some(value) = map.get(KEY_WAN_MODE).and_then(decode_wan_mode) {
        record.set(Field::WanIpProvisionMode, value);
    }
    if let Some(raw) = map.get(KEY_FAIL_SAFE) {
        let label = if flag_is_set(raw) { "Active" } else { "Inactive" };
        record.set(Field::FailSafeMode, Value::text(label));
    }
    if let Some(raw) = map.get(KEY_NO_RF) {
        let label = if flag_is_set(raw) { "Yes" } else { "No" };
        record.set(Field::NoRfDetected, Value::text(label));
    }
}

/// Integer code from a JSON number or a numeric string.
fn as_code(raw: &Json) -> Option<i64> {
    match raw {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-numeric codes pass through as their literal string; anything that
/// is neither number nor string is dropped.
fn literal_fallback(raw: &Json) -> Option<Value> {
    match raw {
        Json::String(s) => Some(Value::text(s.clone())),
        _ => None,
    }
}

fn decode_operational(raw: &Json) -> Option<Value> {
    match as_code(raw) {
        Some(code) if code >= 3 => Some(Value::text("Online")),
        Some(_) => Some(Value::text("Offline")),
        None => literal_fallback(raw),
    }
}

fn decode_registration(raw: &Json) -> Option<Value> {
    let code = match as_code(raw) {
        Some(code) => code,
        None => return literal_fallback(raw),
    };
    let label = match code {
        0 => "Unregistered",
        1 => "Other",
        2 => "Registered",
        3 => "Not Registered",
        4 => "Registration Complete",
        5 => "Access Denied",
        6 => "Operational",
        other => return Some(Value::Text(format!("Unknown ({})", other))),
    };
    Some(Value::text(label))
}

fn decode_wan_mode(raw: &Json) -> Option<Value> {
    let code = match as_code(raw) {
        Some(code) => code,
        None => return literal_fallback(raw),
    };
    let label = match code {
        0 => "DHCP",
        1 => "Static",
        2 => "PPPoE",
        other => return Some(Value::Text(format!("Unknown ({})", other))),
    };
    Some(Value::text(label))
}

/// Vendor flags are "1" for set, anything else for clear.
fn flag_is_set(raw: &Json) -> bool {
    match raw {
        Json::String(s) => s == "1",
        Json::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(object: Json) -> StatusRecord {
        let map = object.as_object().unwrap().clone();
        let mut record = StatusRecord::new();
        decode_into(&map, &mut record);
        record
    }

    mod operational_tests {
        use super::*;

        #[test]
        fn test_codes_at_or_above_three_are_online() {
            for code in ["3", "4", "5", "12"] {
                let record = decode(json!({ "js_cm_oper_value": code }));
                assert_eq!(
                    record.get(Field::CableModemStatus),
                    Some(&Value::text("Online")),
                    "code {}",
                    code
                );
            }
        }

        #[test]
        fn test_codes_below_three_are_offline() {
            for code in ["0", "1", "2", "-1"] {
                let record = decode(json!({ "js_cm_oper_value": code }));
                assert_eq!(
                    record.get(Field::CableModemStatus),
                    Some(&Value::text("Offline")),
                    "code {}",
                    code
                );
            }
        }

        #[test]
        fn test_numeric_json_number_also_decodes() {
            let record = decode(json!({ "js_cm_oper_value": 5 }));
            assert_eq!(
                record.get(Field::CableModemStatus),
                Some(&Value::text("Online"))
            );
        }

        #[test]
        fn test_non_numeric_passes_through_literally() {
            let record = decode(json!({ "js_cm_oper_value": "booting" }));
            assert_eq!(
                record.get(Field::CableModemStatus),
                Some(&Value::text("booting"))
            );
        }

        #[test]
        fn test_missing_key_leaves_field_absent() {
            let record = decode(json!({}));
            assert!(!record.contains(Field::CableModemStatus));
        }
    }

    mod registration_tests {
        use super::*;

        #[test]
        fn test_table_is_total_for_zero_through_six() {
            let expected = [
                "Unregistered",
                "Other",
                "Registered",
                "Not Registered",
                "Registration Complete",
                "Access Denied",
                "Operational",
            ];
            for (code, label) in expected.iter().enumerate() {
                let record = decode(json!({ "js_cm_reg_value": code.to_string() }));
                assert_eq!(
                    record.get(Field::CableModemRegistration),
                    Some(&Value::text(*label))
                );
            }
        }

        #[test]
        fn test_unknown_code_renders_placeholder() {
            let record = decode(json!({ "js_cm_reg_value": "42" }));
            assert_eq!(
                record.get(Field::CableModemRegistration),
                Some(&Value::text("Unknown (42)"))
            );
        }

        #[test]
        fn test_negative_code_renders_placeholder() {
            let record = decode(json!({ "js_cm_reg_value": -2 }));
            assert_eq!(
                record.get(Field::CableModemRegistration),
                Some(&Value::text("Unknown (-2)"))
            );
        }
    }

    mod wan_mode_tests {
        use super::*;

        #[test]
        fn test_known_modes() {
            for (code, label) in [("0", "DHCP"), ("1", "Static"), ("2", "PPPoE")] {
                let record = decode(json!({ "js_wan_ip_prov_mode": code }));
                assert_eq!(
                    record.get(Field::WanIpProvisionMode),
                    Some(&Value::text(label))
                );
            }
        }

        #[test]
        fn test_unknown_mode_renders_placeholder() {
            let record = decode(json!({ "js_wan_ip_prov_mode": 7 }));
            assert_eq!(
                record.get(Field::WanIpProvisionMode),
                Some(&Value::text("Unknown (7)"))
            );
        }
    }

    mod flag_tests {
        use super::*;

        #[test]
        fn test_fail_safe_one_is_active() {
            let record = decode(json!({ "js_fail_safe_mode": "1" }));
            assert_eq!(record.get(Field::FailSafeMode), Some(&Value::text("Active")));
        }

        #[test]
        fn test_fail_safe_anything_else_is_inactive() {
            for flag in [json!("0"), json!("yes"), json!(2), json!(null)] {
                let record = decode(json!({ "js_fail_safe_mode": flag }));
                assert_eq!(
                    record.get(Field::FailSafeMode),
                    Some(&Value::text("Inactive"))
                );
            }
        }

        #[test]
        fn test_no_rf_flag_labels() {
            let record = decode(json!({ "js_NoRF_Detected": "1" }));
            assert_eq!(record.get(Field::NoRfDetected), Some(&Value::text("Yes")));
            let record = decode(json!({ "js_NoRF_Detected": "0" }));
            assert_eq!(record.get(Field::NoRfDetected), Some(&Value::text("No")));
        }
    }
}
