//! Extraction pipeline: raw payloads in, one normalized record out.
//!
//! Strategies are ordered from most to least reliable source and each
//! returns a partial record. The chain is a pure left fold with
//! first-writer-wins merge semantics; a later strategy can only fill
//! keys the earlier ones left absent. Nothing here performs I/O and
//! nothing here fails: unrecognizable input simply contributes no
//! fields.

mod coded;
mod html;
mod positional;
pub mod provider;
pub mod shape;

use chrono::Utc;
use tracing::debug;

use crate::fetcher::RawPayload;
use crate::models::{Field, StatusRecord, Value};
use shape::VendorShape;

type Strategy = fn(&[VendorShape<'_>]) -> StatusRecord;

/// Priority order. Coded endpoint state beats the positional array,
/// which beats anything scraped out of HTML.
const STRATEGIES: [Strategy; 6] = [
    coded::strategy,
    positional::v1_strategy,
    positional::v2_strategy,
    html::table_strategy,
    html::free_text_strategy,
    provider::strategy,
];

/// Builds the cycle's [`StatusRecord`] from whatever payloads the fetcher
/// obtained. Always sets `last_update_time`; everything else depends on
/// what the router answered with.
pub fn extract(payloads: &[RawPayload]) -> StatusRecord {
    let shapes: Vec<VendorShape<'_>> = payloads
        .iter()
        .filter_map(RawPayload::body)
        .filter_map(shape::classify)
        .collect();
    debug!("classified {} usable payload shapes", shapes.len());

    let mut record = STRATEGIES.iter().fold(StatusRecord::new(), |mut acc, s| {
        acc.absorb(s(&shapes));
        acc
    });

    record.set(Field::LastUpdateTime, Value::Timestamp(Utc::now()));
    record.finalize_totals();
    debug!("extracted record with {} fields", record.len());
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{EndpointId, RawBody};
    use serde_json::json;

    fn payload(endpoint: EndpointId, body: RawBody) -> RawPayload {
        RawPayload {
            endpoint,
            status: Some(200),
            outcome: Ok(body),
        }
    }

    #[test]
    fn test_empty_payloads_still_stamp_timestamp() {
        let record = extract(&[]);
        assert_eq!(record.len(), 1);
        assert!(record.contains(Field::LastUpdateTime));
    }

    #[test]
    fn test_coded_status_only() {
        let payloads = [payload(
            EndpointId::ConnectionTroubleshoot,
            RawBody::Json(json!({ "js_cm_oper_value": "5" })),
        )];
        let record = extract(&payloads);
        assert_eq!(
            record.get(Field::CableModemStatus),
            Some(&Value::text("Online"))
        );
        // Exactly the decoded status plus the timestamp, no channel data.
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_coded_status_beats_html_fallback() {
        let html = "<table><tr><td>Cable Modem Status</td><td>Offline-ish</td></tr></table>";
        let payloads = [
            payload(
                EndpointId::ConnectionTroubleshoot,
                RawBody::Json(json!({ "js_cm_oper_value": "5" })),
            ),
            payload(EndpointId::RootPage, RawBody::Html(html.into())),
        ];
        let record = extract(&payloads);
        assert_eq!(
            record.get(Field::CableModemStatus),
            Some(&Value::text("Online"))
        );
    }

    #[test]
    fn test_positional_array_end_to_end() {
        let mut items = vec![json!(""); 30];
        items[4] = json!(8);
        items[25] = json!("4");
        items[26] = json!("24");
        items[27] = json!("2");
        items[28] = json!("4");
        let payloads = [payload(EndpointId::NetworkStatus, RawBody::Json(json!(items)))];

        let record = extract(&payloads);
        assert_eq!(
            record.get(Field::IspProvider),
            Some(&Value::text("Virgin Media"))
        );
        assert_eq!(record.get(Field::Docsis30Upstream), Some(&Value::Count(4)));
        assert_eq!(
            record.get(Field::Docsis30Downstream),
            Some(&Value::Count(24))
        );
        assert_eq!(record.get(Field::Docsis31Downstream), Some(&Value::Count(2)));
        assert_eq!(record.get(Field::Docsis31Upstream), Some(&Value::Count(4)));
        assert_eq!(
            record.get(Field::TotalDownstreamChannels),
            Some(&Value::Count(26))
        );
        assert_eq!(
            record.get(Field::TotalUpstreamChannels),
            Some(&Value::Count(8))
        );
    }

    #[test]
    fn test_array_customer_id_beats_script_literal() {
        let mut items = vec![json!(""); 30];
        items[4] = json!(20);
        let payloads = [
            payload(EndpointId::NetworkStatus, RawBody::Json(json!(items))),
            payload(
                EndpointId::RootPage,
                RawBody::Html("<script>customerId = 8;</script>".into()),
            ),
        ];
        let record = extract(&payloads);
        assert_eq!(record.get(Field::IspProvider), Some(&Value::text("Ziggo")));
    }

    #[test]
    fn test_totals_recomputed_from_mixed_sources() {
        // Counts split across the nested array (3.1 downstream) and a
        // free-text page: totals only appear when both inputs merged in.
        let payloads = [
            payload(
                EndpointId::NetworkStatus,
                RawBody::Json(json!(["DOCSIS 3.1", "[[1],[2]]"])),
            ),
            payload(
                EndpointId::RootPage,
                RawBody::Html(
                    "DOCSIS 3.0 channels\n24\nDOCSIS 3.0 channels\n4\n\
                     DOCSIS 3.1 channels\n9\nDOCSIS 3.1 channels\n1"
                        .into(),
                ),
            ),
        ];
        let record = extract(&payloads);
        // Nested decode got there first for 3.1 downstream.
        assert_eq!(record.get(Field::Docsis31Downstream), Some(&Value::Count(2)));
        assert_eq!(
            record.get(Field::TotalDownstreamChannels),
            Some(&Value::Count(26))
        );
        assert_eq!(
            record.get(Field::TotalUpstreamChannels),
            Some(&Value::Count(5))
        );
    }
}
