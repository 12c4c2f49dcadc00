//! HTML fallbacks: status table rows, then free-text line scanning.
//!
//! Older firmware serves the status page as a plain table; some builds
//! drop the table markup entirely and the values only appear as loose
//! text lines under their labels. The table decode runs first and the
//! line scan only when it produced nothing.

use scraper::{Html, Selector};

use crate::extract::shape::VendorShape;
use crate::models::{Field, StatusRecord, Value};

/// Table-based decode for [`VendorShape::HtmlTable`] bodies, with the
/// free-text scan as an in-place fallback for pages whose rows match no
/// known label.
pub fn table_strategy(shapes: &[VendorShape<'_>]) -> StatusRecord {
    let mut record = StatusRecord::new();
    for shape in shapes {
        if let VendorShape::HtmlTable(text) = shape {
            let mut partial = decode_table(text);
            if partial.is_empty() {
                partial = decode_free_text(text);
            }
            record.absorb(partial);
        }
    }
    record
}

/// Free-text decode for bodies that never had table markup.
pub fn free_text_strategy(shapes: &[VendorShape<'_>]) -> StatusRecord {
    let mut record = StatusRecord::new();
    for shape in shapes {
        if let VendorShape::HtmlFreeText(text) = shape {
            record.absorb(decode_free_text(text));
        }
    }
    record
}

fn decode_table(html: &str) -> StatusRecord {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr").expect("Invalid CSS selector");
    let cell_selector = Selector::parse("td, th").expect("Invalid CSS selector");

    let mut record = StatusRecord::new();
    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        if cells.len() < 2 {
            continue;
        }

        let label = cells[0].to_lowercase();
        let value = cells[1].clone();
        if let Some(field) = match_label(&label) {
            if !record.contains(field) {
                record.set(field, cell_value(field, value));
            }
        }
    }
    record
}

fn match_label(label: &str) -> Option<Field> {
    if label.contains("cable modem status") {
        Some(Field::CableModemStatus)
    } else if label.contains("primary downstream channel") {
        Some(Field::PrimaryDownstreamChannel)
    } else if label.contains("docsis 3.0 channels") && label.contains("downstream") {
        Some(Field::Docsis30Downstream)
    } else if label.contains("docsis 3.0 channels") && label.contains("upstream") {
        Some(Field::Docsis30Upstream)
    } else if label.contains("docsis 3.1 channels") && label.contains("downstream") {
        Some(Field::Docsis31Downstream)
    } else if label.contains("docsis 3.1 channels") && label.contains("upstream") {
        Some(Field::Docsis31Upstream)
    } else {
        None
    }
}

/// Channel counts become integers when the cell is all-digit; anything
/// else stays verbatim text as the explicit fallback path.
fn cell_value(field: Field, raw: String) -> Value {
    let is_count_field = matches!(
        field,
        Field::Docsis30Downstream
            | Field::Docsis30Upstream
            | Field::Docsis31Downstream
            | Field::Docsis31Upstream
    );
    if is_count_field && !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(count) = raw.parse() {
            return Value::Count(count);
        }
    }
    Value::Text(raw)
}

fn decode_free_text(html: &str) -> StatusRecord {
    // Strip markup so label and value land on separate text lines the
    // way the page renders them.
    let text = Html::parse_document(html)
        .root_element()
        .text()
        .collect::<String>();
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let mut record = StatusRecord::new();
    for (i, line) in lines.iter().enumerate() {
        if line.contains("Cable Modem Status") {
            if let Some(next) = lines.get(i + 1) {
                if !next.is_empty() && next.contains("Online") {
                    record.set(Field::CableModemStatus, Value::text(*next));
                }
            }
        } else if line.contains("Primary downstream channel") {
            if let Some(next) = lines.get(i + 1) {
                if !next.is_empty() && next.contains("Locked") {
                    record.set(Field::PrimaryDownstreamChannel, Value::text(*next));
                }
            }
        } else if line.contains("DOCSIS 3.0 channels") {
            scan_count_lines(
                &lines,
                i,
                Field::Docsis30Downstream,
                Field::Docsis30Upstream,
                &mut record,
            );
        } else if line.contains("DOCSIS 3.1 channels") {
            scan_count_lines(
                &lines,
                i,
                Field::Docsis31Downstream,
                Field::Docsis31Upstream,
                &mut record,
            );
        }
    }
    record
}

/// Looks for a digit-only value within the next 1-3 lines. The first
/// label occurrence fills the downstream bucket, the second upstream.
fn scan_count_lines(
    lines: &[&str],
    label_index: usize,
    downstream: Field,
    upstream: Field,
    record: &mut StatusRecord,
) {
    for offset in 1..=3 {
        let candidate = match lines.get(label_index + offset) {
            Some(line) => *line,
            None => break,
        };
        if candidate.is_empty() || !candidate.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(count) = candidate.parse() {
            if !record.contains(downstream) {
                record.set(downstream, Value::Count(count));
            } else if !record.contains(upstream) {
                record.set(upstream, Value::Count(count));
            }
        }
        break;
    }
}
