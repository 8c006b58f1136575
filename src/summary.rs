// Summary aggregation: scalar totals plus per-Bereich and per-Reinigungsgruppe
// subtotals over a record sequence.
use std::collections::HashMap;

use crate::types::{CategoryStats, CoercedRecord, RoomRecord, Summary};

/// Compute the summary for a record set.
///
/// Numeric fields are coerced (default 0.0) on a working copy; the input is
/// not mutated. The room count is the plain record count regardless of field
/// completeness, and a metric missing from all records simply sums to 0.
/// Empty input yields a zeroed summary with empty breakdowns.
pub fn calculate_summary(records: &[RoomRecord]) -> Summary {
    if records.is_empty() {
        return Summary::default();
    }

    let coerced: Vec<CoercedRecord> = records.iter().map(RoomRecord::coerced).collect();

    let mut summary = Summary {
        total_rooms: coerced.len(),
        ..Summary::default()
    };
    for row in &coerced {
        summary.total_qm += row.qm;
        summary.total_qm_monat += row.qm_monat;
        summary.total_wert_monat += row.wert_monat;
        summary.total_wert_jahr += row.wert_jahr;
        summary.total_stunden_monat += row.stunden_monat;
    }

    summary.bereich_stats = group_stats(&coerced, bereich_key);
    summary.rg_stats = group_stats(&coerced, rg_key);
    summary
}

fn bereich_key(row: &CoercedRecord) -> Option<&str> {
    row.bereich.as_deref()
}

fn rg_key(row: &CoercedRecord) -> Option<&str> {
    row.rg.as_deref()
}

/// Explicit stable-order group-by: accumulators are keyed in a map but emitted
/// in first-occurrence order of the group key. Records without the key are
/// excluded from the breakdown only, never from the scalar totals.
fn group_stats(
    rows: &[CoercedRecord],
    key: fn(&CoercedRecord) -> Option<&str>,
) -> Vec<CategoryStats> {
    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, CategoryStats> = HashMap::new();

    for row in rows {
        let Some(k) = key(row) else { continue };
        let entry = acc.entry(k.to_string()).or_insert_with(|| {
            order.push(k.to_string());
            CategoryStats::new(k)
        });
        entry.qm += row.qm;
        entry.wert_monat += row.wert_monat;
        entry.wert_jahr += row.wert_jahr;
        entry.stunden_monat += row.stunden_monat;
    }

    order.into_iter().filter_map(|k| acc.remove(&k)).collect()
}
