// Visualization buckets: single-field category sums feeding the three charts.
use crate::types::{RoomRecord, VisualizationBuckets};
use crate::util::safe_number;

/// Build the three chart buckets (Bereich→qm, RG→WertMonat, Etage→StundenMonat)
/// from a record set. Numeric fields are coerced with default 0.0; a record
/// lacking the categorical key is skipped for that bucket only. Empty input
/// yields empty buckets.
pub fn prepare_visualization(records: &[RoomRecord]) -> VisualizationBuckets {
    let mut buckets = VisualizationBuckets::default();
    if records.is_empty() {
        return buckets;
    }

    for record in records {
        if let Some(bereich) = non_empty(&record.bereich) {
            *buckets.bereich_qm.entry(bereich.to_string()).or_insert(0.0) +=
                safe_number(&record.qm, 0.0);
        }
        if let Some(rg) = non_empty(&record.rg) {
            *buckets
                .rg_wert_monat
                .entry(rg.to_string())
                .or_insert(0.0) += safe_number(&record.wert_monat, 0.0);
        }
        if let Some(etage) = non_empty(&record.etage) {
            *buckets
                .etage_stunden_monat
                .entry(etage.to_string())
                .or_insert(0.0) += safe_number(&record.stunden_monat, 0.0);
        }
    }
    buckets
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
