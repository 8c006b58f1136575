// Categorical filtering over room records plus derivation of the filter
// option sets shown in the UI.
use std::collections::BTreeSet;

use crate::types::{FilterOptions, RoomRecord};

/// Equality criteria over the four filter dimensions. `None` means the
/// dimension is not constrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub bereich: Option<String>,
    pub gebaeudeteil: Option<String>,
    pub etage: Option<String>,
    pub rg: Option<String>,
}

impl FilterCriteria {
    /// Build criteria from string key/value pairs (e.g. query parameters).
    /// Unrecognized keys such as `standort_id` and empty values are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key {
                "bereich" => criteria.bereich = Some(value.to_string()),
                "gebaeudeteil" => criteria.gebaeudeteil = Some(value.to_string()),
                "etage" => criteria.etage = Some(value.to_string()),
                "rg" => criteria.rg = Some(value.to_string()),
                _ => {}
            }
        }
        criteria
    }

    pub fn is_empty(&self) -> bool {
        self.bereich.is_none()
            && self.gebaeudeteil.is_none()
            && self.etage.is_none()
            && self.rg.is_none()
    }

    fn matches(&self, record: &RoomRecord) -> bool {
        field_matches(&self.bereich, &record.bereich)
            && field_matches(&self.gebaeudeteil, &record.gebaeudeteil)
            && field_matches(&self.etage, &record.etage)
            && field_matches(&self.rg, &record.rg)
    }
}

fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match wanted {
        None => true,
        // a record missing the field never matches a present criterion
        Some(want) => actual.as_deref() == Some(want.as_str()),
    }
}

/// Narrow `records` to those matching every present criterion by exact string
/// equality, preserving the original order. Empty criteria return the input
/// unchanged; applying the same criteria twice yields the same result set.
pub fn apply_filters(records: &[RoomRecord], criteria: &FilterCriteria) -> Vec<RoomRecord> {
    if criteria.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

/// Collect the distinct non-empty values observed per dimension, sorted
/// lexicographically. Values never present in the data never appear.
pub fn filter_options(records: &[RoomRecord]) -> FilterOptions {
    let mut bereiche = BTreeSet::new();
    let mut gebaeudeteile = BTreeSet::new();
    let mut etagen = BTreeSet::new();
    let mut reinigungsgruppen = BTreeSet::new();

    for record in records {
        collect(&mut bereiche, &record.bereich);
        collect(&mut gebaeudeteile, &record.gebaeudeteil);
        collect(&mut etagen, &record.etage);
        collect(&mut reinigungsgruppen, &record.rg);
    }

    FilterOptions {
        bereiche: bereiche.into_iter().collect(),
        gebaeudeteile: gebaeudeteile.into_iter().collect(),
        etagen: etagen.into_iter().collect(),
        reinigungsgruppen: reinigungsgruppen.into_iter().collect(),
    }
}

fn collect(set: &mut BTreeSet<String>, value: &Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            set.insert(v.clone());
        }
    }
}
