use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

use crate::util::{format_number, safe_number};

/// One room of a building-cleaning inventory ("Raumbuch").
///
/// Field names keep the original database column spelling. Categorical and
/// free-text fields are plain optional strings; numeric fields are kept as
/// raw scalar values because upstream data may hold nulls or non-numeric
/// garbage — they are only coerced to `f64` at the pipeline boundary via
/// [`RoomRecord::coerced`]. Unknown columns are preserved in `extra`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RoomRecord {
    #[serde(rename = "ID", default)]
    pub id: Option<i64>,
    #[serde(rename = "Raumnummer", default)]
    pub raumnummer: Option<String>,
    #[serde(rename = "Bereich", default)]
    pub bereich: Option<String>,
    #[serde(rename = "Gebaeudeteil", default)]
    pub gebaeudeteil: Option<String>,
    #[serde(rename = "Etage", default)]
    pub etage: Option<String>,
    #[serde(rename = "Bezeichnung", default)]
    pub bezeichnung: Option<String>,
    #[serde(rename = "RG", default)]
    pub rg: Option<String>,
    #[serde(rename = "qm", default)]
    pub qm: Value,
    #[serde(rename = "Anzahl", default)]
    pub anzahl: Value,
    #[serde(rename = "Intervall", default)]
    pub intervall: Option<String>,
    #[serde(rename = "RgJahr", default)]
    pub rg_jahr: Value,
    #[serde(rename = "RgMonat", default)]
    pub rg_monat: Value,
    #[serde(rename = "qmMonat", default)]
    pub qm_monat: Value,
    #[serde(rename = "WertMonat", default)]
    pub wert_monat: Value,
    #[serde(rename = "StundenTag", default)]
    pub stunden_tag: Value,
    #[serde(rename = "StundenMonat", default)]
    pub stunden_monat: Value,
    #[serde(rename = "WertJahr", default)]
    pub wert_jahr: Value,
    #[serde(rename = "qmStunde", default)]
    pub qm_stunde: Value,
    #[serde(rename = "Reinigungstage", default)]
    pub reinigungstage: Option<String>,
    #[serde(rename = "Bemerkung", default)]
    pub bemerkung: Option<String>,
    #[serde(rename = "Reduzierung", default)]
    pub reduzierung: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Column headers of a record in natural key order, as written by the
/// spreadsheet exporter.
pub const RECORD_COLUMNS: [&str; 21] = [
    "ID",
    "Raumnummer",
    "Bereich",
    "Gebaeudeteil",
    "Etage",
    "Bezeichnung",
    "RG",
    "qm",
    "Anzahl",
    "Intervall",
    "RgJahr",
    "RgMonat",
    "qmMonat",
    "WertMonat",
    "StundenTag",
    "StundenMonat",
    "WertJahr",
    "qmStunde",
    "Reinigungstage",
    "Bemerkung",
    "Reduzierung",
];

impl RoomRecord {
    /// Produce a working copy with every numeric field coerced to `f64`
    /// (default 0.0). The record itself is never mutated.
    pub fn coerced(&self) -> CoercedRecord {
        CoercedRecord {
            id: self.id,
            raumnummer: self.raumnummer.clone(),
            bereich: self.bereich.clone(),
            gebaeudeteil: self.gebaeudeteil.clone(),
            etage: self.etage.clone(),
            bezeichnung: self.bezeichnung.clone(),
            rg: self.rg.clone(),
            qm: safe_number(&self.qm, 0.0),
            anzahl: safe_number(&self.anzahl, 0.0),
            intervall: self.intervall.clone(),
            rg_jahr: safe_number(&self.rg_jahr, 0.0),
            rg_monat: safe_number(&self.rg_monat, 0.0),
            qm_monat: safe_number(&self.qm_monat, 0.0),
            wert_monat: safe_number(&self.wert_monat, 0.0),
            stunden_tag: safe_number(&self.stunden_tag, 0.0),
            stunden_monat: safe_number(&self.stunden_monat, 0.0),
            wert_jahr: safe_number(&self.wert_jahr, 0.0),
            qm_stunde: safe_number(&self.qm_stunde, 0.0),
            reinigungstage: self.reinigungstage.clone(),
            bemerkung: self.bemerkung.clone(),
            reduzierung: self.reduzierung.clone(),
        }
    }
}

/// A room record after numeric coercion; all number fields are clean `f64`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoercedRecord {
    pub id: Option<i64>,
    pub raumnummer: Option<String>,
    pub bereich: Option<String>,
    pub gebaeudeteil: Option<String>,
    pub etage: Option<String>,
    pub bezeichnung: Option<String>,
    pub rg: Option<String>,
    pub qm: f64,
    pub anzahl: f64,
    pub intervall: Option<String>,
    pub rg_jahr: f64,
    pub rg_monat: f64,
    pub qm_monat: f64,
    pub wert_monat: f64,
    pub stunden_tag: f64,
    pub stunden_monat: f64,
    pub wert_jahr: f64,
    pub qm_stunde: f64,
    pub reinigungstage: Option<String>,
    pub bemerkung: Option<String>,
    pub reduzierung: Option<String>,
}

/// Per-category subtotal within a [`Summary`] breakdown.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CategoryStats {
    pub category: String,
    pub qm: f64,
    pub wert_monat: f64,
    pub wert_jahr: f64,
    pub stunden_monat: f64,
}

impl CategoryStats {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Self::default()
        }
    }
}

/// Scalar totals plus per-Bereich and per-Reinigungsgruppe breakdowns over a
/// record set. Computed fresh on every request, never persisted.
///
/// The breakdown vectors keep the first-occurrence order of the group key in
/// the input sequence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub total_rooms: usize,
    pub total_qm: f64,
    pub total_qm_monat: f64,
    pub total_wert_monat: f64,
    pub total_wert_jahr: f64,
    pub total_stunden_monat: f64,
    pub bereich_stats: Vec<CategoryStats>,
    pub rg_stats: Vec<CategoryStats>,
}

/// Three independent category→sum mappings feeding the charts:
/// Bereich→qm, Reinigungsgruppe→WertMonat, Etage→StundenMonat.
///
/// `BTreeMap` keys give the charts a deterministic label order. A record
/// lacking the categorical key is simply absent from that mapping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VisualizationBuckets {
    pub bereich_qm: BTreeMap<String, f64>,
    pub rg_wert_monat: BTreeMap<String, f64>,
    pub etage_stunden_monat: BTreeMap<String, f64>,
}

impl VisualizationBuckets {
    pub fn is_empty(&self) -> bool {
        self.bereich_qm.is_empty()
            && self.rg_wert_monat.is_empty()
            && self.etage_stunden_monat.is_empty()
    }
}

/// Distinct sorted option sets per filter dimension, derived from the values
/// actually present in the current record sequence.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FilterOptions {
    pub bereiche: Vec<String>,
    pub gebaeudeteile: Vec<String>,
    pub etagen: Vec<String>,
    pub reinigungsgruppen: Vec<String>,
}

/// Validate a record set, returning one human-readable message per problem.
/// An empty vector means the data passed.
pub fn validate_records(records: &[RoomRecord]) -> Vec<String> {
    let mut errors = Vec::new();
    for (i, record) in records.iter().enumerate() {
        if safe_number(&record.qm, 0.0) < 0.0 {
            errors.push(format!("Eintrag {}: qm darf nicht negativ sein", i + 1));
        }
    }
    errors
}

// Console display rows rendered with `tabled`.

#[derive(Debug, Tabled, Clone)]
pub struct SummaryDisplayRow {
    #[tabled(rename = "Metrik")]
    pub metrik: String,
    #[tabled(rename = "Wert")]
    pub wert: String,
}

impl SummaryDisplayRow {
    pub fn from_summary(summary: &Summary) -> Vec<Self> {
        vec![
            Self {
                metrik: "Anzahl Räume".to_string(),
                wert: crate::util::format_int(summary.total_rooms as i64),
            },
            Self {
                metrik: "Gesamtfläche (qm)".to_string(),
                wert: format_number(summary.total_qm, 2),
            },
            Self {
                metrik: "Gesamtkosten pro Monat (€)".to_string(),
                wert: format_number(summary.total_wert_monat, 2),
            },
            Self {
                metrik: "Gesamtkosten pro Jahr (€)".to_string(),
                wert: format_number(summary.total_wert_jahr, 2),
            },
            Self {
                metrik: "Gesamtstunden pro Monat".to_string(),
                wert: format_number(summary.total_stunden_monat, 2),
            },
        ]
    }
}

#[derive(Debug, Tabled, Clone)]
pub struct BreakdownDisplayRow {
    #[tabled(rename = "Kategorie")]
    pub kategorie: String,
    #[tabled(rename = "qm")]
    pub qm: String,
    #[tabled(rename = "WertMonat")]
    pub wert_monat: String,
    #[tabled(rename = "WertJahr")]
    pub wert_jahr: String,
    #[tabled(rename = "StundenMonat")]
    pub stunden_monat: String,
}

impl BreakdownDisplayRow {
    pub fn from_stats(stats: &[CategoryStats]) -> Vec<Self> {
        stats
            .iter()
            .map(|s| Self {
                kategorie: s.category.clone(),
                qm: format_number(s.qm, 2),
                wert_monat: format_number(s.wert_monat, 2),
                wert_jahr: format_number(s.wert_jahr, 2),
                stunden_monat: format_number(s.stunden_monat, 2),
            })
            .collect()
    }
}
