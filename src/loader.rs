// Data-source adapter: reads room records from a CSV export with the
// original column headers, or from a JSON array of flat mappings.
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;
use serde_json::Value;

use crate::types::RoomRecord;
use crate::util::parse_i64_safe;

/// Raw CSV row; every column is optional text. Parsing into typed values
/// happens afterwards so one bad cell never loses the whole row.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "ID")]
    id: Option<String>,
    #[serde(rename = "Raumnummer")]
    raumnummer: Option<String>,
    #[serde(rename = "Bereich")]
    bereich: Option<String>,
    #[serde(rename = "Gebaeudeteil")]
    gebaeudeteil: Option<String>,
    #[serde(rename = "Etage")]
    etage: Option<String>,
    #[serde(rename = "Bezeichnung")]
    bezeichnung: Option<String>,
    #[serde(rename = "RG")]
    rg: Option<String>,
    #[serde(rename = "qm")]
    qm: Option<String>,
    #[serde(rename = "Anzahl")]
    anzahl: Option<String>,
    #[serde(rename = "Intervall")]
    intervall: Option<String>,
    #[serde(rename = "RgJahr")]
    rg_jahr: Option<String>,
    #[serde(rename = "RgMonat")]
    rg_monat: Option<String>,
    #[serde(rename = "qmMonat")]
    qm_monat: Option<String>,
    #[serde(rename = "WertMonat")]
    wert_monat: Option<String>,
    #[serde(rename = "StundenTag")]
    stunden_tag: Option<String>,
    #[serde(rename = "StundenMonat")]
    stunden_monat: Option<String>,
    #[serde(rename = "WertJahr")]
    wert_jahr: Option<String>,
    #[serde(rename = "qmStunde")]
    qm_stunde: Option<String>,
    #[serde(rename = "Reinigungstage")]
    reinigungstage: Option<String>,
    #[serde(rename = "Bemerkung")]
    bemerkung: Option<String>,
    #[serde(rename = "Reduzierung")]
    reduzierung: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Load room records from a CSV file. Rows that fail CSV deserialization are
/// counted and skipped; cell-level garbage survives into the record and is
/// neutralized later by numeric coercion.
pub fn load_csv(path: impl AsRef<Path>) -> Result<(Vec<RoomRecord>, LoadReport), csv::Error> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<RoomRecord> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };
        records.push(record_from_raw(row));
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
    };
    Ok((records, report))
}

/// Load room records from a JSON array of flat key→value mappings.
pub fn records_from_json(json: &str) -> serde_json::Result<Vec<RoomRecord>> {
    serde_json::from_str(json)
}

fn record_from_raw(row: RawRow) -> RoomRecord {
    RoomRecord {
        id: parse_i64_safe(row.id.as_deref()),
        raumnummer: text(row.raumnummer),
        bereich: text(row.bereich),
        gebaeudeteil: text(row.gebaeudeteil),
        etage: text(row.etage),
        bezeichnung: text(row.bezeichnung),
        rg: text(row.rg),
        qm: scalar(row.qm),
        anzahl: scalar(row.anzahl),
        intervall: text(row.intervall),
        rg_jahr: scalar(row.rg_jahr),
        rg_monat: scalar(row.rg_monat),
        qm_monat: scalar(row.qm_monat),
        wert_monat: scalar(row.wert_monat),
        stunden_tag: scalar(row.stunden_tag),
        stunden_monat: scalar(row.stunden_monat),
        wert_jahr: scalar(row.wert_jahr),
        qm_stunde: scalar(row.qm_stunde),
        reinigungstage: text(row.reinigungstage),
        bemerkung: text(row.bemerkung),
        reduzierung: text(row.reduzierung),
        ..RoomRecord::default()
    }
}

fn text(value: Option<String>) -> Option<String> {
    let v = value?.trim().to_string();
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

fn scalar(value: Option<String>) -> Value {
    // Empty cells become null; everything else stays a raw string for the
    // coercion layer to interpret.
    match value {
        Some(v) if !v.trim().is_empty() => Value::String(v.trim().to_string()),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::calculate_summary;
    use std::io::Write;

    const CSV: &str = "\
ID,Raumnummer,Bereich,Gebaeudeteil,Etage,Bezeichnung,RG,qm,Anzahl,Intervall,RgJahr,RgMonat,qmMonat,WertMonat,StundenTag,StundenMonat,WertJahr,qmStunde,Reinigungstage,Bemerkung,Reduzierung
1,001,Verwaltung,Nord,EG,Büro,RG1,20.5,1,täglich,250,20.8,426.4,120.50,0.5,10.4,1446.00,41.0,Mo-Fr,,
2,002,Produktion,Nord,EG,Halle,RG2,kaputt,1,wöchentlich,52,4.3,,80.00,,,960.00,,,Hinweis,
";

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_rows_and_reports_counts() {
        let file = write_csv(CSV);
        let (records, report) = load_csv(file.path()).unwrap();
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.parse_errors, 0);
        assert_eq!(records[0].id, Some(1));
        assert_eq!(records[0].bereich.as_deref(), Some("Verwaltung"));
    }

    #[test]
    fn garbage_cells_survive_into_coercion() {
        let file = write_csv(CSV);
        let (records, _) = load_csv(file.path()).unwrap();
        let summary = calculate_summary(&records);
        // row 2 has qm = "kaputt", coerced to 0
        assert!((summary.total_qm - 20.5).abs() < 1e-9);
        assert!((summary.total_wert_monat - 200.5).abs() < 1e-9);
    }

    #[test]
    fn empty_cells_become_null() {
        let file = write_csv(CSV);
        let (records, _) = load_csv(file.path()).unwrap();
        assert_eq!(records[1].qm_monat, Value::Null);
        assert_eq!(records[1].bemerkung.as_deref(), Some("Hinweis"));
    }

    #[test]
    fn json_arrays_deserialize_directly() {
        let json = r#"[
            {"ID": 1, "Bereich": "Verwaltung", "qm": 20.5},
            {"ID": 2, "Bereich": "Produktion", "qm": "15.3", "WertMonat": null}
        ]"#;
        let records = records_from_json(json).unwrap();
        assert_eq!(records.len(), 2);
        let summary = calculate_summary(&records);
        assert!((summary.total_qm - 35.8).abs() < 1e-9);
    }
}
