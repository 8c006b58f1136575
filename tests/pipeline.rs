// End-to-end pipeline: filter → summarize → bucket → export, with fake
// chart/template/document collaborators writing into a temp directory.
use std::path::{Path, PathBuf};

use serde_json::json;

use raumbuch_report::{
    apply_filters, calculate_summary, export_to_excel, filter_options, prepare_visualization,
    ChartRenderer, DocumentRenderer, ExportConfig, ExportError, FilterCriteria, PdfExporter,
    ReportContext, RoomRecord, TemplateEngine,
};

struct StubChartRenderer;

impl ChartRenderer for StubChartRenderer {
    fn render_chart(
        &self,
        _labels: &[String],
        _values: &[f64],
        _title: &str,
        out_path: &Path,
    ) -> Result<PathBuf, ExportError> {
        std::fs::write(out_path, b"png")?;
        Ok(out_path.to_path_buf())
    }
}

struct StubTemplateEngine;

impl TemplateEngine for StubTemplateEngine {
    fn render(&self, _name: &str, context: &ReportContext) -> Result<String, ExportError> {
        Ok(format!("<html><body>{}</body></html>", context.title))
    }
}

struct StubDocumentRenderer;

impl DocumentRenderer for StubDocumentRenderer {
    fn render_document(&self, html: &str, out_path: &Path) -> Result<(), ExportError> {
        std::fs::write(out_path, html.as_bytes())?;
        Ok(())
    }
}

fn sample_records() -> Vec<RoomRecord> {
    vec![
        RoomRecord {
            id: Some(1),
            raumnummer: Some("001".to_string()),
            bereich: Some("Verwaltung".to_string()),
            gebaeudeteil: Some("Nord".to_string()),
            etage: Some("EG".to_string()),
            rg: Some("RG1".to_string()),
            qm: json!(20.5),
            wert_monat: json!(120.0),
            wert_jahr: json!(1440.0),
            stunden_monat: json!(10.0),
            ..RoomRecord::default()
        },
        RoomRecord {
            id: Some(2),
            raumnummer: Some("002".to_string()),
            bereich: Some("Produktion".to_string()),
            gebaeudeteil: Some("Süd".to_string()),
            etage: Some("EG".to_string()),
            rg: Some("RG2".to_string()),
            qm: json!("15.3"),
            wert_monat: json!(80.0),
            wert_jahr: json!(960.0),
            stunden_monat: json!(6.0),
            ..RoomRecord::default()
        },
        RoomRecord {
            id: Some(3),
            raumnummer: Some("003".to_string()),
            bereich: Some("Verwaltung".to_string()),
            etage: Some("OG".to_string()),
            rg: Some("RG1".to_string()),
            qm: serde_json::Value::Null,
            wert_monat: json!("garbage"),
            stunden_monat: json!(4.0),
            ..RoomRecord::default()
        },
    ]
}

#[test]
fn filtered_records_flow_through_summary_and_buckets() {
    let records = sample_records();
    let criteria = FilterCriteria::from_pairs([("bereich", "Verwaltung")]);
    let filtered = apply_filters(&records, &criteria);
    assert_eq!(filtered.len(), 2);

    let summary = calculate_summary(&filtered);
    assert_eq!(summary.total_rooms, 2);
    assert!((summary.total_qm - 20.5).abs() < 1e-9);
    assert!((summary.total_wert_monat - 120.0).abs() < 1e-9);
    assert_eq!(summary.bereich_stats.len(), 1);

    let buckets = prepare_visualization(&filtered);
    assert_eq!(buckets.bereich_qm.get("Verwaltung"), Some(&20.5));
    assert_eq!(buckets.etage_stunden_monat.len(), 2);

    let options = filter_options(&filtered);
    assert_eq!(options.bereiche, vec!["Verwaltung".to_string()]);
}

#[test]
fn both_exporters_produce_artifacts_from_the_same_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::new(dir.path());
    let records = sample_records();

    let xlsx_path = export_to_excel(&records, "Hauptsitz", &config).unwrap();
    assert!(xlsx_path.is_file());

    let buckets = prepare_visualization(&records);
    let pdf_path = PdfExporter::new(config)
        .with_chart_renderer(StubChartRenderer)
        .with_template_engine(StubTemplateEngine)
        .with_document_renderer(StubDocumentRenderer)
        .export(&records, "Hauptsitz", Some(&buckets))
        .unwrap();
    assert!(pdf_path.is_file());
    let body = std::fs::read_to_string(&pdf_path).unwrap();
    assert!(body.contains("Raumbuch Auswertung - Hauptsitz"));
}

#[test]
fn excel_sheets_carry_one_row_per_record() {
    use calamine::{open_workbook, Data, Reader, Xlsx};

    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::new(dir.path());
    let records = sample_records();

    let path = export_to_excel(&records, "Hauptsitz", &config).unwrap();
    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();

    // Data sheet: header row plus one row per input record.
    let data = workbook.worksheet_range("Raumbuchdaten").unwrap();
    assert_eq!(data.height(), records.len() + 1);

    // Summary sheet: the room count matches the exported record count.
    let summary = workbook.worksheet_range("Zusammenfassung").unwrap();
    let anzahl = summary
        .rows()
        .find(|row| row.first() == Some(&Data::String("Anzahl Räume".to_string())))
        .expect("summary sheet lists the room count");
    assert_eq!(anzahl.get(1), Some(&Data::Float(records.len() as f64)));
}

#[test]
fn concurrent_style_exports_never_share_a_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::new(dir.path());
    let records = sample_records();

    // Two back-to-back exports land in the same second often enough to
    // exercise the collision suffix.
    let first = export_to_excel(&records, "Hauptsitz", &config).unwrap();
    let second = export_to_excel(&records, "Hauptsitz", &config).unwrap();
    assert_ne!(first, second);
    assert!(first.is_file());
    assert!(second.is_file());
}

#[test]
fn empty_record_sets_export_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::new(dir.path());
    assert!(export_to_excel(&[], "Hauptsitz", &config).is_none());

    let exporter = PdfExporter::new(ExportConfig::new(dir.path()))
        .with_chart_renderer(StubChartRenderer)
        .with_template_engine(StubTemplateEngine)
        .with_document_renderer(StubDocumentRenderer);
    assert!(exporter.export(&[], "Hauptsitz", None).is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
