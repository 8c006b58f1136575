// PDF report export: truncated data table, summary block and optional chart
// images, rendered through the templating and document collaborators.
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{error, info};

use crate::chart::{ChartRenderer, PlottersChartRenderer};
use crate::export::{
    display_timestamp, file_timestamp, remove_transient, ExportConfig, ExportError,
};
use crate::summary::calculate_summary;
use crate::template::{HtmlReportTemplate, ReportContext, TemplateEngine};
use crate::types::{RoomRecord, VisualizationBuckets};

/// Only the first 100 records go into the document; the full data set stays
/// available through the spreadsheet export.
pub const PDF_ROW_LIMIT: usize = 100;

pub trait DocumentRenderer {
    /// Materialize `html` as a PDF document at `out_path`.
    fn render_document(&self, html: &str, out_path: &Path) -> Result<(), ExportError>;
}

/// Converts HTML to PDF by piping it through the `wkhtmltopdf` binary.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    pub binary: PathBuf,
}

impl Default for WkhtmltopdfRenderer {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("wkhtmltopdf"),
        }
    }
}

impl DocumentRenderer for WkhtmltopdfRenderer {
    fn render_document(&self, html: &str, out_path: &Path) -> Result<(), ExportError> {
        let mut child = Command::new(&self.binary)
            .arg("--quiet")
            // chart images are referenced by local path
            .arg("--enable-local-file-access")
            .arg("-")
            .arg(out_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExportError::Document(format!("failed to start wkhtmltopdf: {e}")))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(html.as_bytes())
                .map_err(|e| ExportError::Document(format!("failed to feed wkhtmltopdf: {e}")))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|e| ExportError::Document(format!("wkhtmltopdf did not finish: {e}")))?;
        if !output.status.success() {
            return Err(ExportError::Document(format!(
                "wkhtmltopdf exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// PDF report exporter with pluggable chart, template and document
/// collaborators. Defaults draw bar charts with plotters, render the built-in
/// HTML template and convert via `wkhtmltopdf`.
pub struct PdfExporter {
    config: ExportConfig,
    chart_renderer: Box<dyn ChartRenderer>,
    template_engine: Box<dyn TemplateEngine>,
    document_renderer: Box<dyn DocumentRenderer>,
}

impl PdfExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            chart_renderer: Box::new(PlottersChartRenderer::new()),
            template_engine: Box::new(HtmlReportTemplate),
            document_renderer: Box::new(WkhtmltopdfRenderer::default()),
        }
    }

    pub fn with_chart_renderer(mut self, renderer: impl ChartRenderer + 'static) -> Self {
        self.chart_renderer = Box::new(renderer);
        self
    }

    pub fn with_template_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.template_engine = Box::new(engine);
        self
    }

    pub fn with_document_renderer(mut self, renderer: impl DocumentRenderer + 'static) -> Self {
        self.document_renderer = Box::new(renderer);
        self
    }

    /// Export a record set as a PDF report. Empty input produces no file and
    /// returns `None`; any failure in chart generation, templating or
    /// document rendering is logged and likewise collapsed to `None`.
    pub fn export(
        &self,
        records: &[RoomRecord],
        standort_name: &str,
        charts_data: Option<&VisualizationBuckets>,
    ) -> Option<PathBuf> {
        if records.is_empty() {
            return None;
        }
        match self.try_export(records, standort_name, charts_data) {
            Ok(path) => {
                info!(standort = standort_name, path = %path.display(), "PDF export written");
                Some(path)
            }
            Err(e) => {
                error!(standort = standort_name, error = %e, "PDF export failed");
                None
            }
        }
    }

    fn try_export(
        &self,
        records: &[RoomRecord],
        standort_name: &str,
        charts_data: Option<&VisualizationBuckets>,
    ) -> Result<PathBuf, ExportError> {
        let timestamp = file_timestamp();
        self.config.ensure_export_dir()?;
        let pdf_path = self.config.artifact_path(standort_name, &timestamp, "pdf")?;

        match self.render_into(records, standort_name, charts_data, &timestamp, &pdf_path) {
            Ok(()) => Ok(pdf_path),
            Err(e) => {
                // The reserved placeholder must not outlive a failed export.
                remove_transient(&pdf_path);
                Err(e)
            }
        }
    }

    fn render_into(
        &self,
        records: &[RoomRecord],
        standort_name: &str,
        charts_data: Option<&VisualizationBuckets>,
        timestamp: &str,
        pdf_path: &Path,
    ) -> Result<(), ExportError> {
        let chart_paths = match charts_data {
            Some(buckets) => self.render_charts(buckets, timestamp)?,
            None => Vec::new(),
        };

        let context = ReportContext {
            title: format!("Raumbuch Auswertung - {standort_name}"),
            generated_at: display_timestamp(),
            rows: records
                .iter()
                .take(PDF_ROW_LIMIT)
                .map(RoomRecord::coerced)
                .collect(),
            summary: calculate_summary(records),
            charts: chart_paths.clone(),
            total_items: records.len(),
        };

        let html = self.template_engine.render("report_pdf", &context)?;
        self.document_renderer.render_document(&html, pdf_path)?;

        // Transient charts are only removed after successful rendering, and
        // only by the invocation that created them.
        for chart in &chart_paths {
            remove_transient(chart);
        }
        Ok(())
    }

    /// One chart per populated bucket dimension, written under the `charts`
    /// subdirectory with a timestamp-qualified name.
    fn render_charts(
        &self,
        buckets: &VisualizationBuckets,
        timestamp: &str,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let charts_dir = self.config.charts_dir();
        std::fs::create_dir_all(&charts_dir)?;

        let dimensions: [(&BTreeMap<String, f64>, &str, &str); 3] = [
            (&buckets.bereich_qm, "bereich_chart", "Quadratmeter nach Bereich"),
            (
                &buckets.rg_wert_monat,
                "rg_chart",
                "Wert pro Monat nach Reinigungsgruppe",
            ),
            (
                &buckets.etage_stunden_monat,
                "etage_chart",
                "Stunden pro Monat nach Etage",
            ),
        ];

        let mut chart_paths = Vec::new();
        for (bucket, stem, title) in dimensions {
            if bucket.is_empty() {
                continue;
            }
            let labels: Vec<String> = bucket.keys().cloned().collect();
            let values: Vec<f64> = bucket.values().copied().collect();
            let out_path = charts_dir.join(format!("{stem}_{timestamp}.png"));
            let written = self
                .chart_renderer
                .render_chart(&labels, &values, title, &out_path)?;
            chart_paths.push(written);
        }
        Ok(chart_paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viz::prepare_visualization;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct FakeChartRenderer;

    impl ChartRenderer for FakeChartRenderer {
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

    #[derive(Clone)]
    struct FakeTemplateEngine {
        seen: Arc<Mutex<Option<ReportContext>>>,
    }

    impl FakeTemplateEngine {
        fn new() -> Self {
            Self {
                seen: Arc::new(Mutex::new(None)),
            }
        }
    }

    impl TemplateEngine for FakeTemplateEngine {
        fn render(&self, _name: &str, context: &ReportContext) -> Result<String, ExportError> {
            *self.seen.lock().unwrap() = Some(context.clone());
            Ok("<html></html>".to_string())
        }
    }

    struct FakeDocumentRenderer;

    impl DocumentRenderer for FakeDocumentRenderer {
        fn render_document(&self, _html: &str, out_path: &Path) -> Result<(), ExportError> {
            std::fs::write(out_path, b"%PDF-1.4")?;
            Ok(())
        }
    }

    struct FailingDocumentRenderer;

    impl DocumentRenderer for FailingDocumentRenderer {
        fn render_document(&self, _html: &str, _out_path: &Path) -> Result<(), ExportError> {
            Err(ExportError::Document("converter unavailable".to_string()))
        }
    }

    fn records(n: usize) -> Vec<RoomRecord> {
        (0..n)
            .map(|i| RoomRecord {
                id: Some(i as i64),
                raumnummer: Some(format!("{i:03}")),
                bereich: Some("Verwaltung".to_string()),
                etage: Some("EG".to_string()),
                rg: Some("RG1".to_string()),
                qm: json!(10.0),
                wert_monat: json!(5.0),
                stunden_monat: json!(2.0),
                ..RoomRecord::default()
            })
            .collect()
    }

    fn exporter(dir: &Path) -> PdfExporter {
        PdfExporter::new(ExportConfig::new(dir))
            .with_chart_renderer(FakeChartRenderer)
            .with_template_engine(FakeTemplateEngine::new())
            .with_document_renderer(FakeDocumentRenderer)
    }

    #[test]
    fn empty_input_produces_no_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(exporter(dir.path()).export(&[], "Hauptsitz", None).is_none());
    }

    #[test]
    fn export_writes_pdf_and_cleans_up_charts() {
        let dir = tempfile::tempdir().unwrap();
        let data = records(3);
        let buckets = prepare_visualization(&data);
        let path = exporter(dir.path())
            .export(&data, "Hauptsitz", Some(&buckets))
            .unwrap();
        assert!(path.is_file());
        assert!(path.to_string_lossy().ends_with(".pdf"));
        // transient chart images were deleted after rendering
        let charts_dir = dir.path().join("charts");
        let leftover = std::fs::read_dir(&charts_dir).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn rows_are_truncated_to_the_document_limit() {
        let dir = tempfile::tempdir().unwrap();
        let template = FakeTemplateEngine::new();
        let exporter = PdfExporter::new(ExportConfig::new(dir.path()))
            .with_chart_renderer(FakeChartRenderer)
            .with_document_renderer(FakeDocumentRenderer)
            .with_template_engine(template.clone());
        let data = records(150);
        exporter.export(&data, "Hauptsitz", None).unwrap();

        let seen = template.seen.lock().unwrap();
        let context = seen.as_ref().unwrap();
        assert_eq!(context.rows.len(), PDF_ROW_LIMIT);
        assert_eq!(context.total_items, 150);
        assert_eq!(context.summary.total_rooms, 150);
        assert_eq!(context.title, "Raumbuch Auswertung - Hauptsitz");
    }

    #[test]
    fn rendering_failure_collapses_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = PdfExporter::new(ExportConfig::new(dir.path()))
            .with_chart_renderer(FakeChartRenderer)
            .with_template_engine(FakeTemplateEngine::new())
            .with_document_renderer(FailingDocumentRenderer);
        assert!(exporter.export(&records(2), "Hauptsitz", None).is_none());

        // The reserved output name is released again, so nothing empty is
        // left lying around in the export directory.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "pdf"))
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
    }
}
