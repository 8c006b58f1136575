// Templating collaborator: the PDF exporter supplies a content model, the
// engine returns markup. The built-in implementation renders the report HTML
// directly; tests substitute a fake engine.
use std::path::PathBuf;

use crate::export::ExportError;
use crate::types::{CategoryStats, CoercedRecord, Summary};
use crate::util::format_number;

/// Content model handed to the templating collaborator.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub title: String,
    pub generated_at: String,
    /// Records included in the document, already truncated by the exporter.
    pub rows: Vec<CoercedRecord>,
    pub summary: Summary,
    pub charts: Vec<PathBuf>,
    /// Total record count before truncation.
    pub total_items: usize,
}

pub trait TemplateEngine {
    fn render(&self, template_name: &str, context: &ReportContext) -> Result<String, ExportError>;
}

/// Built-in HTML report template: title, summary block, charts, data table.
#[derive(Debug, Clone, Default)]
pub struct HtmlReportTemplate;

impl TemplateEngine for HtmlReportTemplate {
    fn render(&self, template_name: &str, context: &ReportContext) -> Result<String, ExportError> {
        if template_name != "report_pdf" {
            return Err(ExportError::Template(format!(
                "unknown template: {template_name}"
            )));
        }
        Ok(render_report_html(context))
    }
}

fn render_report_html(ctx: &ReportContext) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<style>\n");
    html.push_str("body { font-family: sans-serif; font-size: 10pt; }\n");
    html.push_str("h1 { font-size: 16pt; }\n");
    html.push_str("table { border-collapse: collapse; width: 100%; }\n");
    html.push_str("th, td { border: 1px solid #999; padding: 3px 6px; }\n");
    html.push_str("th { background-color: #DDDDDD; }\n");
    html.push_str("td.num { text-align: right; }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!("<h1>{}</h1>\n", escape(&ctx.title)));
    html.push_str(&format!(
        "<p>Erstellt am: {}</p>\n",
        escape(&ctx.generated_at)
    ));

    render_summary_block(&mut html, &ctx.summary);

    for chart in &ctx.charts {
        html.push_str(&format!(
            "<div><img src=\"{}\" style=\"max-width: 100%;\"></div>\n",
            escape(&chart.display().to_string())
        ));
    }

    render_data_table(&mut html, ctx);

    html.push_str("</body>\n</html>\n");
    html
}

fn render_summary_block(html: &mut String, summary: &Summary) {
    html.push_str("<h2>Zusammenfassung</h2>\n<table>\n");
    let rows = [
        ("Anzahl Räume", format_number(summary.total_rooms as f64, 0)),
        ("Gesamtfläche (qm)", format_number(summary.total_qm, 2)),
        (
            "Gesamtkosten pro Monat (€)",
            format_number(summary.total_wert_monat, 2),
        ),
        (
            "Gesamtkosten pro Jahr (€)",
            format_number(summary.total_wert_jahr, 2),
        ),
        (
            "Gesamtstunden pro Monat",
            format_number(summary.total_stunden_monat, 2),
        ),
    ];
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td></tr>\n",
            escape(label),
            value
        ));
    }
    html.push_str("</table>\n");

    if !summary.bereich_stats.is_empty() {
        render_breakdown_table(html, "Nach Bereich", "Bereich", &summary.bereich_stats);
    }
    if !summary.rg_stats.is_empty() {
        render_breakdown_table(html, "Nach Reinigungsgruppe", "RG", &summary.rg_stats);
    }
}

fn render_breakdown_table(html: &mut String, heading: &str, key: &str, stats: &[CategoryStats]) {
    html.push_str(&format!("<h3>{}</h3>\n<table>\n", escape(heading)));
    html.push_str(&format!(
        "<tr><th>{key}</th><th>qm</th><th>WertMonat</th><th>WertJahr</th><th>StundenMonat</th></tr>\n"
    ));
    for stat in stats {
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            escape(&stat.category),
            format_number(stat.qm, 2),
            format_number(stat.wert_monat, 2),
            format_number(stat.wert_jahr, 2),
            format_number(stat.stunden_monat, 2),
        ));
    }
    html.push_str("</table>\n");
}

fn render_data_table(html: &mut String, ctx: &ReportContext) {
    html.push_str("<h2>Raumbuchdaten</h2>\n");
    if ctx.rows.len() < ctx.total_items {
        html.push_str(&format!(
            "<p>Anzeige der ersten {} von {} Einträgen.</p>\n",
            ctx.rows.len(),
            ctx.total_items
        ));
    }
    html.push_str("<table>\n<tr><th>Raumnummer</th><th>Bereich</th><th>Gebäudeteil</th><th>Etage</th><th>Bezeichnung</th><th>RG</th><th>qm</th><th>WertMonat</th><th>StundenMonat</th></tr>\n");
    for row in &ctx.rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            escape(row.raumnummer.as_deref().unwrap_or("")),
            escape(row.bereich.as_deref().unwrap_or("")),
            escape(row.gebaeudeteil.as_deref().unwrap_or("")),
            escape(row.etage.as_deref().unwrap_or("")),
            escape(row.bezeichnung.as_deref().unwrap_or("")),
            escape(row.rg.as_deref().unwrap_or("")),
            format_number(row.qm, 2),
            format_number(row.wert_monat, 2),
            format_number(row.stunden_monat, 2),
        ));
    }
    html.push_str("</table>\n");
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
