// Spreadsheet export: one workbook with the full record table, a summary
// sheet and optional breakdown sheets.
use std::path::PathBuf;

use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};
use tracing::{error, info};

use crate::export::{file_timestamp, remove_transient, ExportConfig, ExportError};
use crate::summary::calculate_summary;
use crate::types::{CategoryStats, CoercedRecord, RoomRecord, Summary, RECORD_COLUMNS};

const SHEET_DATA: &str = "Raumbuchdaten";
const SHEET_SUMMARY: &str = "Zusammenfassung";
const SHEET_BEREICH: &str = "Nach Bereich";
const SHEET_RG: &str = "Nach Reinigungsgruppe";

// Zero-based indices of the numeric columns within `RECORD_COLUMNS`.
const NUMERIC_COLUMNS: [u16; 10] = [7, 8, 10, 11, 12, 13, 14, 15, 16, 17];

struct SheetFormats {
    header: Format,
    number: Format,
}

impl SheetFormats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_background_color(0xDDDDDD)
                .set_border(FormatBorder::Thin),
            number: Format::new().set_num_format("#,##0.00"),
        }
    }
}

/// Export a record set to an XLSX workbook under the configured export
/// directory. Empty input produces no file and returns `None`; any
/// construction error is logged and likewise collapsed to `None`.
pub fn export_to_excel(
    records: &[RoomRecord],
    standort_name: &str,
    config: &ExportConfig,
) -> Option<PathBuf> {
    if records.is_empty() {
        return None;
    }
    match try_export_to_excel(records, standort_name, config) {
        Ok(path) => {
            info!(standort = standort_name, path = %path.display(), "Excel export written");
            Some(path)
        }
        Err(e) => {
            error!(standort = standort_name, error = %e, "Excel export failed");
            None
        }
    }
}

fn try_export_to_excel(
    records: &[RoomRecord],
    standort_name: &str,
    config: &ExportConfig,
) -> Result<PathBuf, ExportError> {
    let coerced: Vec<CoercedRecord> = records.iter().map(RoomRecord::coerced).collect();
    let summary = calculate_summary(records);
    let formats = SheetFormats::new();

    let mut workbook = Workbook::new();
    write_data_sheet(&mut workbook, &coerced, &formats)?;
    write_summary_sheet(&mut workbook, &summary, &formats)?;
    if !summary.bereich_stats.is_empty() {
        write_breakdown_sheet(
            &mut workbook,
            SHEET_BEREICH,
            "Bereich",
            &summary.bereich_stats,
            &formats,
        )?;
    }
    if !summary.rg_stats.is_empty() {
        write_breakdown_sheet(&mut workbook, SHEET_RG, "RG", &summary.rg_stats, &formats)?;
    }

    // Build the whole workbook in memory first so a failure leaves no
    // partial file behind.
    config.ensure_export_dir()?;
    let path = config.artifact_path(standort_name, &file_timestamp(), "xlsx")?;
    if let Err(e) = workbook.save(&path) {
        remove_transient(&path);
        return Err(e.into());
    }
    Ok(path)
}

fn write_data_sheet(
    workbook: &mut Workbook,
    rows: &[CoercedRecord],
    formats: &SheetFormats,
) -> Result<(), ExportError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_DATA)?;
    write_header_row(sheet, &RECORD_COLUMNS, formats)?;

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        if let Some(id) = row.id {
            sheet.write(r, 0, id as f64)?;
        }
        write_opt(sheet, r, 1, &row.raumnummer)?;
        write_opt(sheet, r, 2, &row.bereich)?;
        write_opt(sheet, r, 3, &row.gebaeudeteil)?;
        write_opt(sheet, r, 4, &row.etage)?;
        write_opt(sheet, r, 5, &row.bezeichnung)?;
        write_opt(sheet, r, 6, &row.rg)?;
        sheet.write_with_format(r, 7, row.qm, &formats.number)?;
        sheet.write_with_format(r, 8, row.anzahl, &formats.number)?;
        write_opt(sheet, r, 9, &row.intervall)?;
        sheet.write_with_format(r, 10, row.rg_jahr, &formats.number)?;
        sheet.write_with_format(r, 11, row.rg_monat, &formats.number)?;
        sheet.write_with_format(r, 12, row.qm_monat, &formats.number)?;
        sheet.write_with_format(r, 13, row.wert_monat, &formats.number)?;
        sheet.write_with_format(r, 14, row.stunden_tag, &formats.number)?;
        sheet.write_with_format(r, 15, row.stunden_monat, &formats.number)?;
        sheet.write_with_format(r, 16, row.wert_jahr, &formats.number)?;
        sheet.write_with_format(r, 17, row.qm_stunde, &formats.number)?;
        write_opt(sheet, r, 18, &row.reinigungstage)?;
        write_opt(sheet, r, 19, &row.bemerkung)?;
        write_opt(sheet, r, 20, &row.reduzierung)?;
    }

    for col in NUMERIC_COLUMNS {
        sheet.set_column_width(col, 14)?;
    }
    Ok(())
}

fn write_summary_sheet(
    workbook: &mut Workbook,
    summary: &Summary,
    formats: &SheetFormats,
) -> Result<(), ExportError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_SUMMARY)?;
    write_header_row(sheet, &["Metrik", "Wert"], formats)?;

    let rows: [(&str, f64); 5] = [
        ("Anzahl Räume", summary.total_rooms as f64),
        ("Gesamtfläche (qm)", summary.total_qm),
        ("Gesamtkosten pro Monat (€)", summary.total_wert_monat),
        ("Gesamtkosten pro Jahr (€)", summary.total_wert_jahr),
        ("Gesamtstunden pro Monat", summary.total_stunden_monat),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write(r, 0, *label)?;
        sheet.write_with_format(r, 1, *value, &formats.number)?;
    }
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 16)?;
    Ok(())
}

fn write_breakdown_sheet(
    workbook: &mut Workbook,
    sheet_name: &str,
    key_header: &str,
    stats: &[CategoryStats],
    formats: &SheetFormats,
) -> Result<(), ExportError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;
    write_header_row(
        sheet,
        &[key_header, "qm", "WertMonat", "WertJahr", "StundenMonat"],
        formats,
    )?;

    for (i, stat) in stats.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write(r, 0, stat.category.as_str())?;
        sheet.write_with_format(r, 1, stat.qm, &formats.number)?;
        sheet.write_with_format(r, 2, stat.wert_monat, &formats.number)?;
        sheet.write_with_format(r, 3, stat.wert_jahr, &formats.number)?;
        sheet.write_with_format(r, 4, stat.stunden_monat, &formats.number)?;
    }
    for col in 1..5u16 {
        sheet.set_column_width(col, 14)?;
    }
    Ok(())
}

fn write_header_row(
    sheet: &mut Worksheet,
    headers: &[&str],
    formats: &SheetFormats,
) -> Result<(), ExportError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_with_format(0, col as u16, *header, &formats.header)?;
    }
    Ok(())
}

fn write_opt(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Option<String>,
) -> Result<(), ExportError> {
    if let Some(v) = value {
        sheet.write(row, col, v.as_str())?;
    }
    Ok(())
}
