// Entry point and high-level CLI flow.
//
// The binary drives the pipeline interactively:
// - Option [1] loads a Raumbuch CSV export, printing diagnostics.
// - Option [2] shows the summary and breakdowns, and writes summary.json.
// - Option [3] sets or clears the categorical filters.
// - Options [4] and [5] produce the Excel and PDF artifacts.
use std::io::{self, Write};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

use raumbuch_report::export::pdf::PdfExporter;
use raumbuch_report::export::xlsx::export_to_excel;
use raumbuch_report::export::ExportConfig;
use raumbuch_report::filter::{apply_filters, filter_options, FilterCriteria};
use raumbuch_report::loader;
use raumbuch_report::output;
use raumbuch_report::summary::calculate_summary;
use raumbuch_report::types::{
    validate_records, BreakdownDisplayRow, RoomRecord, SummaryDisplayRow,
};
use raumbuch_report::util::format_int;
use raumbuch_report::viz::prepare_visualization;

// In-memory app state so the CSV is loaded once but can be summarized,
// filtered and exported multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        standort: String::new(),
        criteria: FilterCriteria::default(),
    })
});

struct AppState {
    data: Option<Vec<RoomRecord>>,
    standort: String,
    criteria: FilterCriteria,
}

fn prompt(label: &str) -> String {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Handle option [1]: load a Raumbuch CSV export.
fn handle_load() {
    let path = {
        let p = prompt("CSV file [raumbuch.csv]: ");
        if p.is_empty() {
            "raumbuch.csv".to_string()
        } else {
            p
        }
    };
    let standort = {
        let s = prompt("Standort name [Hauptsitz]: ");
        if s.is_empty() {
            "Hauptsitz".to_string()
        } else {
            s
        }
    };

    match loader::load_csv(&path) {
        Ok((data, report)) => {
            println!(
                "Loaded {} of {} rows ({} skipped due to parse errors).",
                format_int(report.loaded_rows as i64),
                format_int(report.total_rows as i64),
                format_int(report.parse_errors as i64)
            );
            let problems = validate_records(&data);
            for problem in &problems {
                println!("Warnung: {problem}");
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(data);
            state.standort = standort;
            state.criteria = FilterCriteria::default();
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn current_records() -> Option<Vec<RoomRecord>> {
    let state = APP_STATE.lock().unwrap();
    let data = state.data.as_ref()?;
    Some(apply_filters(data, &state.criteria))
}

/// Handle option [2]: print the summary tables and write summary.json.
fn handle_summary() {
    let Some(records) = current_records() else {
        println!("Error: No data loaded. Please load a CSV file first (option 1).\n");
        return;
    };

    let summary = calculate_summary(&records);
    println!("Zusammenfassung ({} Räume)\n", format_int(summary.total_rooms as i64));
    output::preview_table_rows(&SummaryDisplayRow::from_summary(&summary), 5);

    if !summary.bereich_stats.is_empty() {
        println!("Nach Bereich\n");
        output::preview_table_rows(&BreakdownDisplayRow::from_stats(&summary.bereich_stats), 20);
    }
    if !summary.rg_stats.is_empty() {
        println!("Nach Reinigungsgruppe\n");
        output::preview_table_rows(&BreakdownDisplayRow::from_stats(&summary.rg_stats), 20);
    }

    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    } else {
        println!("(Summary exported to summary.json)\n");
    }
}

/// Handle option [3]: set or clear the categorical filters.
fn handle_filters() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(records) = data else {
        println!("Error: No data loaded. Please load a CSV file first (option 1).\n");
        return;
    };

    let options = filter_options(&records);
    println!("Bereiche: {}", options.bereiche.join(", "));
    println!("Gebäudeteile: {}", options.gebaeudeteile.join(", "));
    println!("Etagen: {}", options.etagen.join(", "));
    println!("Reinigungsgruppen: {}\n", options.reinigungsgruppen.join(", "));
    println!("Leave a value empty to skip that filter.");

    let bereich = prompt("Bereich: ");
    let gebaeudeteil = prompt("Gebaeudeteil: ");
    let etage = prompt("Etage: ");
    let rg = prompt("RG: ");

    let criteria = FilterCriteria::from_pairs([
        ("bereich", bereich.as_str()),
        ("gebaeudeteil", gebaeudeteil.as_str()),
        ("etage", etage.as_str()),
        ("rg", rg.as_str()),
    ]);
    let filtered = apply_filters(&records, &criteria);
    println!(
        "\nFilter matches {} of {} rows.\n",
        format_int(filtered.len() as i64),
        format_int(records.len() as i64)
    );
    APP_STATE.lock().unwrap().criteria = criteria;
}

/// Handle option [4]: export the (possibly filtered) records to Excel.
fn handle_export_excel() {
    let Some(records) = current_records() else {
        println!("Error: No data loaded. Please load a CSV file first (option 1).\n");
        return;
    };
    let standort = APP_STATE.lock().unwrap().standort.clone();
    let config = ExportConfig::default();
    match export_to_excel(&records, &standort, &config) {
        Some(path) => println!("Excel export written to {}\n", path.display()),
        None => println!("Excel export failed or no data to export.\n"),
    }
}

/// Handle option [5]: export the (possibly filtered) records to PDF with
/// charts.
fn handle_export_pdf() {
    let Some(records) = current_records() else {
        println!("Error: No data loaded. Please load a CSV file first (option 1).\n");
        return;
    };
    let standort = APP_STATE.lock().unwrap().standort.clone();
    let buckets = prepare_visualization(&records);
    let exporter = PdfExporter::new(ExportConfig::default());
    let charts = if buckets.is_empty() { None } else { Some(&buckets) };
    match exporter.export(&records, &standort, charts) {
        Some(path) => println!("PDF export written to {}\n", path.display()),
        None => println!("PDF export failed or no data to export.\n"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    loop {
        println!("Raumbuch Auswertung");
        println!("[1] Load CSV file");
        println!("[2] Show summary");
        println!("[3] Set filters");
        println!("[4] Export Excel");
        println!("[5] Export PDF");
        println!("[0] Exit\n");
        match prompt("Enter choice: ").as_str() {
            "1" => handle_load(),
            "2" => handle_summary(),
            "3" => handle_filters(),
            "4" => handle_export_excel(),
            "5" => handle_export_pdf(),
            "0" | "q" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 0-5.\n");
            }
        }
    }
}
