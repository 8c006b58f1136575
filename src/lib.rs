//! Aggregation and reporting pipeline for building-cleaning room inventories
//! ("Raumbuch" records).
//!
//! The pipeline is a pure function boundary: a sequence of [`RoomRecord`]s
//! goes in, derived data ([`Summary`], [`VisualizationBuckets`],
//! [`FilterOptions`]) or an artifact path comes out. Malformed numeric data
//! is neutralized by [`util::safe_number`]; data-quality problems never
//! surface as errors, and a failed export is a logged `None`, not a panic.

pub mod chart;
pub mod export;
pub mod filter;
pub mod loader;
pub mod output;
pub mod summary;
pub mod template;
pub mod types;
pub mod util;
pub mod viz;

pub use chart::{ChartRenderer, PlottersChartRenderer};
pub use export::pdf::{DocumentRenderer, PdfExporter, WkhtmltopdfRenderer, PDF_ROW_LIMIT};
pub use export::xlsx::export_to_excel;
pub use export::{ExportConfig, ExportError};
pub use filter::{apply_filters, filter_options, FilterCriteria};
pub use summary::calculate_summary;
pub use template::{HtmlReportTemplate, ReportContext, TemplateEngine};
pub use types::{
    CategoryStats, CoercedRecord, FilterOptions, RoomRecord, Summary, VisualizationBuckets,
};
pub use viz::prepare_visualization;
