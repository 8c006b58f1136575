// Chart generation collaborator: the PDF exporter hands over grouped series
// and gets an image file back. The default implementation draws bar charts
// with plotters; tests substitute a fake renderer.
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::export::ExportError;

pub trait ChartRenderer {
    /// Render a bar chart for the given category labels and values into
    /// `out_path` and return the written path.
    fn render_chart(
        &self,
        labels: &[String],
        values: &[f64],
        title: &str,
        out_path: &Path,
    ) -> Result<PathBuf, ExportError>;
}

/// Bar-chart renderer producing PNG files via plotters.
#[derive(Debug, Clone)]
pub struct PlottersChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for PlottersChartRenderer {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 576,
        }
    }
}

impl PlottersChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChartRenderer for PlottersChartRenderer {
    fn render_chart(
        &self,
        labels: &[String],
        values: &[f64],
        title: &str,
        out_path: &Path,
    ) -> Result<PathBuf, ExportError> {
        if labels.is_empty() || labels.len() != values.len() {
            return Err(ExportError::Chart(format!(
                "mismatched chart series: {} labels, {} values",
                labels.len(),
                values.len()
            )));
        }

        let root = BitMapBackend::new(out_path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let max = values.iter().copied().fold(0.0f64, f64::max);
        let y_max = if max <= 0.0 { 1.0 } else { max * 1.1 };

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(72)
            .build_cartesian_2d(0i32..labels.len() as i32, 0f64..y_max)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&|idx: &i32| {
                labels.get(*idx as usize).cloned().unwrap_or_default()
            })
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(values.iter().enumerate().map(|(i, v)| {
                let x = i as i32;
                Rectangle::new([(x, 0.0), (x + 1, *v)], BLUE.mix(0.5).filled())
            }))
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
        Ok(out_path.to_path_buf())
    }
}

fn chart_err<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Chart(e.to_string())
}
