// Export artifacts: filename scheme, target directory handling and the
// shared error taxonomy for the spreadsheet and PDF exporters.
pub mod pdf;
pub mod xlsx;

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("chart rendering failed: {0}")]
    Chart(String),
    #[error("template rendering failed: {0}")]
    Template(String),
    #[error("document rendering failed: {0}")]
    Document(String),
}

/// Where exports land and how artifact files are prefixed.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub export_dir: PathBuf,
    pub prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("exports"),
            prefix: "Raumbuch_Auswertung".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            ..Self::default()
        }
    }

    /// Create the export directory if absent. Idempotent, so concurrent
    /// invocations may race on it without harm.
    pub fn ensure_export_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.export_dir)
    }

    /// Reserve the path `{prefix}_{standort}_{timestamp}.{ext}` under the
    /// export directory. The name is claimed atomically (`create_new`), so a
    /// same-second collision gets a numeric suffix and no two invocations
    /// ever hold the same path, even when running concurrently. The caller
    /// owns the reserved (empty) file and overwrites or removes it.
    pub fn artifact_path(
        &self,
        standort_name: &str,
        timestamp: &str,
        ext: &str,
    ) -> std::io::Result<PathBuf> {
        let base = format!("{}_{}_{}", self.prefix, standort_name, timestamp);
        let mut n = 0u32;
        loop {
            let name = if n == 0 {
                format!("{base}.{ext}")
            } else {
                format!("{base}_{n}.{ext}")
            };
            let path = self.export_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(path),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.export_dir.join("charts")
    }
}

/// Timestamp used in artifact filenames, e.g. `20260826_142355`.
pub fn file_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Human-readable generation timestamp shown inside the PDF report.
pub fn display_timestamp() -> String {
    Local::now().format("%d.%m.%Y %H:%M:%S").to_string()
}

pub(crate) fn remove_transient(path: &Path) {
    // Best-effort cleanup; a leftover chart image must not fail the export.
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "could not remove transient chart file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::new(dir.path());
        let first = config
            .artifact_path("Hauptsitz", "20260826_120000", "xlsx")
            .unwrap();
        // the name is already reserved on disk, so a second invocation with
        // the same timestamp must move on to the suffixed variant
        assert!(first.is_file());
        let second = config
            .artifact_path("Hauptsitz", "20260826_120000", "xlsx")
            .unwrap();
        assert_ne!(first, second);
        assert!(second
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_1.xlsx"));
        let third = config
            .artifact_path("Hauptsitz", "20260826_120000", "xlsx")
            .unwrap();
        assert!(third
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_2.xlsx"));
    }

    #[test]
    fn ensure_export_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::new(dir.path().join("exports"));
        config.ensure_export_dir().unwrap();
        config.ensure_export_dir().unwrap();
        assert!(config.export_dir.is_dir());
    }

    #[test]
    fn filename_carries_prefix_location_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::new(dir.path());
        let path = config
            .artifact_path("Werk Nord", "20260101_080000", "pdf")
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "Raumbuch_Auswertung_Werk Nord_20260101_080000.pdf"
        );
    }
}
