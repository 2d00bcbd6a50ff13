use std::sync::Arc;

use tracing::info;

use shopkeep_core::{Clock, FileSink, SavedFile, SystemClock};

use crate::delimited::encode_delimited;
use crate::error::ExportError;
use crate::request::ExportRequest;
use crate::spreadsheet::encode_spreadsheet;
use crate::table_pdf::encode_pdf_table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Delimited,
    Spreadsheet,
    PdfTable,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Delimited => "csv",
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::PdfTable => "pdf",
        }
    }
}

/// Encodes export requests and saves them through a sink.
#[derive(Clone)]
pub struct Exporter {
    sink: Arc<dyn FileSink>,
    clock: Arc<dyn Clock>,
}

impl Exporter {
    pub fn new(sink: Arc<dyn FileSink>) -> Self {
        Self::with_clock(sink, Arc::new(SystemClock))
    }

    pub fn with_clock(sink: Arc<dyn FileSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    pub fn export(
        &self,
        format: ExportFormat,
        request: &ExportRequest,
    ) -> Result<SavedFile, ExportError> {
        let now = self.clock.now();
        let bytes = match format {
            ExportFormat::Delimited => encode_delimited(request)?,
            ExportFormat::Spreadsheet => encode_spreadsheet(request)?,
            ExportFormat::PdfTable => encode_pdf_table(request, now)?,
        };
        let file_name = request.file_name(format.extension(), now.date());
        let saved = self.sink.save(&file_name, &bytes)?;
        info!(
            format = format.extension(),
            file = %saved.file_name,
            rows = request.records.len(),
            "export saved"
        );
        Ok(saved)
    }

    pub fn export_delimited(&self, request: &ExportRequest) -> Result<SavedFile, ExportError> {
        self.export(ExportFormat::Delimited, request)
    }

    pub fn export_spreadsheet(&self, request: &ExportRequest) -> Result<SavedFile, ExportError> {
        self.export(ExportFormat::Spreadsheet, request)
    }

    pub fn export_pdf_table(&self, request: &ExportRequest) -> Result<SavedFile, ExportError> {
        self.export(ExportFormat::PdfTable, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ExportColumn;
    use chrono::NaiveDate;
    use serde_json::json;
    use shopkeep_core::{DirectorySink, FixedClock, MemorySink};

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2026, 10, 14)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .unwrap(),
        ))
    }

    fn request() -> ExportRequest {
        ExportRequest::new(
            "orders",
            vec![ExportColumn::new("id", "Order"), ExportColumn::new("total", "Total")],
            vec![json!({"id": "o-1", "total": 120}), json!({"id": "o-2"})],
        )
    }

    #[test]
    fn each_format_saves_one_dated_file() {
        let sink = Arc::new(MemorySink::new());
        let exporter = Exporter::with_clock(sink.clone(), clock());

        exporter.export_delimited(&request()).unwrap();
        exporter.export_spreadsheet(&request()).unwrap();
        exporter.export_pdf_table(&request()).unwrap();

        assert_eq!(
            sink.file_names(),
            vec!["orders_2026-10-14.csv", "orders_2026-10-14.xlsx", "orders_2026-10-14.pdf"]
        );
    }

    #[test]
    fn writes_into_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::with_clock(Arc::new(DirectorySink::new(dir.path())), clock());

        let saved = exporter.export_delimited(&request().without_date_stamp()).unwrap();

        assert_eq!(saved.file_name, "orders.csv");
        let written = std::fs::read_to_string(dir.path().join("orders.csv")).unwrap();
        assert!(written.ends_with("\"o-2\",\"\""));
    }

    #[test]
    fn sink_failures_surface() {
        let exporter = Exporter::with_clock(Arc::new(MemorySink::new()), clock());
        let bad = ExportRequest::new("../escape", request().columns, Vec::new()).without_date_stamp();
        assert!(matches!(exporter.export_delimited(&bad), Err(ExportError::Save(_))));
    }
}
