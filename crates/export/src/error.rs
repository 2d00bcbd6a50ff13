use thiserror::Error;

use shopkeep_core::SinkError;
use shopkeep_pdf::RenderError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export has no columns")]
    NoColumns,
    #[error("spreadsheet cannot hold {0} columns")]
    TooManyColumns(usize),
    #[error("delimited encoding failed: {0}")]
    Delimited(String),
    #[error("spreadsheet encoding failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Pdf(#[from] RenderError),
    #[error(transparent)]
    Save(#[from] SinkError),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Delimited(err.to_string())
    }
}
