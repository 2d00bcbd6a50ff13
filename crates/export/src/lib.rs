//! Tabular export: records plus a column list, encoded as delimited text,
//! a spreadsheet or a paginated PDF table, then saved through a `FileSink`.
//!
//! All three encodings share one row projection, so column and record order
//! are identical across formats.

pub mod delimited;
pub mod error;
pub mod exporter;
pub mod request;
pub mod spreadsheet;
pub mod table_pdf;

pub use delimited::encode_delimited;
pub use error::ExportError;
pub use exporter::{ExportFormat, Exporter};
pub use request::{ExportColumn, ExportRequest, ValueFormatter, cell_text, project_rows};
pub use spreadsheet::{encode_spreadsheet, sheet_name};
pub use table_pdf::{TableLayout, encode_pdf_table, layout_table};
