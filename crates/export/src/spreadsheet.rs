//! XLSX workbook with a single sheet.

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use crate::error::ExportError;
use crate::request::{ExportRequest, project_rows};

const DEFAULT_WIDTH: f64 = 15.0;
const MAX_SHEET_NAME: usize = 31;
const RESERVED_SHEET_NAME: &str = "History";

/// Sheet name with forbidden characters removed, at most 31 characters,
/// `Sheet1` when nothing usable is left or the name is reserved by Excel.
pub fn sheet_name(requested: Option<&str>) -> String {
    let cleaned: String = requested
        .unwrap_or_default()
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let cleaned: String = cleaned.chars().take(MAX_SHEET_NAME).collect();
    let cleaned = cleaned.trim_end();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(RESERVED_SHEET_NAME) {
        return "Sheet1".to_string();
    }
    cleaned.to_string()
}

/// Optional title row and blank spacer, bold shaded header, then data rows.
pub fn encode_spreadsheet(request: &ExportRequest) -> Result<Vec<u8>, ExportError> {
    if request.columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    let column_count = request.columns.len();
    let last_column =
        u16::try_from(column_count - 1).map_err(|_| ExportError::TooManyColumns(column_count))?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name(request.sheet_name.as_deref()))?;

    let title_format = Format::new().set_bold().set_font_size(14);
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9D9D9))
        .set_border(FormatBorder::Thin);

    let mut row: u32 = 0;
    if let Some(title) = &request.title {
        sheet.write_string_with_format(row, 0, title, &title_format)?;
        row += 2;
    }

    for (col, column) in (0..=last_column).zip(&request.columns) {
        sheet.set_column_width(col, column.width.unwrap_or(DEFAULT_WIDTH))?;
        sheet.write_string_with_format(row, col, &column.header, &header_format)?;
    }
    row += 1;

    for cells in project_rows(request) {
        for (col, text) in (0..=last_column).zip(&cells) {
            sheet.write_string(row, col, text)?;
        }
        row += 1;
    }

    Ok(workbook.save_to_buffer()?)
}
