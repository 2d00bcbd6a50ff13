//! Paginated grid table rendered to PDF.

use chrono::NaiveDateTime;

use shopkeep_pdf::{A4, Canvas, Rgb, TextStyle, line_height, render_pdf, wrap_text};

use crate::error::ExportError;
use crate::request::{ExportRequest, project_rows};

const MARGIN: f32 = 14.0;
const TITLE_Y: f32 = 15.0;
const STAMP_Y: f32 = 22.0;
const TABLE_Y: f32 = 28.0;
const FONT: f32 = 8.0;
const CELL_PAD: f32 = 1.5;
const DEFAULT_WEIGHT: f32 = 15.0;

const ACCENT: Rgb = Rgb(41, 128, 185);
const STRIPE: Rgb = Rgb(245, 245, 245);
const GRID: Rgb = Rgb(200, 200, 200);

/// A laid-out table plus the page each body row landed on.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub canvas: Canvas,
    pub row_pages: Vec<usize>,
}

fn column_widths(request: &ExportRequest) -> Vec<f32> {
    let weights: Vec<f32> = request
        .columns
        .iter()
        .map(|c| c.width.map(|w| w as f32).filter(|w| *w > 0.0).unwrap_or(DEFAULT_WEIGHT))
        .collect();
    let total: f32 = weights.iter().sum();
    let available = A4.width - 2.0 * MARGIN;
    weights.iter().map(|w| w / total * available).collect()
}

fn wrap_cells(cells: &[String], widths: &[f32], bold: bool) -> Vec<Vec<String>> {
    cells
        .iter()
        .zip(widths)
        .map(|(text, width)| wrap_text(text, width - 2.0 * CELL_PAD, FONT, bold))
        .collect()
}

fn row_height(wrapped: &[Vec<String>]) -> f32 {
    let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1) as f32;
    lines * line_height(FONT) + 2.0 * CELL_PAD
}

fn draw_row(
    canvas: &mut Canvas,
    wrapped: &[Vec<String>],
    widths: &[f32],
    y: f32,
    height: f32,
    fill: Option<Rgb>,
    style: TextStyle,
) {
    let mut x = MARGIN;
    for (lines, width) in wrapped.iter().zip(widths) {
        canvas.rect(x, y, *width, height, fill, Some(GRID));
        let mut baseline = y + CELL_PAD + FONT * 0.352_778;
        for line in lines {
            canvas.text(x + CELL_PAD, baseline, line.clone(), style);
            baseline += line_height(FONT);
        }
        x += width;
    }
}

/// Title and generated-on stamp at fixed positions, then the grid. The
/// header row repeats at the top of every page.
pub fn layout_table(
    request: &ExportRequest,
    generated_at: NaiveDateTime,
) -> Result<TableLayout, ExportError> {
    if request.columns.is_empty() {
        return Err(ExportError::NoColumns);
    }

    let mut canvas = Canvas::new(A4);
    if let Some(title) = &request.title {
        canvas.text(MARGIN, TITLE_Y, title.clone(), TextStyle::bold(16.0));
    }
    canvas.text(
        MARGIN,
        STAMP_Y,
        format!("Generated on: {}", generated_at.format("%d/%m/%Y %H:%M")),
        TextStyle::regular(9.0).color(Rgb(100, 100, 100)),
    );

    let widths = column_widths(request);
    let headers: Vec<String> = request.columns.iter().map(|c| c.header.clone()).collect();
    let header_cells = wrap_cells(&headers, &widths, true);
    let header_height = row_height(&header_cells);
    let header_style = TextStyle::bold(FONT).color(Rgb::WHITE);
    let body_style = TextStyle::regular(FONT);
    let bottom = A4.height - MARGIN;

    let header = Some(ACCENT);
    draw_row(&mut canvas, &header_cells, &widths, TABLE_Y, header_height, header, header_style);
    let mut y = TABLE_Y + header_height;

    let mut row_pages = Vec::with_capacity(request.records.len());
    for (index, row) in project_rows(request).iter().enumerate() {
        let cells = wrap_cells(row, &widths, false);
        let height = row_height(&cells);
        if y + height > bottom {
            canvas.add_page();
            let top = MARGIN;
            draw_row(&mut canvas, &header_cells, &widths, top, header_height, header, header_style);
            y = MARGIN + header_height;
        }
        let fill = (index % 2 == 1).then_some(STRIPE);
        draw_row(&mut canvas, &cells, &widths, y, height, fill, body_style);
        row_pages.push(canvas.current_page());
        y += height;
    }

    Ok(TableLayout { canvas, row_pages })
}

pub fn encode_pdf_table(
    request: &ExportRequest,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, ExportError> {
    let layout = layout_table(request, generated_at)?;
    let title = request.title.as_deref().unwrap_or(&request.base_name);
    Ok(render_pdf(&layout.canvas, title)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ExportColumn;
    use chrono::NaiveDate;
    use serde_json::json;
    use shopkeep_pdf::DrawOp;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14)
            .and_then(|d| d.and_hms_opt(18, 45, 0))
            .unwrap()
    }

    fn request(rows: usize) -> ExportRequest {
        let records = (0..rows)
            .map(|i| json!({"name": format!("Product {i}"), "stock": i}))
            .collect();
        ExportRequest::new(
            "inventory",
            vec![
                ExportColumn::new("name", "Name").width(30.0),
                ExportColumn::new("stock", "Stock").width(10.0),
            ],
            records,
        )
        .title("Inventory Report")
    }

    fn header_fills(layout: &TableLayout, page: usize) -> usize {
        layout.canvas.pages()[page]
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { fill: Some(ACCENT), .. }))
            .count()
    }

    #[test]
    fn title_and_stamp_sit_at_fixed_positions() {
        let layout = layout_table(&request(1), at()).unwrap();
        let ops = layout.canvas.pages()[0].ops();
        assert!(matches!(&ops[0], DrawOp::Text { y, text, .. } if *y == TITLE_Y && text == "Inventory Report"));
        assert!(matches!(&ops[1], DrawOp::Text { y, text, .. } if *y == STAMP_Y && text == "Generated on: 14/10/2026 18:45"));
    }

    #[test]
    fn header_uses_accent_and_white_text() {
        let layout = layout_table(&request(1), at()).unwrap();
        assert_eq!(header_fills(&layout, 0), 2);
        let white_header = layout.canvas.pages()[0].ops().iter().any(|op| {
            matches!(op, DrawOp::Text { text, style, .. } if text == "Name" && style.color == Rgb::WHITE && style.bold)
        });
        assert!(white_header);
    }

    #[test]
    fn long_tables_repeat_the_header_on_every_page() {
        let layout = layout_table(&request(120), at()).unwrap();
        let pages = layout.canvas.page_count();
        assert!(pages > 1);
        for page in 0..pages {
            assert_eq!(header_fills(&layout, page), 2, "page {page}");
        }
        assert_eq!(layout.row_pages.len(), 120);
        assert!(layout.row_pages.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn rows_keep_record_order() {
        let layout = layout_table(&request(3), at()).unwrap();
        let texts: Vec<_> = layout.canvas.pages()[0]
            .texts()
            .filter(|t| t.starts_with("Product"))
            .collect();
        assert_eq!(texts, vec!["Product 0", "Product 1", "Product 2"]);
    }

    #[test]
    fn renders_pdf_bytes() {
        let bytes = encode_pdf_table(&request(5), at()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
