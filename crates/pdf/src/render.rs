//! `printpdf` backend for [`Canvas`].

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
};
use thiserror::Error;

use crate::canvas::{Canvas, DrawOp, Rgb, resolved_left};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font setup failed: {0}")]
    Font(String),
    #[error("pdf serialization failed: {0}")]
    Serialize(String),
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_color(rgb: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        f32::from(rgb.0) / 255.0,
        f32::from(rgb.1) / 255.0,
        f32::from(rgb.2) / 255.0,
        None,
    ))
}

/// Builtin fonts only cover a Latin code page; keep output ASCII.
fn font_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '₹' => out.push_str("Rs."),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            '\t' => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, page_height: f32, op: &DrawOp) {
    match op {
        DrawOp::Text { x, y, text, style } => {
            let text = font_safe(text);
            let left = resolved_left(*x, &text, style);
            let font = if style.bold { &fonts.bold } else { &fonts.regular };
            layer.set_fill_color(pdf_color(style.color));
            layer.use_text(text, style.size, Mm(left), Mm(page_height - y), font);
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            thickness,
        } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), Mm(page_height - y1)), false),
                    (Point::new(Mm(*x2), Mm(page_height - y2)), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let mode = match (fill, stroke) {
                (Some(_), Some(_)) => PaintMode::FillStroke,
                (Some(_), None) => PaintMode::Fill,
                (None, Some(_)) => PaintMode::Stroke,
                (None, None) => return,
            };
            if let Some(fill) = fill {
                layer.set_fill_color(pdf_color(*fill));
            }
            if let Some(stroke) = stroke {
                layer.set_outline_color(pdf_color(*stroke));
                layer.set_outline_thickness(0.3);
            }
            let rect = Rect::new(
                Mm(*x),
                Mm(page_height - y - height),
                Mm(x + width),
                Mm(page_height - y),
            )
            .with_mode(mode);
            layer.add_rect(rect);
        }
    }
}

/// Render every page of `canvas` into a PDF document.
pub fn render_pdf(canvas: &Canvas, title: &str) -> Result<Vec<u8>, RenderError> {
    let size = canvas.size();
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(size.width), Mm(size.height), "Layer 1");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(e.to_string()))?,
    };

    for (index, page) in canvas.pages().iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(size.width), Mm(size.height), "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };

        for op in page.ops() {
            draw(&layer, &fonts, size.height, op);
        }
    }

    tracing::debug!("rendered {} page(s) for {:?}", canvas.page_count(), title);

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| RenderError::Serialize(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| RenderError::Serialize(e.to_string()))
}
