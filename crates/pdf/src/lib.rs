//! Page model and renderer shared by bills and table exports.
//!
//! Layout code draws onto a [`Canvas`] in millimetres with a top-down `y`
//! axis, which keeps pagination decisions testable without parsing PDF
//! output. [`render_pdf`] turns the finished canvas into bytes via `printpdf`.

pub mod canvas;
pub mod metrics;
pub mod render;

pub use canvas::{A4, Align, Canvas, DrawOp, Page, PageSize, Rgb, TextStyle};
pub use metrics::{line_height, text_width, wrap_text};
pub use render::{RenderError, render_pdf};
