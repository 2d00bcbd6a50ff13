use crate::metrics::text_width;

/// Page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

pub const A4: PageSize = PageSize {
    width: 210.0,
    height: 297.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f32,
    pub bold: bool,
    pub color: Rgb,
    pub align: Align,
}

impl TextStyle {
    pub fn regular(size: f32) -> Self {
        Self {
            size,
            bold: false,
            color: Rgb::BLACK,
            align: Align::Left,
        }
    }

    pub fn bold(size: f32) -> Self {
        Self {
            bold: true,
            ..Self::regular(size)
        }
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// A single drawing instruction. Coordinates are mm from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `x` is the anchor given by `style.align`; `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb,
        thickness: f32,
    },
    /// `y` is the top edge.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    ops: Vec<DrawOp>,
}

impl Page {
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text of every `Text` op, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A growable list of pages. Drawing always targets the last page.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    size: PageSize,
    pages: Vec<Page>,
}

impl Canvas {
    /// New canvas with one empty page.
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: vec![Page::default()],
        }
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Zero-based index of the page currently drawn on.
    pub fn current_page(&self) -> usize {
        self.pages.len() - 1
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    pub fn text(&mut self, x: f32, y: f32, text: impl Into<String>, style: TextStyle) {
        self.push(DrawOp::Text {
            x,
            y,
            text: text.into(),
            style,
        });
    }

    /// Draw `text` right-aligned so it ends at `right`.
    pub fn text_right(&mut self, right: f32, y: f32, text: impl Into<String>, style: TextStyle) {
        self.text(right, y, text, style.align(Align::Right));
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color: Rgb::BLACK,
            thickness: 0.3,
        });
    }

    pub fn colored_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, thickness: f32) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            thickness,
        });
    }

    pub fn rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    ) {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        });
    }
}

/// Left edge of a text op after applying its alignment.
pub(crate) fn resolved_left(x: f32, text: &str, style: &TextStyle) -> f32 {
    match style.align {
        Align::Left => x,
        Align::Center => x - text_width(text, style.size, style.bold) / 2.0,
        Align::Right => x - text_width(text, style.size, style.bold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawing_targets_the_last_page() {
        let mut canvas = Canvas::new(A4);
        canvas.text(10.0, 10.0, "first", TextStyle::regular(10.0));
        canvas.add_page();
        canvas.text(10.0, 10.0, "second", TextStyle::bold(10.0));

        assert_eq!(canvas.page_count(), 2);
        assert_eq!(canvas.current_page(), 1);
        assert_eq!(canvas.pages()[0].texts().collect::<Vec<_>>(), vec!["first"]);
        assert_eq!(canvas.pages()[1].texts().collect::<Vec<_>>(), vec!["second"]);
    }

    #[test]
    fn right_alignment_ends_text_at_anchor() {
        let style = TextStyle::regular(10.0).align(Align::Right);
        let left = resolved_left(100.0, "1,000.00", &style);
        let width = text_width("1,000.00", 10.0, false);
        assert!((left + width - 100.0).abs() < 0.001);
    }
}
