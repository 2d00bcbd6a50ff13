//! Bill layout on an A4 canvas.
//!
//! Everything is placed top-down by a single vertical cursor in mm. The
//! company header, title, customer block and footer appear once; only the
//! item table continues across pages.

use rust_decimal::Decimal;
use tracing::debug;

use shopkeep_core::{CurrencyStyle, DomainResult, format_inr};
use shopkeep_pdf::{A4, Align, Canvas, Rgb, TextStyle, wrap_text};

use crate::company::CompanyProfile;
use crate::invoice::Invoice;
use crate::words::rupees_in_words;

const LEFT: f32 = 15.0;
const RIGHT: f32 = 195.0;
pub const TOP_MARGIN: f32 = 20.0;
pub const BOTTOM_MARGIN: f32 = 15.0;
/// Distance from the page bottom past which no new item row starts.
const BREAK_OFFSET: f32 = 60.0;

const ROW_LINE: f32 = 5.0;
const ROW_PAD: f32 = 3.0;
const HEADER_ROW: f32 = 8.0;
const TOTALS_LINE: f32 = 6.0;
const TOTALS_X: f32 = 122.0;

const NO_X: f32 = 17.0;
const ITEM_X: f32 = 25.0;
const CODE_X: f32 = 97.0;
const QTY_RIGHT: f32 = 135.0;
const RATE_RIGHT: f32 = 163.0;
const AMOUNT_RIGHT: f32 = 193.0;

const SHADE: Rgb = Rgb(230, 230, 230);
const RULE: Rgb = Rgb(200, 200, 200);

/// Where an item row landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPlacement {
    pub index: usize,
    pub page: usize,
    pub top: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone)]
pub struct BillLayout {
    pub canvas: Canvas,
    pub rows: Vec<RowPlacement>,
}

/// Cursor row below which item rows may not start.
pub fn break_threshold() -> f32 {
    A4.height - BREAK_OFFSET
}

fn money(amount: Decimal) -> String {
    format_inr(amount, CurrencyStyle::Ascii)
}

fn percent(value: Decimal) -> String {
    value.normalize().to_string()
}

struct Columns {
    with_code: bool,
    item_width: f32,
}

impl Columns {
    fn for_invoice(invoice: &Invoice) -> Self {
        let with_code = invoice.items.iter().any(|i| i.tax_code.is_some());
        let item_end = if with_code { CODE_X - 2.0 } else { QTY_RIGHT - 20.0 };
        Self {
            with_code,
            item_width: item_end - ITEM_X,
        }
    }
}

/// Lay out `invoice` for `profile`. Fails before drawing anything when the
/// invoice is not printable.
pub fn layout_bill(invoice: &Invoice, profile: &CompanyProfile) -> DomainResult<BillLayout> {
    invoice.validate()?;

    let mut canvas = Canvas::new(A4);
    let columns = Columns::for_invoice(invoice);

    let mut y = draw_header(&mut canvas, profile);
    y = draw_title(&mut canvas, profile, y);
    y = draw_customer(&mut canvas, invoice, y);
    y = draw_table_header(&mut canvas, &columns, y);

    let bottom_limit = A4.height - BOTTOM_MARGIN;
    let mut rows = Vec::with_capacity(invoice.items.len());

    for (index, item) in invoice.items.iter().enumerate() {
        let name_lines = wrap_text(&item.name, columns.item_width, 10.0, false);
        let row_height = name_lines.len() as f32 * ROW_LINE + ROW_PAD;

        if y > break_threshold() || y + row_height > bottom_limit {
            canvas.add_page();
            y = draw_table_header(&mut canvas, &columns, TOP_MARGIN);
        }

        let style = TextStyle::regular(10.0);
        let baseline = y + ROW_LINE;
        canvas.text(NO_X, baseline, (index + 1).to_string(), style);
        for (n, line) in name_lines.iter().enumerate() {
            canvas.text(ITEM_X, baseline + n as f32 * ROW_LINE, line.clone(), style);
        }
        if let Some(code) = item.tax_code.as_ref().filter(|_| columns.with_code) {
            canvas.text(CODE_X, baseline, code.clone(), style);
        }
        canvas.text_right(QTY_RIGHT, baseline, item.quantity.to_string(), style);
        canvas.text_right(RATE_RIGHT, baseline, money(item.unit_price), style);
        canvas.text_right(AMOUNT_RIGHT, baseline, money(item.line_total), style);

        let bottom = y + row_height;
        canvas.colored_line(LEFT, bottom, RIGHT, bottom, RULE, 0.2);
        rows.push(RowPlacement {
            index,
            page: canvas.current_page(),
            top: y,
            bottom,
        });
        y = bottom;
    }

    y += 6.0;
    let footer_top = footer_top(profile);
    let words_width = TOTALS_X - LEFT - 8.0;
    let words = wrap_text(&rupees_in_words(invoice.grand_total), words_width, 10.0, false);
    let totals = totals_lines(invoice);
    let block_height = ((totals.len() as f32 + 1.0) * TOTALS_LINE + 4.0)
        .max(ROW_LINE * (words.len() as f32 + 1.0));
    if y + block_height > footer_top - 4.0 {
        debug!(invoice = %invoice.number, "totals moved to a new page");
        canvas.add_page();
        y = TOP_MARGIN;
    }

    draw_totals(&mut canvas, &totals, y);
    draw_words(&mut canvas, &words, y);
    draw_footer(&mut canvas, profile, footer_top);

    debug!(
        invoice = %invoice.number,
        items = invoice.items.len(),
        pages = canvas.page_count(),
        "bill laid out"
    );
    Ok(BillLayout { canvas, rows })
}

fn draw_header(canvas: &mut Canvas, profile: &CompanyProfile) -> f32 {
    let center = A4.width / 2.0;
    let mut y = TOP_MARGIN;
    canvas.text(center, y, profile.name.clone(), TextStyle::bold(18.0).align(Align::Center));
    y += 7.0;

    let small = TextStyle::regular(10.0).align(Align::Center);
    for line in &profile.address_lines {
        canvas.text(center, y, line.clone(), small);
        y += 5.0;
    }

    let contact: Vec<String> = [
        profile.phone.as_ref().map(|p| format!("Phone: {p}")),
        profile.email.as_ref().map(|e| format!("Email: {e}")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !contact.is_empty() {
        canvas.text(center, y, contact.join(" | "), small);
        y += 5.0;
    }
    if let Some(gst) = &profile.gst_id {
        canvas.text(center, y, format!("GSTIN: {gst}"), small);
        y += 5.0;
    }

    canvas.line(LEFT, y, RIGHT, y);
    y + 8.0
}

fn draw_title(canvas: &mut Canvas, profile: &CompanyProfile, y: f32) -> f32 {
    let title = if profile.gst_id.is_some() { "TAX INVOICE" } else { "INVOICE" };
    canvas.text(A4.width / 2.0, y, title, TextStyle::bold(14.0).align(Align::Center));
    y + 10.0
}

fn draw_customer(canvas: &mut Canvas, invoice: &Invoice, y: f32) -> f32 {
    let label = TextStyle::bold(11.0);
    let body = TextStyle::regular(10.0);

    let mut left = y;
    canvas.text(LEFT, left, "Bill To:", label);
    left += 6.0;
    canvas.text(LEFT, left, invoice.customer.name.clone(), body);
    left += 5.0;
    if !invoice.customer.phone.trim().is_empty() {
        canvas.text(LEFT, left, format!("Phone: {}", invoice.customer.phone), body);
        left += 5.0;
    }
    if let Some(email) = &invoice.customer.email {
        canvas.text(LEFT, left, format!("Email: {email}"), body);
        left += 5.0;
    }
    if let Some(address) = &invoice.customer.address {
        for line in wrap_text(address, 95.0, 10.0, false) {
            canvas.text(LEFT, left, line, body);
            left += 5.0;
        }
    }
    if let Some(gst) = &invoice.customer.gst_id {
        canvas.text(LEFT, left, format!("GSTIN: {gst}"), body);
        left += 5.0;
    }

    let mut right = y;
    canvas.text_right(RIGHT, right, format!("Invoice No: {}", invoice.number), label);
    right += 6.0;
    canvas.text_right(RIGHT, right, format!("Date: {}", invoice.date.format("%d/%m/%Y")), body);
    right += 5.0;
    canvas.text_right(RIGHT, right, format!("Time: {}", invoice.date.format("%I:%M %p")), body);
    right += 5.0;

    left.max(right) + 4.0
}

fn draw_table_header(canvas: &mut Canvas, columns: &Columns, y: f32) -> f32 {
    canvas.rect(LEFT, y, RIGHT - LEFT, HEADER_ROW, Some(SHADE), None);
    let style = TextStyle::bold(10.0);
    let baseline = y + 5.5;
    canvas.text(NO_X, baseline, "#", style);
    canvas.text(ITEM_X, baseline, "Item", style);
    if columns.with_code {
        canvas.text(CODE_X, baseline, "HSN/SAC", style);
    }
    canvas.text_right(QTY_RIGHT, baseline, "Qty", style);
    canvas.text_right(RATE_RIGHT, baseline, "Rate", style);
    canvas.text_right(AMOUNT_RIGHT, baseline, "Amount", style);
    y + HEADER_ROW
}

/// (label, value, emphasised)
fn totals_lines(invoice: &Invoice) -> Vec<(String, String, bool)> {
    let mut lines = vec![("Subtotal:".to_string(), money(invoice.subtotal), false)];
    if invoice.discount_percent > Decimal::ZERO {
        lines.push((
            format!("Discount ({}%):", percent(invoice.discount_percent)),
            format!("-{}", money(invoice.discount_amount)),
            false,
        ));
    }
    lines.push((
        format!("Tax ({}%):", percent(invoice.tax_rate_percent)),
        money(invoice.tax_amount),
        false,
    ));
    lines.push(("Grand Total:".to_string(), money(invoice.grand_total), true));
    lines.push(("Payment:".to_string(), invoice.payment_method.clone(), false));
    if let Some(tendered) = invoice.amount_tendered {
        lines.push(("Tendered:".to_string(), money(tendered), false));
    }
    if let Some(change) = invoice.change_due {
        lines.push(("Change:".to_string(), money(change), false));
    }
    lines
}

fn draw_totals(canvas: &mut Canvas, lines: &[(String, String, bool)], top: f32) {
    let height = (lines.len() as f32 + 1.0) * TOTALS_LINE;
    canvas.rect(TOTALS_X, top, RIGHT - TOTALS_X, height, None, Some(Rgb::BLACK));

    let mut y = top + TOTALS_LINE;
    for (label, value, emphasised) in lines {
        let style = if *emphasised {
            canvas.line(TOTALS_X + 2.0, y - 4.5, RIGHT - 2.0, y - 4.5);
            TextStyle::bold(12.0)
        } else {
            TextStyle::regular(10.0)
        };
        canvas.text(TOTALS_X + 3.0, y, label.clone(), style);
        canvas.text_right(RIGHT - 3.0, y, value.clone(), style);
        y += TOTALS_LINE;
    }
}

fn draw_words(canvas: &mut Canvas, words: &[String], top: f32) {
    let mut y = top + TOTALS_LINE;
    canvas.text(LEFT, y, "Amount in words:", TextStyle::bold(10.0));
    for line in words {
        y += ROW_LINE;
        canvas.text(LEFT, y, line.clone(), TextStyle::regular(10.0));
    }
}

fn footer_top(profile: &CompanyProfile) -> f32 {
    let height = 6.0 + 5.0 + profile.terms.len() as f32 * 4.0 + 8.0;
    A4.height - BOTTOM_MARGIN - height
}

fn draw_footer(canvas: &mut Canvas, profile: &CompanyProfile, top: f32) {
    canvas.colored_line(LEFT, top, RIGHT, top, RULE, 0.3);
    let mut y = top + 6.0;
    canvas.text(LEFT, y, "Terms & Conditions:", TextStyle::bold(9.0));
    y += 5.0;
    for term in &profile.terms {
        canvas.text(LEFT, y, term.clone(), TextStyle::regular(8.0));
        y += 4.0;
    }
    canvas.text(
        A4.width / 2.0,
        A4.height - BOTTOM_MARGIN,
        profile.closing.clone(),
        TextStyle::bold(10.0).align(Align::Center),
    );
}
