//! Approximate Helvetica metrics for layout.
//!
//! The builtin PDF fonts carry no metrics we can query, so widths come from a
//! coarse per-character table (in em units). Good enough to decide where a
//! product name wraps; not good enough for justified text.

const PT_TO_MM: f32 = 0.352_778;

fn char_em(c: char) -> f32 {
    match c {
        ' ' => 0.278,
        'i' | 'j' | 'l' | '|' | '!' | '\'' | '.' | ',' | ':' | ';' => 0.24,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '/' | '-' => 0.333,
        'm' | 'w' => 0.833,
        'M' | 'W' => 0.889,
        'A'..='Z' => 0.667,
        '0'..='9' => 0.556,
        'a'..='z' => 0.54,
        '@' => 1.015,
        _ => 0.584,
    }
}

/// Width of `text` in millimetres.
pub fn text_width(text: &str, size_pt: f32, bold: bool) -> f32 {
    let em: f32 = text.chars().map(char_em).sum();
    let factor = if bold { 1.06 } else { 1.0 };
    em * factor * size_pt * PT_TO_MM
}

/// Baseline-to-baseline distance for a font size, in millimetres.
pub fn line_height(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM * 1.3
}

/// Greedy word wrap to `max_width` mm. Words wider than the line are split
/// by character. Always returns at least one (possibly empty) line.
pub fn wrap_text(text: &str, max_width: f32, size_pt: f32, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if text_width(&candidate, size_pt, bold) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, size_pt, bold) <= max_width {
            current = word.to_string();
        } else {
            for c in word.chars() {
                let mut next = current.clone();
                next.push(c);
                if !current.is_empty() && text_width(&next, size_pt, bold) > max_width {
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                } else {
                    current = next;
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
