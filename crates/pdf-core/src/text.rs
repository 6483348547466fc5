//! Text rendering utilities

use crate::document::Color;
use crate::{fmt_num, Align};

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
    /// Counter-clockwise rotation in degrees around the anchor point
    pub rotation: f64,
}

/// Generate PDF operators for text insertion
///
/// `encoded` is an already-encoded string operand, either a literal
/// `(...)` or a hex `<...>` string. The anchor `(x, y)` is in PDF
/// coordinates; alignment shifts the start point along the baseline.
pub fn generate_text_operators(
    encoded: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let mut ops = String::new();

    let offset = match align {
        Align::Left => 0.0,
        Align::Center => -ctx.text_width / 2.0,
        Align::Right => -ctx.text_width,
    };

    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        fmt_num(ctx.color.r as f64),
        fmt_num(ctx.color.g as f64),
        fmt_num(ctx.color.b as f64)
    ));
    ops.push_str(&format!(
        "/{} {} Tf\n",
        ctx.font_name,
        fmt_num(ctx.font_size as f64)
    ));

    if ctx.rotation == 0.0 {
        ops.push_str(&format!("{} {} Td\n", fmt_num(x + offset), fmt_num(y)));
    } else {
        let (sin, cos) = ctx.rotation.to_radians().sin_cos();
        ops.push_str(&format!(
            "{} {} {} {} {} {} Tm\n",
            fmt_num(cos),
            fmt_num(sin),
            fmt_num(-sin),
            fmt_num(cos),
            fmt_num(x + offset * cos),
            fmt_num(y + offset * sin)
        ));
    }

    ops.push_str(&format!("{encoded} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Break text into lines no wider than `max_width`
///
/// Explicit newlines always start a new line. Words wider than the limit
/// are split between characters. `measure` returns the width of a string
/// in the same unit as `max_width`.
pub fn wrap_text<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let mut current = String::new();

        for word in raw_line.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if measure(word) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    let mut next = current.clone();
                    next.push(c);
                    if !current.is_empty() && measure(&next) > max_width {
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    } else {
                        current = next;
                    }
                }
            }
        }

        lines.push(current);
    }

    lines
}
