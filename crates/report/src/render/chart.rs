//! Pie charts

use super::layout::{Canvas, ResolvedStyle, WrappedParagraph};
use crate::document::{PieChart, TextAlign, TextStyle};
use crate::theme::HexColor;
use crate::Result;
use pdf_core::{sweep_degrees, Color, LineStyle, Path};

/// Gap between the pie edge and a slice label
const LABEL_GAP: f64 = 8.0;

/// Text alignment for a label at `angle` degrees clockwise from 12 o'clock
fn label_align(angle: f64) -> TextAlign {
    let sin = angle.to_radians().sin();
    if sin > 0.1 {
        TextAlign::Left
    } else if sin < -0.1 {
        TextAlign::Right
    } else {
        TextAlign::Center
    }
}

pub(crate) fn draw_pie_chart(canvas: &mut Canvas, chart: &PieChart) -> Result<()> {
    if canvas.would_overflow(chart.height) {
        canvas.new_page()?;
    }

    let left = canvas.left() + (canvas.frame_width() - chart.width) / 2.0;
    let half = chart.width / 2.0;
    let (cx, cy) = (left + half / 2.0, canvas.y + chart.height / 2.0);
    let radius = chart.diameter / 2.0;
    let total = chart.total();

    if total > 0.0 {
        let visible: Vec<_> = chart.slices.iter().filter(|s| s.value > 0.0).collect();
        let label_style = ResolvedStyle::resolve(&TextStyle::new().size(8.0));
        let outline = LineStyle::new(0.5, Color::white());
        let mut start = 0.0;

        for slice in &visible {
            let sweep = sweep_degrees(slice.value, total);
            let path = if visible.len() == 1 {
                Path::circle(cx, cy, radius)
            } else {
                Path::pie_slice(cx, cy, radius, start, sweep)
            };
            canvas
                .pdf
                .draw_path(canvas.page, &path, Some(slice.color.into()), Some(outline))?;

            let mid = start + sweep / 2.0;
            let rad = mid.to_radians();
            let (lx, ly) = (
                cx + (radius + LABEL_GAP) * rad.sin(),
                cy - (radius + LABEL_GAP) * rad.cos(),
            );
            let style = ResolvedStyle {
                align: label_align(mid),
                ..label_style
            };
            // Zero-width box: the label is anchored at the point itself
            canvas.draw_line(&slice.label, lx, 0.0, ly - style.leading / 2.0, &style)?;

            start += sweep;
        }
    }

    if !chart.caption.is_empty() {
        let base = TextStyle::new().align(TextAlign::Center).color(HexColor::BLACK);
        let caption = chart
            .caption
            .iter()
            .map(|p| canvas.wrap_paragraph(p, &base, half))
            .collect::<Result<Vec<_>>>()?;
        let height: f64 = caption.iter().map(WrappedParagraph::height).sum();
        let top = canvas.y + (chart.height - height) / 2.0;
        canvas.draw_wrapped(&caption, left + half, half, top)?;
    }

    canvas.y += chart.height;
    Ok(())
}
