//! Vector shapes: rectangles, lines and Bézier paths
//!
//! Paths are built in top-left page coordinates, like every other
//! position in this crate, and flipped when converted to operators.

use crate::document::Color;
use crate::fmt_num;

/// Stroke settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f64,
    pub color: Color,
}

impl LineStyle {
    pub fn new(width: f64, color: Color) -> Self {
        Self { width, color }
    }
}

/// A single path construction operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// Cubic Bézier: two control points, then the end point
    CurveTo(f64, f64, f64, f64, f64, f64),
    Close,
}

/// A vector path made of [`PathOp`]s
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub ops: Vec<PathOp>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        self.ops.push(PathOp::MoveTo(x, y));
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        self.ops.push(PathOp::LineTo(x, y));
        self
    }

    pub fn close(mut self) -> Self {
        self.ops.push(PathOp::Close);
        self
    }

    /// Closed rectangle with its top-left corner at `(x, y)`
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new()
            .move_to(x, y)
            .line_to(x + width, y)
            .line_to(x + width, y + height)
            .line_to(x, y + height)
            .close()
    }

    /// Pie slice centred at `(cx, cy)`
    ///
    /// Angles are in degrees, measured clockwise from 12 o'clock. A sweep
    /// of 360 or more yields a full disc without the centre spoke.
    pub fn pie_slice(cx: f64, cy: f64, radius: f64, start: f64, sweep: f64) -> Self {
        let sweep = sweep.clamp(0.0, 360.0);
        let full = sweep >= 360.0;
        let point = |deg: f64| {
            let rad = deg.to_radians();
            (cx + radius * rad.sin(), cy - radius * rad.cos())
        };

        let mut path = Self::new();
        let (sx, sy) = point(start);
        if full {
            path = path.move_to(sx, sy);
        } else {
            path = path.move_to(cx, cy).line_to(sx, sy);
        }

        // Segments of at most 90 degrees keep the cubic approximation tight
        let segments = (sweep / 90.0).ceil().max(1.0) as usize;
        let step = sweep / segments as f64;
        let k = 4.0 / 3.0 * (step.to_radians() / 4.0).tan();

        for i in 0..segments {
            let a0 = (start + step * i as f64).to_radians();
            let a1 = (start + step * (i + 1) as f64).to_radians();
            let (x0, y0) = (cx + radius * a0.sin(), cy - radius * a0.cos());
            let (x3, y3) = (cx + radius * a1.sin(), cy - radius * a1.cos());
            // Tangent of a clockwise sweep in y-down space is (cos, sin)
            let c1 = (x0 + k * radius * a0.cos(), y0 + k * radius * a0.sin());
            let c2 = (x3 - k * radius * a1.cos(), y3 - k * radius * a1.sin());
            path.ops.push(PathOp::CurveTo(c1.0, c1.1, c2.0, c2.1, x3, y3));
        }

        path.close()
    }

    /// Full circle
    pub fn circle(cx: f64, cy: f64, radius: f64) -> Self {
        Self::pie_slice(cx, cy, radius, 0.0, 360.0)
    }

    /// Content stream operators for this path, flipped onto a page of
    /// `page_height` points
    pub(crate) fn to_operators(&self, page_height: f64) -> String {
        let y = |v: f64| fmt_num(page_height - v);
        let mut out = String::new();
        for op in &self.ops {
            match *op {
                PathOp::MoveTo(px, py) => {
                    out.push_str(&format!("{} {} m\n", fmt_num(px), y(py)));
                }
                PathOp::LineTo(px, py) => {
                    out.push_str(&format!("{} {} l\n", fmt_num(px), y(py)));
                }
                PathOp::CurveTo(x1, y1, x2, y2, x3, y3) => {
                    out.push_str(&format!(
                        "{} {} {} {} {} {} c\n",
                        fmt_num(x1),
                        y(y1),
                        fmt_num(x2),
                        y(y2),
                        fmt_num(x3),
                        y(y3)
                    ));
                }
                PathOp::Close => out.push_str("h\n"),
            }
        }
        out
    }
}

/// Paint operator for a path: fill, stroke or both
pub(crate) fn paint_operators(
    path: &Path,
    page_height: f64,
    fill: Option<Color>,
    stroke: Option<LineStyle>,
) -> Vec<u8> {
    let mut ops = String::from("q\n");
    if let Some(color) = fill {
        ops.push_str(&color_operator(color, "rg"));
    }
    if let Some(style) = stroke {
        ops.push_str(&color_operator(style.color, "RG"));
        ops.push_str(&format!("{} w\n", fmt_num(style.width)));
    }
    ops.push_str(&path.to_operators(page_height));
    ops.push_str(match (fill.is_some(), stroke.is_some()) {
        (true, true) => "B\n",
        (true, false) => "f\n",
        (false, true) => "S\n",
        (false, false) => "n\n",
    });
    ops.push_str("Q\n");
    ops.into_bytes()
}

fn color_operator(color: Color, op: &str) -> String {
    format!(
        "{} {} {} {op}\n",
        fmt_num(color.r as f64),
        fmt_num(color.g as f64),
        fmt_num(color.b as f64)
    )
}

/// Angle in degrees of the arc covered by `value` out of `total`
pub fn sweep_degrees(value: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        value / total * 360.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rect_operators() {
        let ops = Path::rect(10.0, 20.0, 30.0, 40.0).to_operators(100.0);
        assert_eq!(ops, "10 80 m\n40 80 l\n40 40 l\n10 40 l\nh\n");
    }

    #[test]
    fn test_pie_slice_quarter() {
        let path = Path::pie_slice(50.0, 50.0, 10.0, 0.0, 90.0);
        assert_eq!(path.ops[0], PathOp::MoveTo(50.0, 50.0));
        // Starts at 12 o'clock
        match path.ops[1] {
            PathOp::LineTo(x, y) => {
                assert!((x - 50.0).abs() < 1e-9);
                assert!((y - 40.0).abs() < 1e-9);
            }
            other => panic!("unexpected op {other:?}"),
        }
        // Ends at 3 o'clock
        match path.ops[2] {
            PathOp::CurveTo(_, _, _, _, x, y) => {
                assert!((x - 60.0).abs() < 1e-9);
                assert!((y - 50.0).abs() < 1e-9);
            }
            other => panic!("unexpected op {other:?}"),
        }
        assert_eq!(path.ops.last(), Some(&PathOp::Close));
    }

    #[test]
    fn test_pie_slice_segment_count() {
        let path = Path::pie_slice(0.0, 0.0, 5.0, 0.0, 200.0);
        let curves = path
            .ops
            .iter()
            .filter(|op| matches!(op, PathOp::CurveTo(..)))
            .count();
        assert_eq!(curves, 3);
    }

    #[test]
    fn test_circle_has_no_spoke() {
        let path = Path::circle(0.0, 0.0, 5.0);
        assert!(!path.ops.iter().any(|op| matches!(op, PathOp::LineTo(..))));
        let curves = path
            .ops
            .iter()
            .filter(|op| matches!(op, PathOp::CurveTo(..)))
            .count();
        assert_eq!(curves, 4);
    }

    #[test]
    fn test_paint_operators() {
        let path = Path::rect(0.0, 0.0, 1.0, 1.0);
        let fill = String::from_utf8(paint_operators(&path, 10.0, Some(Color::red()), None)).unwrap();
        assert!(fill.contains("1 0 0 rg"));
        assert!(fill.contains("f\n"));

        let stroke = String::from_utf8(paint_operators(
            &path,
            10.0,
            None,
            Some(LineStyle::new(0.5, Color::black())),
        ))
        .unwrap();
        assert!(stroke.contains("0 0 0 RG"));
        assert!(stroke.contains("0.5 w"));
        assert!(stroke.contains("S\n"));
    }

    #[test]
    fn test_sweep_degrees() {
        assert_eq!(sweep_degrees(1.0, 4.0), 90.0);
        assert_eq!(sweep_degrees(3.0, 0.0), 0.0);
    }
}
