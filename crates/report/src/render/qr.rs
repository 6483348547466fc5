//! QR codes drawn as vector modules

use super::layout::Canvas;
use crate::Result;
use pdf_core::{Color, LineStyle};
use qrcode::QrCode;

/// Modules of white border around the symbol
const QUIET_ZONE: usize = 4;

/// Horizontal runs of dark modules as `(row, first column, length)`
fn dark_runs(code: &QrCode) -> Vec<(usize, usize, usize)> {
    let width = code.width();
    let colors = code.to_colors();
    let mut runs = Vec::new();

    for (row, modules) in colors.chunks(width).enumerate() {
        let mut start = None;
        for (col, color) in modules.iter().enumerate() {
            match (*color == qrcode::Color::Dark, start) {
                (true, None) => start = Some(col),
                (false, Some(first)) => {
                    runs.push((row, first, col - first));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(first) = start {
            runs.push((row, first, width - first));
        }
    }

    runs
}

/// Draw `data` as a `size` x `size` QR code with its top-left at `(x, y)`
///
/// Data that cannot be encoded leaves an outlined blank square.
pub(crate) fn draw_qr_code(canvas: &mut Canvas, data: &str, x: f64, y: f64, size: f64) -> Result<()> {
    canvas
        .pdf
        .fill_rect(canvas.page, x, y, size, size, Color::white())?;

    let code = match QrCode::new(data.as_bytes()) {
        Ok(code) => code,
        Err(e) => {
            log::warn!("no QR code for {} bytes of data: {e}", data.len());
            canvas.pdf.stroke_rect(
                canvas.page,
                x,
                y,
                size,
                size,
                LineStyle::new(0.5, Color::gray()),
            )?;
            return Ok(());
        }
    };
    let module = size / (code.width() + 2 * QUIET_ZONE) as f64;

    for (row, col, len) in dark_runs(&code) {
        canvas.pdf.fill_rect(
            canvas.page,
            x + (QUIET_ZONE + col) as f64 * module,
            y + (QUIET_ZONE + row) as f64 * module,
            len as f64 * module,
            module,
            Color::black(),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Margins, Orientation, ReportDocument};
    use pdf_core::PdfDocument;

    /// Count of fill and stroke paint operators on the first page
    fn paints(data: &str) -> (usize, usize) {
        let doc = ReportDocument::new("qr", Orientation::Portrait, Margins::all(50.0));
        let mut canvas = Canvas::new(PdfDocument::new(), &doc, "helvetica".to_string());
        canvas.new_page().unwrap();
        draw_qr_code(&mut canvas, data, 50.0, 50.0, 72.0).unwrap();

        let pdf = lopdf::Document::load_mem(&canvas.into_pdf().to_bytes().unwrap()).unwrap();
        let content = pdf.get_page_content(pdf.get_pages()[&1]).unwrap();
        let ops = String::from_utf8_lossy(&content).into_owned();
        let count = |op: &str| ops.lines().filter(|line| line.trim() == op).count();
        (count("f"), count("S"))
    }

    #[test]
    fn test_runs_cover_dark_modules() {
        let code = QrCode::new(b"http://127.0.0.1:5000/verify/U1").unwrap();
        let dark = code
            .to_colors()
            .iter()
            .filter(|c| **c == qrcode::Color::Dark)
            .count();
        let covered: usize = dark_runs(&code).iter().map(|(_, _, len)| len).sum();
        assert_eq!(covered, dark);
    }

    #[test]
    fn test_finder_pattern_top_row() {
        let code = QrCode::new(b"hello").unwrap();
        let runs = dark_runs(&code);
        // The top row starts with the 7-module finder pattern
        assert_eq!(runs[0], (0, 0, 7));
    }

    #[test]
    fn test_encodable_data_draws_modules() {
        let (fills, strokes) = paints("http://127.0.0.1:5000/verify/U1");
        assert!(fills > 20);
        assert_eq!(strokes, 0);
    }

    #[test]
    fn test_oversized_data_leaves_blank_square() {
        // Beyond the capacity of the largest symbol
        let (fills, strokes) = paints(&"x".repeat(8000));
        assert_eq!((fills, strokes), (1, 1));
    }
}
