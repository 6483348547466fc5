//! Table layout: row measuring, page breaks with repeated headers

use super::layout::{Canvas, WrappedParagraph};
use super::qr;
use crate::document::{Cell, CellContent, Row, Table, VerticalAlign};
use crate::theme::HexColor;
use crate::Result;
use pdf_core::{image_dimensions, LineStyle};
use std::path::Path;

/// A cell measured for its column
enum Content {
    Text(Vec<WrappedParagraph>),
    Image { path: std::path::PathBuf, width: f64, height: f64 },
    QrCode { data: String, size: f64 },
    Empty,
}

impl Content {
    fn height(&self) -> f64 {
        match self {
            Content::Text(paragraphs) => paragraphs.iter().map(WrappedParagraph::height).sum(),
            Content::Image { height, .. } => *height,
            Content::QrCode { size, .. } => *size,
            Content::Empty => 0.0,
        }
    }
}

struct MeasuredRow<'t> {
    row: &'t Row,
    cells: Vec<Content>,
    height: f64,
}

pub(crate) fn draw_table(canvas: &mut Canvas, table: &Table) -> Result<()> {
    if table.rows.is_empty() || table.column_widths.is_empty() {
        return Ok(());
    }

    let rows = table
        .rows
        .iter()
        .map(|row| measure_row(canvas, table, row))
        .collect::<Result<Vec<_>>>()?;

    let header_count = table.header_rows.min(rows.len());
    let (header, body) = rows.split_at(header_count);
    let header_height: f64 = header.iter().map(|r| r.height).sum();
    let x = canvas.left() + (canvas.frame_width() - table.width()) / 2.0;

    let first_body = body.first().map_or(0.0, |r| r.height);
    if canvas.would_overflow(header_height + first_body) {
        canvas.new_page()?;
    }

    let mut segment_top = canvas.y;
    for row in header {
        draw_row(canvas, table, row, x, None)?;
    }

    for (index, row) in body.iter().enumerate() {
        if canvas.would_overflow(row.height) {
            draw_border(canvas, table, x, segment_top)?;
            canvas.new_page()?;
            log::debug!("table continues on page {}", canvas.page);
            segment_top = canvas.y;
            for header_row in header {
                draw_row(canvas, table, header_row, x, None)?;
            }
        }
        draw_row(canvas, table, row, x, Some(index))?;
    }

    draw_border(canvas, table, x, segment_top)
}

fn measure_row<'t>(canvas: &mut Canvas, table: &Table, row: &'t Row) -> Result<MeasuredRow<'t>> {
    if row.cells.len() > table.column_widths.len() {
        log::warn!(
            "row has {} cells for {} columns, extra cells dropped",
            row.cells.len(),
            table.column_widths.len()
        );
    }

    let padding = table.padding;
    let mut cells = Vec::with_capacity(row.cells.len());
    let mut content_height: f64 = 0.0;

    for (cell, column_width) in row.cells.iter().zip(&table.column_widths) {
        let inner_width = column_width - padding.left - padding.right;
        let content = match &cell.content {
            CellContent::Text(paragraphs) => {
                let base = table.style.merge(&row.style).merge(&cell.style);
                let wrapped = paragraphs
                    .iter()
                    .map(|p| canvas.wrap_paragraph(p, &base, inner_width))
                    .collect::<Result<Vec<_>>>()?;
                Content::Text(wrapped)
            }
            CellContent::Image {
                path,
                width,
                height,
            } => Content::Image {
                path: path.clone(),
                width: *width,
                height: *height,
            },
            CellContent::QrCode { data, size } => Content::QrCode {
                data: data.clone(),
                size: *size,
            },
            CellContent::Empty => Content::Empty,
        };
        content_height = content_height.max(content.height());
        cells.push(content);
    }

    Ok(MeasuredRow {
        row,
        cells,
        height: content_height + padding.top + padding.bottom,
    })
}

/// Background precedence: cell, then row, then the alternating body colour
fn background(table: &Table, row: &Row, cell: &Cell, body_index: Option<usize>) -> Option<HexColor> {
    cell.background.or(row.background).or_else(|| {
        let index = body_index?;
        if table.row_backgrounds.is_empty() {
            None
        } else {
            Some(table.row_backgrounds[index % table.row_backgrounds.len()])
        }
    })
}

fn draw_row(
    canvas: &mut Canvas,
    table: &Table,
    measured: &MeasuredRow,
    x: f64,
    body_index: Option<usize>,
) -> Result<()> {
    let padding = table.padding;
    let top = canvas.y;
    let height = measured.height;
    let mut cell_x = x;

    for ((cell, content), &width) in measured
        .row
        .cells
        .iter()
        .zip(&measured.cells)
        .zip(&table.column_widths)
    {
        if let Some(color) = background(table, measured.row, cell, body_index) {
            canvas
                .pdf
                .fill_rect(canvas.page, cell_x, top, width, height, color.into())?;
        }

        let inner_width = width - padding.left - padding.right;
        let content_top = match table.valign {
            VerticalAlign::Top => top + padding.top,
            VerticalAlign::Middle => {
                top + padding.top
                    + (height - padding.top - padding.bottom - content.height()) / 2.0
            }
        };

        match content {
            Content::Text(paragraphs) => {
                canvas.draw_wrapped(paragraphs, cell_x + padding.left, inner_width, content_top)?
            }
            Content::Image {
                path,
                width: box_width,
                height: box_height,
            } => {
                let left = cell_x + padding.left;
                draw_image(canvas, path, left, inner_width, content_top, *box_width, *box_height)
            }
            Content::QrCode { data, size } => {
                let left = cell_x + padding.left + (inner_width - size) / 2.0;
                qr::draw_qr_code(canvas, data, left, content_top, *size)?
            }
            Content::Empty => {}
        }

        if let Some(grid) = table.grid {
            canvas.pdf.stroke_rect(
                canvas.page,
                cell_x,
                top,
                width,
                height,
                LineStyle::new(grid.width, grid.color.into()),
            )?;
        }

        cell_x += width;
    }

    canvas.y += height;
    Ok(())
}

/// Scale an image into its box, centred in the column. Unreadable images
/// are skipped so a bad photo never fails the report.
fn draw_image(
    canvas: &mut Canvas,
    path: &Path,
    left: f64,
    column_width: f64,
    top: f64,
    box_width: f64,
    box_height: f64,
) {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("skipping image {}: {}", path.display(), e);
            return;
        }
    };
    let (pixel_width, pixel_height) = match image_dimensions(&data) {
        Ok(dims) if dims.0 > 0 && dims.1 > 0 => dims,
        Ok(_) => {
            log::warn!("skipping empty image {}", path.display());
            return;
        }
        Err(e) => {
            log::warn!("skipping image {}: {}", path.display(), e);
            return;
        }
    };

    let scale = (box_width / pixel_width as f64).min(box_height / pixel_height as f64);
    let (width, height) = (pixel_width as f64 * scale, pixel_height as f64 * scale);
    let x = left + (column_width - width) / 2.0;
    let y = top + (box_height - height) / 2.0;

    if let Err(e) = canvas.pdf.insert_image(&data, canvas.page, x, y, width, height) {
        log::warn!("skipping image {}: {}", path.display(), e);
    }
}

fn draw_border(canvas: &mut Canvas, table: &Table, x: f64, top: f64) -> Result<()> {
    if let Some(border) = table.border {
        let height = canvas.y - top;
        if height > 0.0 {
            canvas.pdf.stroke_rect(
                canvas.page,
                x,
                top,
                table.width(),
                height,
                LineStyle::new(border.width, border.color.into()),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Line, Margins, Orientation, Padding, ReportDocument, TextStyle};
    use pdf_core::PdfDocument;
    use pretty_assertions::assert_eq;

    fn table_with_rows(count: usize) -> Table {
        let mut table = Table::new(vec![100.0, 200.0])
            .header_rows(1)
            .padding(Padding::all(6.0))
            .grid(Line::new(0.5, HexColor::GRAY))
            .border(Line::new(1.5, HexColor::BLACK))
            .row_backgrounds(vec![HexColor::WHITE, HexColor::LIGHTGREY])
            .row(Row::new(vec![Cell::text("No"), Cell::text("Name")]).with_style(TextStyle::new().bold()));
        for i in 0..count {
            table = table.row(Row::new(vec![
                Cell::text((i + 1).to_string()),
                Cell::text(format!("Student {i}")),
            ]));
        }
        table
    }

    #[test]
    fn test_row_height_includes_padding() {
        let doc = ReportDocument::new("t", Orientation::Portrait, Margins::all(50.0));
        let mut canvas = Canvas::new(PdfDocument::new(), &doc, "helvetica".to_string());
        canvas.new_page().unwrap();

        let table = table_with_rows(1);
        let measured = measure_row(&mut canvas, &table, &table.rows[1]).unwrap();
        assert!((measured.height - (12.0 + 12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_long_table_breaks_pages() {
        let doc = ReportDocument::new("t", Orientation::Portrait, Margins::all(50.0));
        let mut canvas = Canvas::new(PdfDocument::new(), &doc, "helvetica".to_string());
        canvas.new_page().unwrap();

        draw_table(&mut canvas, &table_with_rows(100)).unwrap();
        // 101 rows of 24pt do not fit on one A4 page
        assert!(canvas.pdf.page_count() >= 4);
        assert!(canvas.y <= canvas.bottom());
    }

    #[test]
    fn test_background_precedence() {
        let table = table_with_rows(2);
        let row = &table.rows[1];
        let plain = Cell::text("x");
        let colored = Cell::text("x").with_background(HexColor::BLACK);

        assert_eq!(background(&table, row, &plain, Some(0)), Some(HexColor::WHITE));
        assert_eq!(background(&table, row, &plain, Some(3)), Some(HexColor::LIGHTGREY));
        assert_eq!(background(&table, row, &plain, None), None);
        assert_eq!(background(&table, row, &colored, Some(0)), Some(HexColor::BLACK));
    }

    #[test]
    fn test_missing_image_is_skipped() {
        let doc = ReportDocument::new("t", Orientation::Portrait, Margins::all(50.0));
        let mut canvas = Canvas::new(PdfDocument::new(), &doc, "helvetica".to_string());
        canvas.new_page().unwrap();

        let table = Table::new(vec![100.0])
            .row(Row::new(vec![Cell::image("/no/such/photo.jpg", 79.2, 79.2)]));
        draw_table(&mut canvas, &table).unwrap();
        assert!((canvas.y - (50.0 + 79.2)).abs() < 1e-9);
    }
}
