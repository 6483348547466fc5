//! Flow layout: the page cursor, style resolution and paragraphs

use crate::document::{Paragraph, ReportDocument, Rule, TextAlign, TextStyle};
use crate::theme::HexColor;
use crate::Result;
use pdf_core::{wrap_text, Align, FontStyle, FontWeight, PageSize, PdfDocument};

const EPSILON: f64 = 0.01;

/// Fully resolved text style
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResolvedStyle {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: HexColor,
    pub align: TextAlign,
    pub leading: f64,
}

impl ResolvedStyle {
    /// Fill unset fields with 10pt black left-aligned text; leading
    /// defaults to 1.2 times the size
    pub fn resolve(style: &TextStyle) -> Self {
        let size = style.size.unwrap_or(10.0);
        Self {
            size,
            bold: style.bold.unwrap_or(false),
            italic: style.italic.unwrap_or(false),
            color: style.color.unwrap_or(HexColor::BLACK),
            align: style.align.unwrap_or_default(),
            leading: style.leading.unwrap_or(size * 1.2),
        }
    }

    /// Offset from the top of a line box to its baseline
    pub fn baseline_offset(&self) -> f64 {
        (self.leading - self.size) / 2.0 + self.size * 0.8
    }
}

/// A paragraph broken into lines for a given width
#[derive(Debug, Clone)]
pub(crate) struct WrappedParagraph {
    pub lines: Vec<String>,
    pub style: ResolvedStyle,
    pub space_before: f64,
    pub space_after: f64,
}

impl WrappedParagraph {
    pub fn height(&self) -> f64 {
        self.space_before + self.lines.len() as f64 * self.style.leading + self.space_after
    }
}

/// Page cursor over a [`PdfDocument`]
///
/// `y` is the top of the free space on the current page, measured from the
/// top edge. Content flows down and moves to a new page when it would
/// cross the bottom margin.
pub(crate) struct Canvas<'a> {
    pub pdf: PdfDocument,
    pub page: usize,
    pub y: f64,
    document: &'a ReportDocument,
    family: String,
    page_size: PageSize,
}

impl<'a> Canvas<'a> {
    pub fn new(pdf: PdfDocument, document: &'a ReportDocument, family: String) -> Self {
        Self {
            pdf,
            page: 0,
            y: document.margins.top,
            document,
            family,
            page_size: document.page_size(),
        }
    }

    pub fn into_pdf(self) -> PdfDocument {
        self.pdf
    }

    pub fn left(&self) -> f64 {
        self.document.margins.left
    }

    pub fn top(&self) -> f64 {
        self.document.margins.top
    }

    pub fn bottom(&self) -> f64 {
        self.page_size.height - self.document.margins.bottom
    }

    pub fn frame_width(&self) -> f64 {
        self.document.frame_width()
    }

    /// Whether `height` more points would cross the bottom margin. Never
    /// true at the top of a page, so oversized content is drawn anyway.
    pub fn would_overflow(&self, height: f64) -> bool {
        self.y + height > self.bottom() + EPSILON && self.y > self.top() + EPSILON
    }

    /// Start a new page and draw its overlay
    pub fn new_page(&mut self) -> Result<()> {
        self.page = self.pdf.add_page(self.page_size);
        self.y = self.top();
        log::debug!("layout: page {}", self.page);
        self.draw_overlay()
    }

    fn draw_overlay(&mut self) -> Result<()> {
        let (width, height) = (self.page_size.width, self.page_size.height);
        let document = self.document;

        if let Some(text) = &document.watermark {
            let style = ResolvedStyle::resolve(
                &TextStyle::new().size(60.0).bold().color(HexColor::LIGHTGREY),
            );
            self.apply_style(&style)?;
            self.pdf.set_opacity(0.1);
            self.pdf.insert_text_rotated(
                text,
                self.page,
                width / 2.0,
                height / 2.0,
                Align::Center,
                45.0,
            )?;
            self.pdf.set_opacity(1.0);
        }

        if document.page_numbers {
            let style = ResolvedStyle::resolve(&TextStyle::new().size(8.0).color(HexColor::GRAY));
            self.apply_style(&style)?;
            self.pdf.insert_text(
                &format!("Page {}", self.page),
                self.page,
                width - 50.0,
                height - 30.0,
                Align::Right,
            )?;
        }

        Ok(())
    }

    pub fn apply_style(&mut self, style: &ResolvedStyle) -> Result<()> {
        self.pdf.set_font(&self.family, style.size as f32)?;
        self.pdf.set_font_weight(if style.bold {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        })?;
        self.pdf.set_font_style(if style.italic {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        })?;
        self.pdf.set_text_color(style.color.into());
        Ok(())
    }

    pub fn wrap(&mut self, text: &str, width: f64, style: &ResolvedStyle) -> Result<Vec<String>> {
        self.apply_style(style)?;
        let pdf = &self.pdf;
        Ok(wrap_text(text, width, |s| {
            pdf.get_text_width(s).unwrap_or(0.0)
        }))
    }

    pub fn wrap_paragraph(
        &mut self,
        paragraph: &Paragraph,
        base: &TextStyle,
        width: f64,
    ) -> Result<WrappedParagraph> {
        let style = ResolvedStyle::resolve(&base.merge(&paragraph.style));
        Ok(WrappedParagraph {
            lines: self.wrap(&paragraph.text, width, &style)?,
            style,
            space_before: paragraph.space_before,
            space_after: paragraph.space_after,
        })
    }

    /// Draw one line of text in the box starting at `x` with the given
    /// width; `top` is the top of the line box
    pub fn draw_line(
        &mut self,
        text: &str,
        x: f64,
        width: f64,
        top: f64,
        style: &ResolvedStyle,
    ) -> Result<()> {
        self.apply_style(style)?;
        let anchor = match style.align {
            TextAlign::Left => x,
            TextAlign::Center => x + width / 2.0,
            TextAlign::Right => x + width,
        };
        self.pdf.insert_text(
            text,
            self.page,
            anchor,
            top + style.baseline_offset(),
            style.align.into(),
        )?;
        Ok(())
    }

    /// Draw pre-wrapped paragraphs starting at `top` without page breaks
    pub fn draw_wrapped(
        &mut self,
        paragraphs: &[WrappedParagraph],
        x: f64,
        width: f64,
        top: f64,
    ) -> Result<()> {
        let mut y = top;
        for paragraph in paragraphs {
            y += paragraph.space_before;
            for line in &paragraph.lines {
                self.draw_line(line, x, width, y, &paragraph.style)?;
                y += paragraph.style.leading;
            }
            y += paragraph.space_after;
        }
        Ok(())
    }

    /// Flow a paragraph across the frame, breaking pages between lines
    pub fn paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        let width = self.frame_width();
        let wrapped = self.wrap_paragraph(paragraph, &TextStyle::default(), width)?;

        if self.y > self.top() + EPSILON {
            self.y += wrapped.space_before;
        }
        for line in &wrapped.lines {
            if self.would_overflow(wrapped.style.leading) {
                self.new_page()?;
            }
            let (x, y) = (self.left(), self.y);
            self.draw_line(line, x, width, y, &wrapped.style)?;
            self.y += wrapped.style.leading;
        }
        self.y += wrapped.space_after;
        Ok(())
    }

    pub fn spacer(&mut self, height: f64) -> Result<()> {
        if self.would_overflow(height) {
            return self.new_page();
        }
        self.y += height;
        Ok(())
    }

    pub fn rule(&mut self, rule: &Rule) -> Result<()> {
        if self.would_overflow(rule.thickness) {
            self.new_page()?;
        }
        let width = rule.width.unwrap_or_else(|| self.frame_width());
        let x = self.left() + (self.frame_width() - width) / 2.0;
        self.pdf
            .fill_rect(self.page, x, self.y, width, rule.thickness, rule.color.into())?;
        self.y += rule.thickness;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Margins, Orientation};
    use pretty_assertions::assert_eq;

    fn document() -> ReportDocument {
        ReportDocument::new("t", Orientation::Portrait, Margins::all(50.0))
    }

    fn canvas(doc: &ReportDocument) -> Canvas<'_> {
        let mut canvas = Canvas::new(PdfDocument::new(), doc, "helvetica".to_string());
        canvas.new_page().unwrap();
        canvas
    }

    #[test]
    fn test_resolve_defaults() {
        let style = ResolvedStyle::resolve(&TextStyle::default());
        assert_eq!(style.size, 10.0);
        assert_eq!(style.leading, 12.0);
        assert_eq!(style.color, HexColor::BLACK);
        assert_eq!(style.align, TextAlign::Left);

        let style = ResolvedStyle::resolve(&TextStyle::new().size(20.0));
        assert_eq!(style.leading, 24.0);
    }

    #[test]
    fn test_paragraph_flows_onto_new_pages() {
        let doc = document();
        let mut canvas = canvas(&doc);
        let long = "word ".repeat(3000);
        canvas.paragraph(&Paragraph::new(long)).unwrap();
        assert!(canvas.pdf.page_count() > 1);
        assert!(canvas.y <= canvas.bottom());
    }

    #[test]
    fn test_space_before_ignored_at_page_top() {
        let doc = document();
        let mut canvas = canvas(&doc);
        canvas
            .paragraph(&Paragraph::new("Heading").spacing(15.0, 10.0))
            .unwrap();
        assert!((canvas.y - (50.0 + 12.0 + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_spacer_breaks_page() {
        let doc = document();
        let mut canvas = canvas(&doc);
        canvas.spacer(100.0).unwrap();
        assert_eq!(canvas.y, 150.0);
        canvas.spacer(10_000.0).unwrap();
        assert_eq!(canvas.pdf.page_count(), 2);
        assert_eq!(canvas.y, canvas.top());
    }

    #[test]
    fn test_wrapped_height() {
        let doc = document();
        let mut canvas = canvas(&doc);
        let wrapped = canvas
            .wrap_paragraph(
                &Paragraph::new("one two three").spacing(2.0, 3.0),
                &TextStyle::new().size(10.0),
                1000.0,
            )
            .unwrap();
        assert_eq!(wrapped.lines, vec!["one two three"]);
        assert!((wrapped.height() - 17.0).abs() < 1e-9);
    }
}
