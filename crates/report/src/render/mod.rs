//! PDF backend for [`ReportDocument`]

mod chart;
mod layout;
mod qr;
mod table;

use crate::document::{Block, ReportDocument};
use crate::theme::{FontConfig, Theme};
use crate::{ReportError, Result};
use layout::Canvas;
use pdf_core::{FontFamilyBuilder, PdfDocument, STANDARD_FAMILY};
use std::path::Path;

/// Renders report documents to PDF
///
/// # Example
/// ```ignore
/// let renderer = PdfRenderer::new(config.theme.clone());
/// renderer.render_to_file(&document, "report.pdf")?;
/// ```
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    theme: Theme,
}

impl PdfRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Lay out and serialize a document
    pub fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let mut pdf = PdfDocument::new();
        pdf.set_title(&document.title);
        let family = load_fonts(&mut pdf, &self.theme.font)?;

        let mut canvas = Canvas::new(pdf, document, family);
        canvas.new_page()?;

        for section in &document.sections {
            log::debug!("rendering section {:?}", section.kind);
            for block in &section.blocks {
                match block {
                    Block::Paragraph(paragraph) => canvas.paragraph(paragraph)?,
                    Block::Table(t) => table::draw_table(&mut canvas, t)?,
                    Block::PieChart(pie) => chart::draw_pie_chart(&mut canvas, pie)?,
                    Block::Spacer { height } => canvas.spacer(*height)?,
                    Block::Rule(rule) => canvas.rule(rule)?,
                }
            }
        }

        let pdf = canvas.into_pdf();
        log::debug!("'{}' laid out on {} page(s)", document.title, pdf.page_count());
        Ok(pdf.to_bytes()?)
    }

    /// Render and write to `path`; the parent directory must exist
    pub fn render_to_file<P: AsRef<Path>>(&self, document: &ReportDocument, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.render(document)?;
        std::fs::write(path, bytes).map_err(|e| ReportError::io(path, e))?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

/// Register the theme font and return the family name to select
fn load_fonts(pdf: &mut PdfDocument, font: &FontConfig) -> Result<String> {
    if font.family == STANDARD_FAMILY {
        return Ok(font.family.clone());
    }

    let read = |path: &Path| std::fs::read(path).map_err(|e| ReportError::io(path, e));
    let regular = font.regular.as_deref().ok_or_else(|| {
        ReportError::Config(format!(
            "font family '{}' needs a regular TrueType file",
            font.family
        ))
    })?;

    let mut builder = FontFamilyBuilder::new().regular(read(regular)?);
    if let Some(path) = font.bold.as_deref() {
        builder = builder.bold(read(path)?);
    }
    if let Some(path) = font.italic.as_deref() {
        builder = builder.italic(read(path)?);
    }
    if let Some(path) = font.bold_italic.as_deref() {
        builder = builder.bold_italic(read(path)?);
    }

    pdf.register_font_family(&font.family, builder)?;
    Ok(font.family.clone())
}
