//! PDF Core - Low-level PDF writing
//!
//! This crate provides functionality for:
//! - Creating PDF documents page by page
//! - Standard (base-14) Helvetica fonts and embedded TrueType font families
//! - Inserting text at specific coordinates, optionally rotated
//! - Filled/stroked rectangles, lines and Bézier paths
//! - Inserting images (JPEG, PNG)
//!
//! All coordinates are in points with the origin at the top-left corner of
//! the page; conversion to PDF's bottom-left origin happens internally.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, Color, PageSize, PdfDocument};
//!
//! let mut doc = PdfDocument::new();
//! let page = doc.add_page(PageSize::A4);
//! doc.set_font("helvetica", 12.0)?;
//! doc.insert_text("Hello, World!", page, 50.0, 60.0, Align::Left)?;
//! doc.fill_rect(page, 50.0, 80.0, 200.0, 2.0, Color::from_hex("#ffd700").unwrap())?;
//! doc.save("output.pdf")?;
//! ```

mod document;
mod font;
mod graphics;
mod image;
mod text;

pub use document::{Color, PageSize, PdfDocument};
pub use font::{
    FontData, FontFamily, FontFamilyBuilder, FontStyle, FontWeight, StandardFont,
    STANDARD_FAMILY,
};
pub use graphics::{sweep_degrees, LineStyle, Path, PathOp};
pub use image::{image_dimensions, ImageScaleMode};
pub use text::{generate_text_operators, wrap_text, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Format a number for a content stream: at most three decimals, no
/// trailing zeros, no negative zero.
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{rounded:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_default() {
        assert_eq!(Align::default(), Align::Left);
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(100.0), "100");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(841.89), "841.89");
        assert_eq!(fmt_num(1.0 / 3.0), "0.333");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(-12.25), "-12.25");
    }
}
