//! Integration tests for pdf-core
//!
//! Documents are written to bytes and read back with lopdf to check the
//! object graph a viewer would see.

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use lopdf::{Document, Object};
use pdf_core::{
    image_dimensions, Align, Color, FontFamilyBuilder, FontWeight, ImageScaleMode, LineStyle,
    PageSize, Path, PdfDocument, PdfError,
};
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgba([10u8, 120, 200, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb([90u8, 90, 90]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

fn reload(doc: &PdfDocument) -> Document {
    Document::load_mem(&doc.to_bytes().unwrap()).unwrap()
}

fn page_resources(pdf: &Document, page: u32) -> lopdf::Dictionary {
    let page_id = pdf.get_pages()[&page];
    let page = pdf.get_dictionary(page_id).unwrap();
    page.get(b"Resources").unwrap().as_dict().unwrap().clone()
}

fn page_text(pdf: &Document, page: u32) -> String {
    let page_id = pdf.get_pages()[&page];
    String::from_utf8_lossy(&pdf.get_page_content(page_id).unwrap()).into_owned()
}

#[test]
fn test_multi_page_document_roundtrip() {
    let mut doc = PdfDocument::new();
    doc.set_title("Student Report");
    let first = doc.add_page(PageSize::A4);
    let second = doc.add_page(PageSize::A4.landscape());

    doc.set_font("helvetica", 12.0).unwrap();
    doc.insert_text("First page", first, 50.0, 60.0, Align::Left)
        .unwrap();
    doc.set_font_weight(FontWeight::Bold).unwrap();
    doc.insert_text("Second page", second, 400.0, 60.0, Align::Center)
        .unwrap();

    let pdf = reload(&doc);
    assert_eq!(pdf.get_pages().len(), 2);

    let landscape_id = pdf.get_pages()[&2];
    let media_box = pdf
        .get_dictionary(landscape_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .clone();
    let width = media_box[2].as_float().unwrap();
    assert!((width - 841.89).abs() < 0.01);

    assert!(page_text(&pdf, 1).contains("(First page) Tj"));
    assert!(page_text(&pdf, 2).contains("(Second page) Tj"));

    // Each page only lists the fonts it uses
    let fonts = page_resources(&pdf, 2);
    let fonts = fonts.get(b"Font").unwrap().as_dict().unwrap();
    assert_eq!(fonts.len(), 1);
    let (_, font_ref) = fonts.iter().next().unwrap();
    let font = pdf
        .get_dictionary(font_ref.as_reference().unwrap())
        .unwrap();
    assert_eq!(
        font.get(b"BaseFont").unwrap(),
        &Object::Name(b"Helvetica-Bold".to_vec())
    );
}

#[test]
fn test_title_in_info_dictionary() {
    let mut doc = PdfDocument::new();
    doc.set_title("Batch");
    doc.add_page(PageSize::A4);

    let pdf = reload(&doc);
    let info_id = pdf.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = pdf.get_dictionary(info_id).unwrap();
    assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Batch");
}

#[test]
fn test_images_are_deduplicated() {
    let png = png_bytes(40, 20);
    let mut doc = PdfDocument::new();
    let page = doc.add_page(PageSize::A4);
    doc.insert_image(&png, page, 10.0, 10.0, 40.0, 20.0).unwrap();
    doc.insert_image(&png, page, 100.0, 10.0, 40.0, 20.0).unwrap();
    doc.insert_image(&jpeg_bytes(8, 8), page, 200.0, 10.0, 8.0, 8.0)
        .unwrap();

    let pdf = reload(&doc);
    let resources = page_resources(&pdf, 1);
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    assert_eq!(xobjects.len(), 2);
    assert_eq!(page_text(&pdf, 1).matches(" Do").count(), 3);
}

#[test]
fn test_fit_box_preserves_aspect() {
    let mut doc = PdfDocument::new();
    let page = doc.add_page(PageSize::A4);
    let drawn = doc
        .insert_image_scaled(&png_bytes(200, 100), page, 0.0, 0.0, 60.0, 60.0, ImageScaleMode::FitBox)
        .unwrap();
    assert!((drawn.0 - 60.0).abs() < 1e-9);
    assert!((drawn.1 - 30.0).abs() < 1e-9);
}

#[test]
fn test_image_dimensions_match_source() {
    assert_eq!(image_dimensions(&png_bytes(33, 17)).unwrap(), (33, 17));
}

#[test]
fn test_invalid_image_is_an_error() {
    let mut doc = PdfDocument::new();
    let page = doc.add_page(PageSize::A4);
    let result = doc.insert_image(b"not an image at all", page, 0.0, 0.0, 10.0, 10.0);
    assert!(matches!(result, Err(PdfError::ImageError(_))));
}

#[test]
fn test_shapes_and_opacity_resources() {
    let mut doc = PdfDocument::new();
    let page = doc.add_page(PageSize::A4);
    doc.fill_rect(page, 10.0, 10.0, 100.0, 20.0, Color::from_hex("#1a237e").unwrap())
        .unwrap();
    doc.stroke_rect(page, 10.0, 10.0, 100.0, 20.0, LineStyle::new(2.0, Color::black()))
        .unwrap();
    doc.line(page, (10.0, 40.0), (110.0, 40.0), LineStyle::new(0.5, Color::gray()))
        .unwrap();
    doc.draw_path(page, &Path::pie_slice(200.0, 200.0, 50.0, 0.0, 120.0), Some(Color::red()), None)
        .unwrap();

    doc.set_font("helvetica", 60.0).unwrap();
    doc.set_opacity(0.1);
    doc.insert_text_rotated("WATERMARK", page, 297.0, 420.0, Align::Center, 45.0)
        .unwrap();

    let pdf = reload(&doc);
    let content = page_text(&pdf, 1);
    assert!(content.contains(" re") || content.contains(" m\n"));
    assert!(content.contains(" c\n"));
    assert!(content.contains("/GS1 gs"));

    let resources = page_resources(&pdf, 1);
    let states = resources.get(b"ExtGState").unwrap().as_dict().unwrap();
    let gs_id = states.get(b"GS1").unwrap().as_reference().unwrap();
    let gs = pdf.get_dictionary(gs_id).unwrap();
    let alpha = gs.get(b"ca").unwrap().as_float().unwrap();
    assert!((alpha - 0.1).abs() < 1e-4);
}

#[test]
fn test_non_ascii_text_is_escaped() {
    let mut doc = PdfDocument::new();
    let page = doc.add_page(PageSize::A4);
    doc.set_font("helvetica", 10.0).unwrap();
    doc.insert_text("Café (main) • 100%", page, 10.0, 10.0, Align::Left)
        .unwrap();

    let pdf = reload(&doc);
    let content = page_text(&pdf, 1);
    assert!(content.contains("(Caf\\351 \\(main\\) \\225 100%) Tj"));
}

#[test]
fn test_save_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");

    let mut doc = PdfDocument::new();
    doc.add_page(PageSize::A4);
    doc.save(&path).unwrap();

    let pdf = Document::load(&path).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);
}

#[test]
fn test_font_family_registration_errors() {
    let mut doc = PdfDocument::new();
    let result = doc.register_font_family("helvetica", FontFamilyBuilder::new().regular(vec![1, 2, 3]));
    assert!(matches!(result, Err(PdfError::FontAlreadyExists(_))));

    let result = doc.register_font_family("broken", FontFamilyBuilder::new().regular(vec![1, 2, 3]));
    assert!(matches!(result, Err(PdfError::FontParseError(_))));
    assert!(!doc.has_font_family("broken"));
}

fn dejavu(file: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fonts")
        .join(file);
    std::fs::read(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[test]
fn test_truetype_family_is_embedded() {
    let regular = dejavu("DejaVuSans.ttf");
    let face = ttf_parser::Face::parse(&regular, 0).unwrap();
    let gid = |c: char| face.glyph_index(c).unwrap().0;
    let omega_hex = format!("<{:04X}{:04X}>", gid('Ω'), gid('ñ'));

    let mut doc = PdfDocument::new();
    doc.register_font_family(
        "dejavu",
        FontFamilyBuilder::new()
            .regular(regular.clone())
            .bold(dejavu("DejaVuSans-Bold.ttf")),
    )
    .unwrap();
    let page = doc.add_page(PageSize::A4);
    doc.set_font("dejavu", 14.0).unwrap();

    assert!(doc.get_text_width("Ωñ").unwrap() > 0.0);
    doc.insert_text("Ωñ", page, 50.0, 60.0, Align::Left).unwrap();
    doc.set_font_weight(FontWeight::Bold).unwrap();
    doc.insert_text("Ωñ", page, 50.0, 90.0, Align::Left).unwrap();

    let pdf = reload(&doc);
    assert!(page_text(&pdf, 1).contains(&format!("{omega_hex} Tj")));

    let resources = page_resources(&pdf, 1);
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
    assert_eq!(fonts.len(), 2);

    for (_, font_ref) in fonts.iter() {
        let type0 = pdf.get_dictionary(font_ref.as_reference().unwrap()).unwrap();
        assert_eq!(type0.get(b"Subtype").unwrap(), &Object::Name(b"Type0".to_vec()));
        assert_eq!(
            type0.get(b"Encoding").unwrap(),
            &Object::Name(b"Identity-H".to_vec())
        );

        let descendants = type0.get(b"DescendantFonts").unwrap().as_array().unwrap();
        let cid = pdf
            .get_dictionary(descendants[0].as_reference().unwrap())
            .unwrap();
        assert_eq!(
            cid.get(b"Subtype").unwrap(),
            &Object::Name(b"CIDFontType2".to_vec())
        );

        // Two glyphs in use, each listed as `gid [width]`
        let widths = cid.get(b"W").unwrap().as_array().unwrap();
        assert_eq!(widths.len(), 4);

        let descriptor = pdf
            .get_dictionary(cid.get(b"FontDescriptor").unwrap().as_reference().unwrap())
            .unwrap();
        assert!(descriptor.get(b"FontFile2").unwrap().as_reference().is_ok());
    }
}
