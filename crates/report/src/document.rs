//! Backend-agnostic report document model
//!
//! Composers build a [`ReportDocument`]; a backend such as
//! [`crate::PdfRenderer`] paginates and draws it. The model serializes to
//! JSON so other backends can consume it.

use crate::theme::HexColor;
use crate::Result;
use pdf_core::PageSize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Page orientation (A4 in both cases)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page margins in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn all(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl From<TextAlign> for pdf_core::Align {
    fn from(align: TextAlign) -> Self {
        match align {
            TextAlign::Left => pdf_core::Align::Left,
            TextAlign::Center => pdf_core::Align::Center,
            TextAlign::Right => pdf_core::Align::Right,
        }
    }
}

/// Partial text style; unset fields inherit from the enclosing element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<HexColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    /// Distance between baselines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading: Option<f64>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = Some(true);
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = Some(true);
        self
    }

    pub fn color(mut self, color: HexColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = Some(align);
        self
    }

    pub fn leading(mut self, leading: f64) -> Self {
        self.leading = Some(leading);
        self
    }

    /// Fields set in `over` win over fields set in `self`
    pub fn merge(&self, over: &TextStyle) -> TextStyle {
        TextStyle {
            size: over.size.or(self.size),
            bold: over.bold.or(self.bold),
            italic: over.italic.or(self.italic),
            color: over.color.or(self.color),
            align: over.align.or(self.align),
            leading: over.leading.or(self.leading),
        }
    }
}

/// A run of text wrapped to the available width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub space_before: f64,
    #[serde(default)]
    pub space_after: f64,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self::new(text).with_style(style)
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn spacing(mut self, before: f64, after: f64) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }
}

/// Inner cell padding in points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn all(value: f64) -> Self {
        Self::symmetric(value, value)
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// Stroke used for table grids and boxes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub width: f64,
    pub color: HexColor,
}

impl Line {
    pub fn new(width: f64, color: HexColor) -> Self {
        Self { width, color }
    }
}

/// Vertical placement of cell content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
}

/// What a table cell holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellContent {
    Text(Vec<Paragraph>),
    /// Image file scaled to fit `width` x `height`
    Image {
        path: PathBuf,
        width: f64,
        height: f64,
    },
    /// Payload drawn as a square QR code of `size` points
    QrCode { data: String, size: f64 },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub content: CellContent,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub background: Option<HexColor>,
}

impl Cell {
    fn with_content(content: CellContent) -> Self {
        Self {
            content,
            style: TextStyle::default(),
            background: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(CellContent::Text(vec![Paragraph::new(text)]))
    }

    pub fn paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self::with_content(CellContent::Text(paragraphs))
    }

    pub fn image(path: impl Into<PathBuf>, width: f64, height: f64) -> Self {
        Self::with_content(CellContent::Image {
            path: path.into(),
            width,
            height,
        })
    }

    pub fn qr_code(data: impl Into<String>, size: f64) -> Self {
        Self::with_content(CellContent::QrCode {
            data: data.into(),
            size,
        })
    }

    pub fn empty() -> Self {
        Self::with_content(CellContent::Empty)
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_background(mut self, color: HexColor) -> Self {
        self.background = Some(color);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub background: Option<HexColor>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            style: TextStyle::default(),
            background: None,
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_background(mut self, color: HexColor) -> Self {
        self.background = Some(color);
        self
    }
}

/// Grid of cells, centred in the frame
///
/// The first `header_rows` rows repeat at the top of every page the table
/// continues on. `row_backgrounds` cycles over the body rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub column_widths: Vec<f64>,
    pub rows: Vec<Row>,
    #[serde(default)]
    pub header_rows: usize,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub padding: Padding,
    #[serde(default)]
    pub grid: Option<Line>,
    #[serde(default)]
    pub border: Option<Line>,
    #[serde(default)]
    pub row_backgrounds: Vec<HexColor>,
    #[serde(default)]
    pub valign: VerticalAlign,
}

impl Table {
    pub fn new(column_widths: Vec<f64>) -> Self {
        Self {
            column_widths,
            rows: Vec::new(),
            header_rows: 0,
            style: TextStyle::default(),
            padding: Padding::default(),
            grid: None,
            border: None,
            row_backgrounds: Vec::new(),
            valign: VerticalAlign::default(),
        }
    }

    pub fn width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn header_rows(mut self, count: usize) -> Self {
        self.header_rows = count;
        self
    }

    pub fn style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn grid(mut self, line: Line) -> Self {
        self.grid = Some(line);
        self
    }

    pub fn border(mut self, line: Line) -> Self {
        self.border = Some(line);
        self
    }

    pub fn row_backgrounds(mut self, colors: Vec<HexColor>) -> Self {
        self.row_backgrounds = colors;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub color: HexColor,
}

/// Pie chart in the left half of a `width` x `height` box, with optional
/// caption paragraphs centred in the right half
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub width: f64,
    pub height: f64,
    pub diameter: f64,
    pub slices: Vec<PieSlice>,
    #[serde(default)]
    pub caption: Vec<Paragraph>,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value.max(0.0)).sum()
    }
}

/// Horizontal rule, centred; `width` defaults to the frame width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub thickness: f64,
    pub color: HexColor,
    #[serde(default)]
    pub width: Option<f64>,
}

/// Content block (tagged union)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    #[serde(rename = "piechart")]
    PieChart(PieChart),
    Spacer { height: f64 },
    Rule(Rule),
}

/// Role of a section within a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    Title,
    StudentInfo,
    AttendanceSummary,
    SubjectPerformance,
    AttendanceLog,
    BatchTable,
    Signatures,
    Footer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    /// Every piece of text in the section, in reading order
    pub fn text_content(&self) -> Vec<String> {
        let mut out = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => out.push(p.text.clone()),
                Block::Table(table) => {
                    for cell in table.rows.iter().flat_map(|r| &r.cells) {
                        if let CellContent::Text(paragraphs) = &cell.content {
                            out.extend(paragraphs.iter().map(|p| p.text.clone()));
                        }
                    }
                }
                Block::PieChart(chart) => {
                    out.extend(chart.slices.iter().map(|s| s.label.clone()));
                    out.extend(chart.caption.iter().map(|p| p.text.clone()));
                }
                Block::Spacer { .. } | Block::Rule(_) => {}
            }
        }
        out
    }
}

/// A complete report ready for a rendering backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    #[serde(default)]
    pub orientation: Orientation,
    pub margins: Margins,
    /// Diagonal text behind every page
    #[serde(default)]
    pub watermark: Option<String>,
    /// Draw `Page N` at the bottom right of every page
    #[serde(default)]
    pub page_numbers: bool,
    pub sections: Vec<Section>,
}

impl ReportDocument {
    pub fn new(title: impl Into<String>, orientation: Orientation, margins: Margins) -> Self {
        Self {
            title: title.into(),
            orientation,
            margins,
            watermark: None,
            page_numbers: false,
            sections: Vec::new(),
        }
    }

    pub fn page_size(&self) -> PageSize {
        match self.orientation {
            Orientation::Portrait => PageSize::A4,
            Orientation::Landscape => PageSize::A4.landscape(),
        }
    }

    /// Width available to content between the side margins
    pub fn frame_width(&self) -> f64 {
        self.page_size().width - self.margins.left - self.margins.right
    }

    /// First section of the given kind
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_style_merge() {
        let base = TextStyle::new().size(10.0).color(HexColor::BLACK);
        let over = TextStyle::new().bold().color(HexColor::WHITE);
        let merged = base.merge(&over);
        assert_eq!(merged.size, Some(10.0));
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.color, Some(HexColor::WHITE));
        assert_eq!(merged.italic, None);
    }

    #[test]
    fn test_block_json_tags() {
        let block = Block::Spacer { height: 12.0 };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "spacer");

        let block: Block = serde_json::from_str(
            r##"{"type": "paragraph", "text": "Hi", "style": {"bold": true, "color": "#ff0000"}}"##,
        )
        .unwrap();
        match block {
            Block::Paragraph(p) => {
                assert_eq!(p.text, "Hi");
                assert_eq!(p.style.color, Some(HexColor::rgb(0xff, 0, 0)));
            }
            other => panic!("unexpected block {other:?}"),
        }
    }

    #[test]
    fn test_cell_content_json() {
        let cell = Cell::qr_code("http://x/verify/1", 60.0);
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["content"]["qr_code"]["size"], 60.0);
    }

    #[test]
    fn test_text_content_and_section_lookup() {
        let mut section = Section::new(SectionKind::StudentInfo);
        section
            .push(Block::Paragraph(Paragraph::new("STUDENT INFORMATION")))
            .push(Block::Table(
                Table::new(vec![100.0, 200.0])
                    .row(Row::new(vec![Cell::text("Full Name:"), Cell::text("Kavin")])),
            ));

        let mut doc = ReportDocument::new("r", Orientation::Portrait, Margins::all(50.0));
        doc.sections.push(section);

        let info = doc.section(SectionKind::StudentInfo).unwrap();
        assert_eq!(
            info.text_content(),
            vec!["STUDENT INFORMATION", "Full Name:", "Kavin"]
        );
        assert!(doc.section(SectionKind::Footer).is_none());
    }

    #[test]
    fn test_page_geometry() {
        let doc = ReportDocument::new("r", Orientation::Landscape, Margins::all(30.0));
        assert!(doc.page_size().width > doc.page_size().height);
        assert!((doc.frame_width() - (PageSize::A4.height - 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_document_json_round_trip() {
        let mut doc = ReportDocument::new("r", Orientation::Portrait, Margins::all(50.0));
        doc.watermark = Some("W".to_string());
        let mut section = Section::new(SectionKind::Title);
        section.push(Block::Rule(Rule {
            thickness: 3.0,
            color: HexColor::BLACK,
            width: None,
        }));
        doc.sections.push(section);

        let back = ReportDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }
}
