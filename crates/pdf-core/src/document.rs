//! PDF document writer

use crate::font::FontObjects;
use crate::graphics::{paint_operators, LineStyle, Path};
use crate::image::{
    calculate_scaled_dimensions, generate_image_operators, ImageScaleMode, ImageXObject,
};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{fmt_num, Align, FontData, FontFamily, FontFamilyBuilder, PdfError, Result};
use crate::{FontStyle, FontWeight, StandardFont, STANDARD_FAMILY};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::io::Write;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }

    /// Mid grey (#808080)
    pub fn gray() -> Self {
        Self::from_rgb(0x80, 0x80, 0x80)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// A4 portrait, 595.28 x 841.89 points
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Same size with width and height swapped so that width is the longer side
    pub fn landscape(self) -> Self {
        Self {
            width: self.width.max(self.height),
            height: self.width.min(self.height),
        }
    }
}

/// Font selected for a text run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FontKey {
    Standard(StandardFont),
    Embedded(String),
}

/// PDF document built page by page
///
/// Content is buffered per page and the lopdf object graph is assembled
/// only when the document is saved, so a document can be written more
/// than once.
pub struct PdfDocument {
    title: Option<String>,
    /// Page sizes, index 0 is page 1
    pages: Vec<PageSize>,
    /// Registered TrueType font families
    font_families: HashMap<String, FontFamily>,
    current_family: Option<String>,
    current_weight: FontWeight,
    current_style: FontStyle,
    current_font_size: f32,
    current_text_color: Color,
    /// Fill opacity applied to subsequent text and shapes
    current_opacity: f32,
    /// Document-wide font resource names (font -> "F1")
    font_resources: HashMap<FontKey, String>,
    next_font_resource: u32,
    /// Fonts referenced by each page (page number -> resource names)
    page_font_resources: HashMap<usize, BTreeSet<String>>,
    /// Embedded images (data hash -> resource name, XObject)
    embedded_images: HashMap<u64, (String, ImageXObject)>,
    next_image_resource: u32,
    page_image_resources: HashMap<usize, BTreeSet<String>>,
    /// Graphics states for opacity (alpha in 1/1000 -> "GS1")
    opacity_states: HashMap<u32, String>,
    page_gstate_resources: HashMap<usize, BTreeSet<String>>,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with no pages
    ///
    /// The built-in `helvetica` family is always available.
    pub fn new() -> Self {
        Self {
            title: None,
            pages: Vec::new(),
            font_families: HashMap::new(),
            current_family: None,
            current_weight: FontWeight::Regular,
            current_style: FontStyle::Normal,
            current_font_size: 12.0,
            current_text_color: Color::black(),
            current_opacity: 1.0,
            font_resources: HashMap::new(),
            next_font_resource: 1,
            page_font_resources: HashMap::new(),
            embedded_images: HashMap::new(),
            next_image_resource: 1,
            page_image_resources: HashMap::new(),
            opacity_states: HashMap::new(),
            page_gstate_resources: HashMap::new(),
            page_content_buffer: HashMap::new(),
        }
    }

    /// Set the document title written to the Info dictionary
    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    /// Append a page and return its number (1-indexed)
    pub fn add_page(&mut self, size: PageSize) -> usize {
        self.pages.push(size);
        self.pages.len()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Size of a page (1-indexed)
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        self.check_page(page)?;
        Ok(self.pages[page - 1])
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page == 0 || page > self.pages.len() {
            return Err(PdfError::InvalidPage(page, self.pages.len()));
        }
        Ok(())
    }

    /// Register a TrueType font family
    ///
    /// # Example
    /// ```ignore
    /// doc.register_font_family("noto", FontFamilyBuilder::new().regular(data))?;
    /// doc.set_font("noto", 12.0)?;
    /// ```
    pub fn register_font_family(&mut self, name: &str, builder: FontFamilyBuilder) -> Result<()> {
        if name == STANDARD_FAMILY || self.font_families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        let family = builder.build(name)?;
        log::debug!("registered font family {name}");
        self.font_families.insert(name.to_string(), family);

        Ok(())
    }

    /// Whether a family name can be passed to [`PdfDocument::set_font`]
    pub fn has_font_family(&self, family: &str) -> bool {
        family == STANDARD_FAMILY || self.font_families.contains_key(family)
    }

    /// Set the current font family and size
    pub fn set_font(&mut self, family: &str, size: f32) -> Result<()> {
        if !self.has_font_family(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }

        self.current_family = Some(family.to_string());
        self.current_font_size = size;

        Ok(())
    }

    /// Set the font weight (keeps current family/size/style)
    pub fn set_font_weight(&mut self, weight: FontWeight) -> Result<()> {
        if self.current_family.is_none() {
            return Err(PdfError::FontNotFound("No font family set".to_string()));
        }

        self.current_weight = weight;
        Ok(())
    }

    /// Set the font style (keeps current family/size/weight)
    pub fn set_font_style(&mut self, style: FontStyle) -> Result<()> {
        if self.current_family.is_none() {
            return Err(PdfError::FontNotFound("No font family set".to_string()));
        }

        self.current_style = style;
        Ok(())
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Set the fill opacity (0.0 - 1.0) for subsequent text and shapes
    pub fn set_opacity(&mut self, opacity: f32) {
        self.current_opacity = opacity.clamp(0.0, 1.0);
    }

    fn current_font_key(&self) -> Result<FontKey> {
        let family_name = self
            .current_family
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;

        if family_name == STANDARD_FAMILY {
            return Ok(FontKey::Standard(StandardFont::for_variant(
                self.current_weight,
                self.current_style,
            )));
        }

        let family = self
            .font_families
            .get(family_name)
            .ok_or_else(|| PdfError::FontNotFound(family_name.clone()))?;
        let variant = family
            .get_variant(self.current_weight, self.current_style)
            .ok_or_else(|| PdfError::FontNotFound(family_name.clone()))?;

        Ok(FontKey::Embedded(variant.name.clone()))
    }

    fn font_data(&self, name: &str) -> Result<&FontData> {
        self.font_families
            .values()
            .flat_map(|family| family.variants())
            .find(|variant| variant.name == name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))
    }

    fn measure(&self, key: &FontKey, text: &str, size: f32) -> Result<f64> {
        let width = match key {
            FontKey::Standard(font) => font.text_width_points(text, size),
            FontKey::Embedded(name) => self.font_data(name)?.text_width_points(text, size),
        };
        Ok(width as f64)
    }

    /// Width of `text` in points using the current font settings
    ///
    /// # Example
    /// ```ignore
    /// doc.set_font("helvetica", 12.0)?;
    /// let width = doc.get_text_width("Hello")?;
    /// ```
    pub fn get_text_width(&self, text: &str) -> Result<f64> {
        let key = self.current_font_key()?;
        self.measure(&key, text, self.current_font_size)
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points (from top)
    /// * `align` - Alignment relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.insert_text_rotated(text, page, x, y, align, 0.0)
    }

    /// Insert text rotated counter-clockwise by `degrees` around `(x, y)`
    pub fn insert_text_rotated(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
        degrees: f64,
    ) -> Result<()> {
        self.check_page(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let key = self.current_font_key()?;
        let text_width = self.measure(&key, text, self.current_font_size)?;

        let encoded = match &key {
            FontKey::Standard(_) => StandardFont::encode_literal(text),
            FontKey::Embedded(name) => {
                let font = self
                    .font_families
                    .values_mut()
                    .find_map(|family| family.variant_by_name_mut(name))
                    .ok_or_else(|| PdfError::FontNotFound(name.clone()))?;
                font.add_chars(text);
                font.encode_text_hex(text)
            }
        };

        let font_name = self.get_or_create_font_ref(key, page);
        let ctx = TextRenderContext {
            font_name,
            font_size: self.current_font_size,
            text_width,
            color: self.current_text_color,
            rotation: degrees,
        };

        let pdf_y = self.pages[page - 1].height - y;
        let operators = generate_text_operators(&encoded, x, pdf_y, align, &ctx);
        self.buffer_with_opacity(page, &operators);

        Ok(())
    }

    /// Fill a rectangle whose top-left corner is at `(x, y)`
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        self.draw_path(page, &Path::rect(x, y, width, height), Some(color), None)
    }

    /// Stroke the outline of a rectangle whose top-left corner is at `(x, y)`
    pub fn stroke_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: LineStyle,
    ) -> Result<()> {
        self.draw_path(page, &Path::rect(x, y, width, height), None, Some(style))
    }

    /// Draw a straight line
    pub fn line(
        &mut self,
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        style: LineStyle,
    ) -> Result<()> {
        let path = Path::new().move_to(from.0, from.1).line_to(to.0, to.1);
        self.draw_path(page, &path, None, Some(style))
    }

    /// Fill and/or stroke an arbitrary path
    pub fn draw_path(
        &mut self,
        page: usize,
        path: &Path,
        fill: Option<Color>,
        stroke: Option<LineStyle>,
    ) -> Result<()> {
        self.check_page(page)?;
        let page_height = self.pages[page - 1].height;
        let operators = paint_operators(path, page_height, fill, stroke);
        self.buffer_with_opacity(page, &operators);
        Ok(())
    }

    /// Insert an image stretched to `width` x `height`
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x`, `y` - Top-left corner in points (from top)
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.insert_image_scaled(data, page, x, y, width, height, ImageScaleMode::Stretch)
            .map(|_| ())
    }

    /// Insert an image with scaling mode
    ///
    /// Returns the size the image was drawn at.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image_scaled(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<(f64, f64)> {
        self.check_page(page)?;

        let (resource_name, orig_width, orig_height) = self.get_or_create_image_ref(data, page)?;

        let (actual_width, actual_height) =
            calculate_scaled_dimensions(orig_width, orig_height, width, height, mode);

        let pdf_y = self.pages[page - 1].height - y - actual_height;
        let operators =
            generate_image_operators(&resource_name, x, pdf_y, actual_width, actual_height);
        self.buffer_content(page, &operators);

        Ok((actual_width, actual_height))
    }

    /// Resource name for a font on a page, allocating one if needed
    fn get_or_create_font_ref(&mut self, key: FontKey, page: usize) -> String {
        let next = &mut self.next_font_resource;
        let name = self
            .font_resources
            .entry(key)
            .or_insert_with(|| {
                let name = format!("F{next}");
                *next += 1;
                name
            })
            .clone();

        self.page_font_resources
            .entry(page)
            .or_default()
            .insert(name.clone());
        name
    }

    /// Resource name and pixel size of an image, embedding it once per
    /// distinct byte content
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<(String, u32, u32)> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if !self.embedded_images.contains_key(&data_hash) {
            let xobject = ImageXObject::from_bytes(data)?;
            let name = format!("Im{}", self.next_image_resource);
            self.next_image_resource += 1;
            self.embedded_images.insert(data_hash, (name, xobject));
        }

        let (name, xobject) = &self.embedded_images[&data_hash];
        let result = (name.clone(), xobject.width, xobject.height);

        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(result.0.clone());

        Ok(result)
    }

    fn buffer_with_opacity(&mut self, page: usize, operators: &[u8]) {
        if self.current_opacity >= 1.0 {
            self.buffer_content(page, operators);
            return;
        }

        let key = (self.current_opacity * 1000.0).round() as u32;
        let next_id = self.opacity_states.len() + 1;
        let gs_name = self
            .opacity_states
            .entry(key)
            .or_insert_with(|| format!("GS{next_id}"))
            .clone();
        self.page_gstate_resources
            .entry(page)
            .or_default()
            .insert(gs_name.clone());

        let mut wrapped = format!("q\n/{gs_name} gs\n").into_bytes();
        wrapped.extend_from_slice(operators);
        wrapped.extend_from_slice(b"Q\n");
        self.buffer_content(page, &wrapped);
    }

    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Save the document to a file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let mut document = self.build()?;
        document
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut document = self.build()?;
        let mut buffer = Vec::new();
        document
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Assemble the lopdf object graph from the buffered state
    fn build(&self) -> Result<Document> {
        if self.pages.is_empty() {
            return Err(PdfError::SaveError("document has no pages".to_string()));
        }

        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        let mut font_ids: HashMap<&str, ObjectId> = HashMap::new();
        for (key, resource) in &self.font_resources {
            let id = match key {
                FontKey::Standard(font) => document.add_object(font.to_pdf_dictionary()),
                FontKey::Embedded(name) => {
                    embed_font(&mut document, self.font_data(name)?.to_pdf_objects()?)?
                }
            };
            font_ids.insert(resource.as_str(), id);
        }

        let mut image_ids: HashMap<&str, ObjectId> = HashMap::new();
        for (resource, xobject) in self.embedded_images.values() {
            image_ids.insert(resource.as_str(), document.add_object(xobject.to_pdf_stream()));
        }

        let mut gstate_ids: HashMap<&str, ObjectId> = HashMap::new();
        for (alpha, resource) in &self.opacity_states {
            let alpha = *alpha as f32 / 1000.0;
            let id = document.add_object(dictionary! {
                "Type" => "ExtGState",
                "ca" => Object::Real(alpha),
                "CA" => Object::Real(alpha),
            });
            gstate_ids.insert(resource.as_str(), id);
        }

        let mut kids = Vec::with_capacity(self.pages.len());
        for (index, size) in self.pages.iter().enumerate() {
            let page = index + 1;
            let content = self
                .page_content_buffer
                .get(&page)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let contents_id = document.add_object(flate_stream(Dictionary::new(), content)?);

            let mut resources = Dictionary::new();
            let subdict = |names: Option<&BTreeSet<String>>, ids: &HashMap<&str, ObjectId>| {
                let mut dict = Dictionary::new();
                for name in names.into_iter().flatten() {
                    if let Some(id) = ids.get(name.as_str()) {
                        dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
                    }
                }
                dict
            };
            let fonts = subdict(self.page_font_resources.get(&page), &font_ids);
            if !fonts.is_empty() {
                resources.set("Font", fonts);
            }
            let images = subdict(self.page_image_resources.get(&page), &image_ids);
            if !images.is_empty() {
                resources.set("XObject", images);
            }
            let gstates = subdict(self.page_gstate_resources.get(&page), &gstate_ids);
            if !gstates.is_empty() {
                resources.set("ExtGState", gstates);
            }

            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(size.width as f32),
                    Object::Real(size.height as f32),
                ],
                "Contents" => contents_id,
                "Resources" => resources,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal("pdf-core"),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = document.add_object(info);
        document.trailer.set("Info", info_id);

        log::debug!(
            "built PDF with {} pages, {} fonts, {} images",
            self.pages.len(),
            font_ids.len(),
            image_ids.len()
        );

        Ok(document)
    }
}

/// Add the objects of an embedded TrueType font, wiring up the references
/// between them, and return the Type0 font id
fn embed_font(document: &mut Document, objects: FontObjects) -> Result<ObjectId> {
    let FontObjects {
        mut type0_font,
        mut cid_font,
        mut font_descriptor,
        font_file_stream,
        tounicode_stream,
    } = objects;

    let font_file_id = document.add_object(flate_stream(
        font_file_stream.dict.clone(),
        &font_file_stream.content,
    )?);
    font_descriptor.set("FontFile2", Object::Reference(font_file_id));
    let descriptor_id = document.add_object(font_descriptor);

    cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
    let cid_id = document.add_object(cid_font);

    let tounicode_id = document.add_object(tounicode_stream);

    type0_font.set("DescendantFonts", vec![Object::Reference(cid_id)]);
    type0_font.set("ToUnicode", Object::Reference(tounicode_id));

    Ok(document.add_object(type0_font))
}

/// Flate-compress `content` into a stream carrying the matching filter
fn flate_stream(mut dict: Dictionary, content: &[u8]) -> Result<Stream> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(content)?;
    dict.set("Filter", "FlateDecode");
    Ok(Stream::new(dict, encoder.finish()?).with_compression(false))
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}", fmt_num(self.width), fmt_num(self.height))
    }
}
