//! PDF export of paginated documents.
//!
//! [`DocumentWriter`] collects flushed page images together with their
//! overlays and turns them into a PDF. Overlays are drawn in page coordinates
//! on top of the page image; they never take part in layout.
//!
//! # Example
//!
//! ```no_run
//! use slicepdf::model::{Metadata, PageGeometry};
//! use slicepdf::layout::PageAccumulator;
//! use slicepdf::writer::DocumentWriter;
//!
//! fn main() -> slicepdf::Result<()> {
//!     let geometry = PageGeometry::a4();
//!     let mut page = PageAccumulator::new(geometry, 2.0)?;
//!     let mut writer = DocumentWriter::new(geometry, Metadata::default());
//!
//!     writer.add_page(page.flush()?);
//!     writer.add_title_overlay("Practice Questions")?;
//!     writer.add_page_number(1)?;
//!
//!     std::fs::write("blank.pdf", writer.export()?)?;
//!     Ok(())
//! }
//! ```

mod fonts;

pub use fonts::{encode_win_ansi, StandardFont};

use crate::error::{Error, Result};
use crate::model::{Decoration, Document, Metadata, Page, PageGeometry, PageImage};
use crate::units::PageUnits;
use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, ObjectId, Stream, StringFormat};
use std::path::Path;

/// Title font size in points.
const TITLE_SIZE: f32 = 16.0;
/// Distance from the top edge to the title baseline, beyond the margin.
const TITLE_OFFSET: f32 = 20.0;
/// Times-Bold descender depth per point of font size.
const TITLE_DESCENT: f32 = 0.217;
/// Page number font size in points.
const PAGE_NUMBER_SIZE: f32 = 8.0;
/// Distance from the bottom edge to the page number baseline.
const PAGE_NUMBER_BASELINE: f32 = 10.0;

/// Depth below the top of the content area that the title's glyphs reach.
///
/// Content placed above this line on the first page is overdrawn by the
/// title, so `title_reserve` should be at least this large.
pub fn title_clearance() -> PageUnits {
    PageUnits(TITLE_OFFSET + TITLE_DESCENT * TITLE_SIZE)
}

/// Builds a [`Document`] page by page and exports it.
#[derive(Debug)]
pub struct DocumentWriter {
    document: Document,
}

impl DocumentWriter {
    /// Create a writer for pages of the given geometry.
    pub fn new(geometry: PageGeometry, metadata: Metadata) -> Self {
        Self {
            document: Document::new(geometry, metadata),
        }
    }

    /// Append a page image and return its page number.
    pub fn add_page(&mut self, image: PageImage) -> u32 {
        let number = self.document.page_count() + 1;
        self.document.pages.push(Page::new(number, image));
        number
    }

    /// Put the title on the first page.
    ///
    /// Only valid while the document holds exactly one page.
    pub fn add_title_overlay(&mut self, text: impl Into<String>) -> Result<()> {
        let count = self.document.page_count();
        if count != 1 {
            return Err(Error::InvalidOverlay(format!(
                "title belongs on the first page, document has {} pages",
                count
            )));
        }
        let text = text.into();
        if self.document.metadata.title.is_none() {
            self.document.metadata.title = Some(text.clone());
        }
        self.document.pages[0]
            .decorations
            .push(Decoration::Title(text));
        Ok(())
    }

    /// Put a page number on the most recently added page.
    pub fn add_page_number(&mut self, number: u32) -> Result<()> {
        let page = self
            .document
            .pages
            .last_mut()
            .ok_or_else(|| Error::InvalidOverlay("no page to number".to_string()))?;
        page.decorations.push(Decoration::PageNumber(number));
        Ok(())
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> u32 {
        self.document.page_count()
    }

    /// The document built so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Finalize into the document.
    pub fn finish(self) -> Document {
        self.document
    }

    /// Export the pages built so far as PDF bytes.
    pub fn export(&self) -> Result<Vec<u8>> {
        render_pdf(&self.document)
    }
}

impl Document {
    /// Export as PDF bytes.
    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>> {
        render_pdf(self)
    }

    /// Export as a PDF file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_pdf_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn render_pdf(document: &Document) -> Result<Vec<u8>> {
    let geometry = document.geometry;
    let mut pdf = lopdf::Document::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let font_ids: Vec<(StandardFont, ObjectId)> =
        [StandardFont::TimesRoman, StandardFont::TimesBold]
            .into_iter()
            .map(|font| {
                let id = pdf.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_font(),
                    "Encoding" => "WinAnsiEncoding",
                });
                (font, id)
            })
            .collect();
    let mut fonts = lopdf::Dictionary::new();
    for (font, id) in &font_ids {
        fonts.set(font.resource_name(), *id);
    }

    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let image = &page.image;
        let image_id = pdf.add_object(
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(image.width),
                    "Height" => i64::from(image.height),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                image.data.clone(),
            )
            .with_compression(false),
        );

        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    geometry.page_width.into(),
                    0.into(),
                    0.into(),
                    geometry.page_height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ];
        for decoration in &page.decorations {
            operations.extend(decoration_ops(decoration, &geometry));
        }
        let content = Content { operations };
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => fonts.clone(),
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(geometry.page_width),
                Object::Real(geometry.page_height),
            ],
        }),
    );

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "Lang" => Object::string_literal(document.metadata.language.code()),
    });
    pdf.trailer.set("Root", catalog_id);

    let info_id = pdf.add_object(info_dictionary(&document.metadata));
    pdf.trailer.set("Info", info_id);
    pdf.compress();

    let mut buffer = Vec::new();
    pdf.save_to(&mut buffer)?;
    log::debug!(
        "exported {} pages ({} bytes)",
        document.page_count(),
        buffer.len()
    );
    Ok(buffer)
}

fn decoration_ops(decoration: &Decoration, geometry: &PageGeometry) -> Vec<Operation> {
    let (font, size, text, baseline) = match decoration {
        Decoration::Title(title) => (
            StandardFont::TimesBold,
            TITLE_SIZE,
            title.clone(),
            geometry.page_height - (geometry.margin + TITLE_OFFSET),
        ),
        Decoration::PageNumber(n) => (
            StandardFont::TimesRoman,
            PAGE_NUMBER_SIZE,
            format!("-{}-", n),
            PAGE_NUMBER_BASELINE,
        ),
    };

    let (encoded, replaced) = encode_win_ansi(&text);
    if replaced > 0 {
        log::warn!(
            "{} characters of {:?} cannot be shown in {} and were replaced",
            replaced,
            text,
            font.base_font()
        );
    }
    let x = (geometry.page_width - font.text_width(&encoded, size)) / 2.0;

    vec![
        Operation::new("BT", vec![]),
        Operation::new("g", vec![0.into()]),
        Operation::new(
            "Tf",
            vec![Object::Name(font.resource_name().as_bytes().to_vec()), size.into()],
        ),
        Operation::new("Td", vec![x.into(), baseline.into()]),
        Operation::new("Tj", vec![Object::String(encoded, StringFormat::Literal)]),
        Operation::new("ET", vec![]),
    ]
}

fn info_dictionary(metadata: &Metadata) -> lopdf::Dictionary {
    let created = metadata.created.unwrap_or_else(Utc::now);
    let producer = metadata
        .producer
        .clone()
        .unwrap_or_else(|| format!("slicepdf {}", env!("CARGO_PKG_VERSION")));

    let mut info = dictionary! {
        "Producer" => Object::string_literal(producer),
        "CreationDate" => Object::string_literal(pdf_date(&created)),
    };
    if let Some(ref title) = metadata.title {
        info.set("Title", text_string(title));
    }
    info
}

/// PDF date string, e.g. `D:20240131120000Z`.
fn pdf_date(date: &DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// PDF text string: plain literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageAccumulator, PaginateOptions};
    use chrono::TimeZone;

    fn blank_image() -> PageImage {
        PageAccumulator::new(PageGeometry::new(60.0, 80.0, 10.0), 1.0)
            .unwrap()
            .flush()
            .unwrap()
    }

    #[test]
    fn test_title_only_on_first_page() {
        let mut writer = DocumentWriter::new(PageGeometry::a4(), Metadata::default());
        assert!(matches!(
            writer.add_title_overlay("Early"),
            Err(Error::InvalidOverlay(_))
        ));

        writer.add_page(blank_image());
        writer.add_title_overlay("Questions").unwrap();
        assert_eq!(writer.document().metadata.title.as_deref(), Some("Questions"));

        writer.add_page(blank_image());
        assert!(writer.add_title_overlay("Late").is_err());
    }

    #[test]
    fn test_page_number_needs_page() {
        let mut writer = DocumentWriter::new(PageGeometry::a4(), Metadata::default());
        assert!(writer.add_page_number(1).is_err());

        assert_eq!(writer.add_page(blank_image()), 1);
        assert_eq!(writer.add_page(blank_image()), 2);
        writer.add_page_number(2).unwrap();

        let doc = writer.finish();
        assert_eq!(doc.pages[0].page_number(), None);
        assert_eq!(doc.pages[1].page_number(), Some(2));
    }

    #[test]
    fn test_export_loads_back() {
        let geometry = PageGeometry::new(60.0, 80.0, 10.0);
        let mut writer = DocumentWriter::new(geometry, Metadata::default());
        writer.add_page(blank_image());
        writer.add_title_overlay("Title (draft)").unwrap();
        writer.add_page_number(1).unwrap();
        writer.add_page(blank_image());
        writer.add_page_number(2).unwrap();

        let bytes = writer.export().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let loaded = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 2);
    }

    #[test]
    fn test_title_clearance_matches_baseline() {
        let geometry = PageGeometry::a4();
        let ops = decoration_ops(&Decoration::Title("Questions".to_string()), &geometry);
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        let baseline = td.operands[1].as_float().unwrap();

        // Baseline measured down from the top of the content area
        let depth = geometry.page_height - geometry.margin - baseline;
        assert!(title_clearance().get() > depth);
        assert!(PaginateOptions::default().title_reserve >= title_clearance().get());
    }

    #[test]
    fn test_pdf_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 31, 12, 5, 9).unwrap();
        assert_eq!(pdf_date(&date), "D:20240131120509Z");
    }

    #[test]
    fn test_text_string_utf16_for_non_ascii() {
        match text_string("문제") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(bytes.len(), 6);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            text_string("Plain"),
            Object::String(_, StringFormat::Literal)
        ));
    }
}
