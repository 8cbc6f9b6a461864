//! In-memory page arena
//!
//! Pages are plain operation lists indexed by page number, so any earlier page
//! can still be written after later ones exist. The PDF object graph is built
//! once, in [`PageArena::linearize`], after all content is final.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::RenderError;
use crate::photo::PdfImage;
use crate::text::{encode_win_ansi, Font, PT_PER_MM};

/// Handle to an image registered in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageId(usize);

impl ImageId {
    /// XObject resource name, e.g. `Im1`
    pub fn resource_name(&self) -> String {
        format!("Im{}", self.0 + 1)
    }
}

/// Content of a single page
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    operations: Vec<Operation>,
    images: BTreeSet<ImageId>,
}

impl PageContent {
    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn extend(&mut self, operations: impl IntoIterator<Item = Operation>) {
        self.operations.extend(operations);
    }

    pub fn use_image(&mut self, id: ImageId) {
        self.images.insert(id);
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Metadata written to the document `/Info` dictionary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct PageArena {
    pages: Vec<PageContent>,
    images: Vec<PdfImage>,
}

impl PageArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty page and return its 1-based number
    pub fn add_page(&mut self) -> u32 {
        self.pages.push(PageContent::default());
        self.pages.len() as u32
    }

    pub fn page(&self, number: u32) -> Option<&PageContent> {
        number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
    }

    pub fn page_mut(&mut self, number: u32) -> Result<&mut PageContent, RenderError> {
        number
            .checked_sub(1)
            .and_then(|index| self.pages.get_mut(index as usize))
            .ok_or(RenderError::PageOutOfRange(number))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn add_image(&mut self, image: PdfImage) -> ImageId {
        self.images.push(image);
        ImageId(self.images.len() - 1)
    }

    pub fn image(&self, id: ImageId) -> Option<&PdfImage> {
        self.images.get(id.0)
    }

    /// Serialize all pages, in page-number order, into a PDF
    ///
    /// `width` and `height` are the page size in millimetres.
    pub fn linearize(
        self,
        width: f64,
        height: f64,
        info: &DocumentInfo,
    ) -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let mut font_dict = dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
            };
            if font.uses_win_ansi() {
                font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            }
            let font_id = doc.add_object(font_dict);
            fonts.set(font.resource_name(), Object::Reference(font_id));
        }

        let image_ids: Vec<ObjectId> = self
            .images
            .into_iter()
            .map(|image| {
                let dict = dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width as i64,
                    "Height" => image.height as i64,
                    "ColorSpace" => image.color_space,
                    "BitsPerComponent" => image.bits_per_component as i64,
                    "Filter" => image.filter,
                };
                doc.add_object(Stream::new(dict, image.data))
            })
            .collect();

        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real((width * PT_PER_MM) as f32),
            Object::Real((height * PT_PER_MM) as f32),
        ];

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let content = Content {
                operations: page.operations,
            };
            let encoded = content
                .encode()
                .map_err(|e| RenderError::DocumentError(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

            let mut resources = Dictionary::new();
            resources.set("Font", Object::Dictionary(fonts.clone()));
            if !page.images.is_empty() {
                let mut xobjects = Dictionary::new();
                for id in &page.images {
                    let object_id = image_ids
                        .get(id.0)
                        .copied()
                        .ok_or_else(|| RenderError::DocumentError(format!("unknown image {}", id.0)))?;
                    xobjects.set(id.resource_name(), Object::Reference(object_id));
                }
                resources.set("XObject", Object::Dictionary(xobjects));
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => media_box.clone(),
                "Contents" => Object::Reference(content_id),
                "Resources" => resources,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let info_id = doc.add_object(info_dictionary(info));
        doc.trailer.set("Info", Object::Reference(info_id));

        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::DocumentError(format!("Failed to save report: {}", e)))?;
        Ok(buffer)
    }
}

fn info_dictionary(info: &DocumentInfo) -> Dictionary {
    let text = |s: &str| Object::String(encode_win_ansi(s), StringFormat::Literal);

    let mut dict = Dictionary::new();
    dict.set("Title", text(&info.title));
    if !info.author.is_empty() {
        dict.set("Author", text(&info.author));
    }
    if !info.subject.is_empty() {
        dict.set("Subject", text(&info.subject));
    }
    dict.set(
        "Producer",
        text(concat!("report-core ", env!("CARGO_PKG_VERSION"))),
    );
    // Derived from the inspection date, not the clock, so renders are reproducible
    if let Some(date) = info.creation_date {
        dict.set(
            "CreationDate",
            text(&format!("D:{}000000", date.format("%Y%m%d"))),
        );
    }
    dict
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_op(s: &str) -> Operation {
        Operation::new(
            "Tj",
            vec![Object::String(s.as_bytes().to_vec(), StringFormat::Literal)],
        )
    }

    #[test]
    fn test_page_numbers_are_one_based() {
        let mut arena = PageArena::new();
        assert_eq!(arena.add_page(), 1);
        assert_eq!(arena.add_page(), 2);
        assert!(arena.page(0).is_none());
        assert!(arena.page(2).is_some());
        assert_eq!(arena.page_mut(3).unwrap_err(), RenderError::PageOutOfRange(3));
    }

    #[test]
    fn test_earlier_page_can_be_written_later() {
        let mut arena = PageArena::new();
        arena.add_page();
        arena.add_page();
        arena.page_mut(2).unwrap().push(text_op("second"));
        arena.page_mut(1).unwrap().push(text_op("first"));
        assert_eq!(arena.page(1).unwrap().operations().len(), 1);
        assert_eq!(arena.page(2).unwrap().operations().len(), 1);
    }

    #[test]
    fn test_linearize_produces_loadable_pdf() {
        let mut arena = PageArena::new();
        for _ in 0..3 {
            arena.add_page();
        }
        arena.page_mut(1).unwrap().extend(vec![
            Operation::new("BT", vec![]),
            text_op("hello"),
            Operation::new("ET", vec![]),
        ]);

        let bytes = arena
            .linearize(210.0, 297.0, &DocumentInfo::default())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_linearize_is_deterministic() {
        let build = || {
            let mut arena = PageArena::new();
            arena.add_page();
            arena.page_mut(1).unwrap().push(text_op("same"));
            arena
                .linearize(
                    210.0,
                    297.0,
                    &DocumentInfo {
                        title: "Report".to_string(),
                        creation_date: NaiveDate::from_ymd_opt(2024, 1, 2),
                        ..DocumentInfo::default()
                    },
                )
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_images_are_registered_per_page() {
        let mut arena = PageArena::new();
        arena.add_page();
        let id = arena.add_image(PdfImage {
            width: 1,
            height: 1,
            color_space: "DeviceRGB",
            bits_per_component: 8,
            filter: "FlateDecode",
            data: vec![0x78, 0x9C, 0x63, 0x60, 0x60, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01],
        });
        assert_eq!(id.resource_name(), "Im1");
        arena.page_mut(1).unwrap().use_image(id);

        let bytes = arena
            .linearize(210.0, 297.0, &DocumentInfo::default())
            .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = doc.get_pages()[&1];
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert!(xobjects.get(b"Im1").is_ok());
    }
}
