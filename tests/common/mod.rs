#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// One page of a generated test document.
#[derive(Default)]
pub struct FixturePage {
    pub text: Option<String>,
    pub images: Vec<Stream>,
}

impl FixturePage {
    pub fn text(text: &str) -> Self {
        FixturePage {
            text: Some(text.to_string()),
            images: Vec::new(),
        }
    }

    pub fn images(images: Vec<Stream>) -> Self {
        FixturePage {
            text: None,
            images,
        }
    }
}

pub fn image_stream(color_space: &str, width: i64, height: i64, samples: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
        },
        samples,
    )
}

/// Build a document with one page per fixture. Each page carries its own
/// resources unless `inherit_resources` is set, in which case the page
/// tree root holds the resources of the first page and pages have none.
pub fn build_document(pages: Vec<FixturePage>, inherit_resources: bool) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids = Vec::new();
    let mut root_resources: Option<Dictionary> = None;

    for page in pages {
        let mut xobjects = Dictionary::new();
        for (i, image) in page.images.into_iter().enumerate() {
            let image_id = doc.add_object(image);
            xobjects.set(format!("Im{}", i + 1), image_id);
        }
        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => xobjects,
        };

        let content = match &page.text {
            Some(text) => format!("BT /F1 24 Tf 72 720 Td ({}) Tj ET", text),
            None => String::new(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        if inherit_resources {
            root_resources.get_or_insert(resources);
        } else {
            page_dict.set("Resources", resources);
        }
        kids.push(Object::Reference(doc.add_object(page_dict)));
    }

    let mut pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    if let Some(resources) = root_resources {
        pages_dict.set("Resources", resources);
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn write_document(dir: &Path, name: &str, mut doc: Document) -> PathBuf {
    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

pub fn write_pdf(dir: &Path, name: &str, pages: Vec<FixturePage>) -> PathBuf {
    write_document(dir, name, build_document(pages, false))
}

/// A document whose pages each contain a single distinct line of text
pub fn text_pdf(dir: &Path, name: &str, page_count: u32) -> PathBuf {
    let pages = (1..=page_count)
        .map(|n| FixturePage::text(&format!("Sample text on page {}", n)))
        .collect();
    write_pdf(dir, name, pages)
}
