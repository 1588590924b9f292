pub mod image;
pub mod text;

use crate::error::{Error, Result};
use crate::page_range::parse_page_selector;
use crate::pdf::PdfDocument;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Extraction flags as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub pages: Option<String>,
    pub image: Option<u32>,
    pub invert: bool,
    pub all_pages: bool,
}

/// What a single run extracts. The variants are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    AllText,
    Pages(Vec<u32>),
    Image { page: u32, index: u32, invert: bool },
}

impl Request {
    pub fn from_options(options: &Options) -> Result<Self> {
        if options.all_pages {
            if options.pages.is_some() || options.image.is_some() {
                warn!("--all-pages given; ignoring --pages and --image");
            }
            return Ok(Request::AllText);
        }

        let Some(selector) = options.pages.as_deref() else {
            return Err(Error::NoRequest);
        };
        let pages = parse_page_selector(selector)?;

        match options.image {
            Some(index) => {
                // Images come from the first selected page only
                let page = *pages
                    .first()
                    .ok_or_else(|| Error::invalid_format(selector, "selects no pages"))?;
                if pages.len() > 1 {
                    warn!(page, "image extraction uses only the first selected page");
                }
                Ok(Request::Image {
                    page,
                    index,
                    invert: options.invert,
                })
            }
            None => Ok(Request::Pages(pages)),
        }
    }
}

/// Open `path` and carry out `request`, writing results to `out` and
/// non-fatal diagnostics to `diag`.
pub fn run<P, O, D>(path: P, request: &Request, out: &mut O, diag: &mut D) -> Result<()>
where
    P: AsRef<Path>,
    O: Write + ?Sized,
    D: Write + ?Sized,
{
    let doc = PdfDocument::open(path)?;

    match request {
        Request::AllText => text::run_all(&doc, out)?,
        Request::Pages(pages) => text::run_pages(&doc, pages, out, diag)?,
        Request::Image {
            page,
            index,
            invert,
        } => image::run(&doc, *page, *index, *invert, out, diag)?,
    }

    out.flush()?;
    Ok(())
}
