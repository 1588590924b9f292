use crate::error::Result;
use crate::pdf::image::{encode_png, extract_image};
use crate::pdf::PdfDocument;
use std::io::Write;
use tracing::info;

pub fn run<W, D>(
    doc: &PdfDocument,
    page: u32,
    index: u32,
    invert: bool,
    out: &mut W,
    diag: &mut D,
) -> Result<()>
where
    W: Write + ?Sized,
    D: Write + ?Sized,
{
    // Not-found has already been reported by the extractor
    let Some(image) = extract_image(doc, page, index, invert, diag)? else {
        return Ok(());
    };

    let png = encode_png(&image)?;
    info!(
        page,
        index,
        width = image.width(),
        height = image.height(),
        bytes = png.len(),
        "writing PNG"
    );
    out.write_all(&png)?;
    Ok(())
}
