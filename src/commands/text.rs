use crate::error::Result;
use crate::pdf::text::{extract_all_text, extract_pages};
use crate::pdf::PdfDocument;
use std::io::Write;

/// Write the text of every page, unmarked and unseparated
pub fn run_all<W: Write + ?Sized>(doc: &PdfDocument, out: &mut W) -> Result<()> {
    let text = extract_all_text(doc)?;
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Write each selected page under a "Content of page N:" header
pub fn run_pages<W, D>(doc: &PdfDocument, pages: &[u32], out: &mut W, diag: &mut D) -> Result<()>
where
    W: Write + ?Sized,
    D: Write + ?Sized,
{
    for page in extract_pages(doc, pages, diag)? {
        writeln!(out, "Content of page {}:", page.page)?;
        out.write_all(page.text.as_bytes())?;
        out.write_all(b"\n\n")?;
    }
    Ok(())
}
