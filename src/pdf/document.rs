use crate::error::{Error, Result};
use lopdf::{Dictionary, Document, ObjectId};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A source document opened for one extraction run.
///
/// Holds both the raw bytes (for `pdf-extract`) and the parsed object model
/// (for page and image lookup). Dropping it releases everything.
pub struct PdfDocument {
    pub doc: Document,
    pub bytes: Vec<u8>,
    pub path: PathBuf,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = std::fs::read(&path).map_err(|e| Error::DocumentOpen {
            path: path.clone(),
            source: Box::new(e),
        })?;
        let doc = Document::load_mem(&bytes).map_err(|e| Error::DocumentOpen {
            path: path.clone(),
            source: Box::new(e),
        })?;

        debug!(path = %path.display(), pages = doc.get_pages().len(), "opened PDF");
        Ok(PdfDocument { doc, bytes, path })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    pub fn contains_page(&self, page: u32) -> bool {
        page >= 1 && page <= self.page_count()
    }

    /// Object id of a 1-indexed page
    pub fn page_id(&self, page: u32) -> Option<ObjectId> {
        self.doc.get_pages().get(&page).copied()
    }

    /// Resource dictionary in effect for a page.
    ///
    /// Pages without their own `/Resources` inherit them from the nearest
    /// ancestor in the page tree.
    pub fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node_id = page_id;
        // Bounded walk so a cyclic /Parent chain cannot loop forever
        for _ in 0..64 {
            let node = self.doc.get_dictionary(node_id).ok()?;
            if let Ok(resources) = node.get(b"Resources") {
                return self
                    .doc
                    .dereference(resources)
                    .ok()
                    .and_then(|(_, obj)| obj.as_dict().ok());
            }
            node_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }
}
