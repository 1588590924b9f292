pub mod document;
pub mod image;
pub mod text;

pub use document::PdfDocument;
