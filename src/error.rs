use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The page selector could not be parsed.
    #[error("Invalid page selector {selector:?}: {reason}")]
    InvalidFormat { selector: String, reason: String },

    /// The source document is missing, unreadable, or not a PDF.
    #[error("Failed to open PDF: {}", path.display())]
    DocumentOpen {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to extract text from PDF: {0}")]
    TextExtraction(String),

    /// An embedded image could not be decoded, or the output could not be encoded.
    #[error("Failed to decode image: {0}")]
    Codec(String),

    #[error("Nothing to extract: pass --all-pages, or --pages (optionally with --image)")]
    NoRequest,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_format(selector: &str, reason: impl Into<String>) -> Self {
        Error::InvalidFormat {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Codec(err.to_string())
    }
}
