//! Extract page text and embedded images from PDF documents.

pub mod commands;
pub mod error;
pub mod page_range;
pub mod pdf;

pub use error::{Error, Result};
