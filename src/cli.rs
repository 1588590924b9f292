use clap::Parser;
use pdf_slurp::commands::Options;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdf-slurp")]
#[command(about = "Extract page text and embedded images from a PDF")]
#[command(version)]
pub struct Cli {
    /// PDF file to read
    pub pdf_path: PathBuf,

    /// Page numbers to extract (e.g., "1-5,7,10")
    #[arg(short, long, value_name = "SELECTOR")]
    pub pages: Option<String>,

    /// Image number to extract from the first selected page, written as PNG
    #[arg(short, long, value_name = "N")]
    pub image: Option<u32>,

    /// Invert the colors of the extracted image
    #[arg(short = 'v', long)]
    pub invert: bool,

    /// Extract the text of all pages, ignoring --pages
    #[arg(short, long)]
    pub all_pages: bool,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            pages: self.pages.clone(),
            image: self.image,
            invert: self.invert,
            all_pages: self.all_pages,
        }
    }
}
