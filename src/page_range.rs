use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// One comma-separated segment of a page selector: either a single page or
/// an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl PageRange {
    /// Parse a segment like "7" or "1-5"
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty segment".to_string());
        }

        if let Some((start_str, end_str)) = s.split_once('-') {
            // "-5" would otherwise be read as an open-ended range
            if start_str.trim().is_empty() || end_str.trim().is_empty() {
                return Err(format!("incomplete range {:?}", s));
            }

            let start = parse_page_number(start_str)?;
            let end = parse_page_number(end_str)?;

            Ok(PageRange {
                start,
                end: Some(end),
            })
        } else {
            let page = parse_page_number(s)?;
            Ok(PageRange {
                start: page,
                end: None,
            })
        }
    }

    /// Expand this segment into 1-based page numbers.
    ///
    /// A reversed range such as "5-2" selects nothing.
    pub fn expand(&self) -> impl Iterator<Item = u32> {
        let end = self.end.unwrap_or(self.start);
        self.start..=end
    }
}

fn parse_page_number(s: &str) -> std::result::Result<u32, String> {
    let s = s.trim();
    match s.parse::<u32>() {
        Ok(0) => Err("page numbers start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid page number {:?}", s)),
    }
}

/// Parse a comma-separated list of page ranges like "1-5,7,10"
pub fn parse_page_ranges(s: &str) -> Result<Vec<PageRange>> {
    s.split(',')
        .map(|part| PageRange::parse(part).map_err(|reason| Error::invalid_format(s, reason)))
        .collect()
}

/// Parse a page selector into an ascending list of unique 1-based page numbers.
///
/// No upper bound is checked here; pages past the end of the document are
/// reported by the extractors.
pub fn parse_page_selector(s: &str) -> Result<Vec<u32>> {
    let pages: BTreeSet<u32> = parse_page_ranges(s)?
        .iter()
        .flat_map(PageRange::expand)
        .collect();
    Ok(pages.into_iter().collect())
}
