use std::collections::BTreeSet;

/// Why a page selection was rejected.
///
/// These are returned as values so the front-end can decide how (and in
/// which language) to show them; see `crate::messages`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRangeError {
    #[error("Page {page} is out of range (1-{max})")]
    OutOfRange { page: u32, max: u32 },

    #[error("Invalid page specification: {token:?}")]
    InvalidFormat { token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl PageRange {
    /// Parse a single token like "4" or "2-7"
    pub fn parse(s: &str) -> Result<Self, PageRangeError> {
        let s = s.trim();

        if let Some((start_str, end_str)) = s.split_once('-') {
            // "-3" and "1-2-3" both end up here and are rejected by parse_page
            let start = parse_page(start_str, s)?;
            let end = parse_page(end_str, s)?;
            Ok(PageRange {
                start,
                end: Some(end),
            })
        } else {
            Ok(PageRange {
                start: parse_page(s, s)?,
                end: None,
            })
        }
    }

    /// Expand this range into 1-based page numbers, ascending.
    ///
    /// A reversed range such as "5-2" is treated as "2-5".
    pub fn expand(&self, max_page: u32) -> Result<Vec<u32>, PageRangeError> {
        let end = self.end.unwrap_or(self.start);

        for page in [self.start, end] {
            if page == 0 || page > max_page {
                return Err(PageRangeError::OutOfRange {
                    page,
                    max: max_page,
                });
            }
        }

        let (low, high) = if self.start <= end {
            (self.start, end)
        } else {
            (end, self.start)
        };

        Ok((low..=high).collect())
    }
}

fn parse_page(s: &str, token: &str) -> Result<u32, PageRangeError> {
    s.trim()
        .parse::<u32>()
        .map_err(|_| PageRangeError::InvalidFormat {
            token: token.to_string(),
        })
}

/// Parse a comma-separated list of pages and ranges like "1,3,5" or "2-4"
pub fn parse_page_ranges(s: &str) -> Result<Vec<PageRange>, PageRangeError> {
    s.split(',').map(PageRange::parse).collect()
}

/// Expand a page range string into the set of selected 1-based pages.
///
/// Fails as a whole on the first bad token; nothing is returned for the
/// tokens that were fine.
pub fn expand_page_ranges(s: &str, max_page: u32) -> Result<BTreeSet<u32>, PageRangeError> {
    let ranges = parse_page_ranges(s)?;
    let mut pages = BTreeSet::new();
    for range in ranges {
        pages.extend(range.expand(max_page)?);
    }
    Ok(pages)
}

/// Every page of a document with `max_page` pages.
pub fn all_pages(max_page: u32) -> BTreeSet<u32> {
    (1..=max_page).collect()
}
