use crate::page_range::expand_page_ranges;
use crate::pdf::PdfSource;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P, pages: &str) -> Result<()> {
    let source = PdfSource::open(&path)?;
    let total_pages = source.page_count()?;

    let selected = expand_page_ranges(pages, total_pages)?;

    let list: Vec<String> = selected.iter().map(|p| p.to_string()).collect();
    println!("{}", list.join(","));
    println!("{} of {} page(s) selected", selected.len(), total_pages);

    Ok(())
}
