use crate::pdf::PdfSource;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let source = PdfSource::open(&path)?;

    println!("File: {}", path.as_ref().display());
    println!("Pages: {}", source.page_count()?);

    Ok(())
}
