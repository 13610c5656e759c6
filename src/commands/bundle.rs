use crate::cli::SliceArgs;
use crate::package::ArchiveNaming;
use crate::page_range::{all_pages, expand_page_ranges};
use crate::pdf::PdfSource;
use crate::pipeline::{bundle, slice_pages};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    pages: Option<&str>,
    output: Q,
    naming: ArchiveNaming,
    slice: &SliceArgs,
) -> Result<()> {
    let output = output.as_ref();

    let source = PdfSource::open(&input)?;
    let total_pages = source.page_count()?;
    let selected = match pages {
        Some(pages) => expand_page_ranges(pages, total_pages)?,
        None => all_pages(total_pages),
    };

    let sliced = slice_pages(&source, &selected, &slice.rasterizer()?, &slice.options()?)?;
    let archive = bundle(&sliced, naming)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(output, &archive.bytes)
        .with_context(|| format!("Failed to write archive: {}", output.display()))?;

    println!(
        "Archived {} part(s) from {} page(s) into {}",
        sliced.iter().map(|p| p.bands.len()).sum::<usize>(),
        sliced.len(),
        output.display()
    );

    Ok(())
}
