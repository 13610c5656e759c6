use crate::cli::SliceArgs;
use crate::page_range::expand_page_ranges;
use crate::pdf::PdfSource;
use crate::pipeline::{artifacts_for, slice_pages};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    pages: &str,
    output_dir: Q,
    slice: &SliceArgs,
) -> Result<()> {
    let output_dir = output_dir.as_ref();

    let source = PdfSource::open(&input)?;
    let total_pages = source.page_count()?;
    let selected = expand_page_ranges(pages, total_pages)?;

    let sliced = slice_pages(&source, &selected, &slice.rasterizer()?, &slice.options()?)?;
    let artifacts = artifacts_for(&sliced)?;

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    for artifact in &artifacts {
        let output_path = output_dir.join(&artifact.file_name);
        std::fs::write(&output_path, &artifact.bytes)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!("{}", output_path.display());
    }

    println!(
        "Wrote {} part(s) from {} page(s) to {}",
        artifacts.len(),
        sliced.len(),
        output_dir.display()
    );

    Ok(())
}
