use crate::bands::{self, ImageBand, ResizeMode, TargetSize};
use crate::package::{self, ArchiveNaming, DownloadArtifact};
use crate::pdf::{PdfSource, Rasterizer};
use anyhow::{bail, Result};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct SliceOptions {
    pub size: TargetSize,
    pub resize: ResizeMode,
}

/// The bands cut from one page.
#[derive(Debug, Clone)]
pub struct PageBands {
    pub page: u32,
    pub bands: Vec<ImageBand>,
}

/// Render the selected pages and cut each into resized bands, in page order.
pub fn slice_pages<R: Rasterizer + ?Sized>(
    source: &PdfSource,
    pages: &BTreeSet<u32>,
    rasterizer: &R,
    options: &SliceOptions,
) -> Result<Vec<PageBands>> {
    if pages.is_empty() {
        bail!("No pages specified");
    }

    tracing::info!(
        source = source.name(),
        pages = pages.len(),
        width = options.size.width,
        height = options.size.height,
        "slicing pages"
    );

    let rendered = rasterizer.rasterize(source, pages)?;

    Ok(rendered
        .iter()
        .map(|raster| {
            tracing::debug!(
                page = raster.page,
                width = raster.image.width(),
                height = raster.image.height(),
                "partitioning page"
            );
            PageBands {
                page: raster.page,
                bands: bands::partition(raster.page, &raster.image, options.size, options.resize),
            }
        })
        .collect())
}

/// One PNG per band, in page then band order.
pub fn artifacts_for(pages: &[PageBands]) -> Result<Vec<DownloadArtifact>> {
    pages
        .iter()
        .flat_map(|page| page.bands.iter())
        .map(package::single)
        .collect()
}

/// Every band of every page in one archive.
pub fn bundle(pages: &[PageBands], naming: ArchiveNaming) -> Result<DownloadArtifact> {
    let artifact = package::bundle(pages.iter().flat_map(|page| page.bands.iter()), naming)?;
    tracing::info!(
        pages = pages.len(),
        bytes = artifact.bytes.len(),
        "built archive"
    );
    Ok(artifact)
}
