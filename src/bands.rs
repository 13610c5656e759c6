use anyhow::{bail, Result};
use clap::ValueEnum;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Number of horizontal strips every page is cut into.
pub const BAND_COUNT: u32 = 4;

const FILTER: FilterType = FilterType::CatmullRom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub const DEFAULT_WIDTH: u32 = 600;
    pub const DEFAULT_HEIGHT: u32 = 800;

    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("Target size must be at least 1x1 pixels, got {}x{}", width, height);
        }
        Ok(TargetSize { width, height })
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        TargetSize {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}

/// What the target size applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ResizeMode {
    /// Cut the page first, then stretch every band to the target size
    #[default]
    Band,
    /// Stretch the whole page to the target size, then cut it
    Page,
}

/// One horizontal strip of a page.
#[derive(Debug, Clone)]
pub struct ImageBand {
    pub page: u32,
    /// 1-based, top to bottom
    pub index: u32,
    pub image: DynamicImage,
}

/// Cut `image` into `BAND_COUNT` strips of `floor(height / BAND_COUNT)` rows.
///
/// Rows left over by the division are dropped from the bottom of the page.
/// Degenerate strips (no rows or no columns) come back as zero-sized images.
pub fn split(image: &DynamicImage) -> Vec<DynamicImage> {
    let (width, height) = image.dimensions();
    let band_height = height / BAND_COUNT;

    (0..BAND_COUNT)
        .map(|i| image.crop_imm(0, band_height * i, width, band_height))
        .collect()
}

/// Stretch `image` to exactly `size`, ignoring its aspect ratio.
pub fn resize(image: &DynamicImage, size: TargetSize) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return DynamicImage::new_rgba8(size.width, size.height);
    }
    image.resize_exact(size.width, size.height, FILTER)
}

/// Cut one rendered page into resized bands.
pub fn partition(
    page: u32,
    image: &DynamicImage,
    size: TargetSize,
    mode: ResizeMode,
) -> Vec<ImageBand> {
    let strips = match mode {
        ResizeMode::Band => split(image)
            .iter()
            .map(|strip| resize(strip, size))
            .collect::<Vec<_>>(),
        ResizeMode::Page => {
            // Every band keeps at least one row
            let page_size = TargetSize {
                width: size.width,
                height: size.height.max(BAND_COUNT),
            };
            split(&resize(image, page_size))
        }
    };

    strips
        .into_iter()
        .zip(1..)
        .map(|(image, index)| ImageBand { page, index, image })
        .collect()
}
