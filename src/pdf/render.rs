use super::PdfSource;
use anyhow::{anyhow, bail, ensure, Context, Result};
use hayro::{render, InterpreterSettings, Pdf, RenderSettings};
use image::DynamicImage;
use std::collections::BTreeSet;

/// PDF user space is 72 units per inch.
const POINTS_PER_INCH: f32 = 72.0;

pub const DEFAULT_DPI: f32 = 200.0;

/// Above this a single letter page needs gigabytes of pixmap.
pub const MAX_DPI: f32 = 1200.0;

/// A rendered page.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// 1-based page number in the source document
    pub page: u32,
    pub image: DynamicImage,
}

/// Turns selected PDF pages into bitmaps.
pub trait Rasterizer {
    /// Render every page in `pages`, in ascending page order.
    fn rasterize(&self, source: &PdfSource, pages: &BTreeSet<u32>) -> Result<Vec<RasterImage>>;
}

#[derive(Debug, Clone, Copy)]
pub struct HayroRasterizer {
    dpi: f32,
}

impl HayroRasterizer {
    pub fn new(dpi: f32) -> Self {
        HayroRasterizer { dpi }
    }

    /// Like `new`, but rejects resolutions that are not in `(0, MAX_DPI]`.
    pub fn with_dpi(dpi: f32) -> Result<Self> {
        ensure!(
            dpi.is_finite() && dpi > 0.0 && dpi <= MAX_DPI,
            "DPI must be between 0 and {}, got {}",
            MAX_DPI,
            dpi
        );
        Ok(HayroRasterizer::new(dpi))
    }

    fn scale(&self) -> f32 {
        self.dpi / POINTS_PER_INCH
    }
}

impl Default for HayroRasterizer {
    fn default() -> Self {
        HayroRasterizer::new(DEFAULT_DPI)
    }
}

impl Rasterizer for HayroRasterizer {
    fn rasterize(&self, source: &PdfSource, pages: &BTreeSet<u32>) -> Result<Vec<RasterImage>> {
        let pdf = Pdf::new(source.data())
            .map_err(|e| anyhow!("Failed to load PDF for rendering: {}: {:?}", source.name(), e))?;

        let interpreter_settings = InterpreterSettings::default();
        let render_settings = RenderSettings {
            x_scale: self.scale(),
            y_scale: self.scale(),
            ..Default::default()
        };

        let mut images = Vec::with_capacity(pages.len());
        for (idx, page) in pdf.pages().iter().enumerate() {
            let number = idx as u32 + 1;
            if !pages.contains(&number) {
                continue;
            }

            tracing::debug!(page = number, dpi = self.dpi, "rendering page");
            let pixmap = render(page, &interpreter_settings, &render_settings);
            let image = image::load_from_memory(&pixmap.take_png())
                .with_context(|| format!("Failed to decode rendered page {}", number))?;

            images.push(RasterImage {
                page: number,
                image,
            });
        }

        if let Some(missing) = pages
            .iter()
            .find(|page| !images.iter().any(|img| img.page == **page))
        {
            bail!("Page {} was not found in {}", missing, source.name());
        }

        Ok(images)
    }
}
