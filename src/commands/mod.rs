pub mod bundle;
pub mod info;
pub mod parts;
pub mod select;

use crate::bands::TargetSize;
use crate::cli::SliceArgs;
use crate::pdf::HayroRasterizer;
use crate::pipeline::SliceOptions;
use anyhow::Result;

impl SliceArgs {
    pub fn options(&self) -> Result<SliceOptions> {
        Ok(SliceOptions {
            size: TargetSize::new(self.width, self.height)?,
            resize: self.resize,
        })
    }

    pub fn rasterizer(&self) -> Result<HayroRasterizer> {
        HayroRasterizer::with_dpi(self.dpi)
    }
}
