pub mod render;
pub mod source;

pub use render::{HayroRasterizer, RasterImage, Rasterizer};
pub use source::PdfSource;
