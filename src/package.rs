use crate::bands::ImageBand;
use anyhow::{Context, Result};
use clap::ValueEnum;
use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const PNG_MIME: &str = "image/png";
pub const ZIP_MIME: &str = "application/zip";
pub const ARCHIVE_FILE_NAME: &str = "all_pages_parts.zip";

/// Prefix used by `ArchiveNaming::Running`.
const RUNNING_PREFIX: &str = "all_pages";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Png,
    Zip,
}

/// A file ready to be handed to the user.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    pub fn mime(&self) -> &'static str {
        match self.kind {
            ArtifactKind::Png => PNG_MIME,
            ArtifactKind::Zip => ZIP_MIME,
        }
    }
}

/// How entries inside the archive are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ArchiveNaming {
    /// `page_<page>_part_<band>.png`
    #[default]
    PerPage,
    /// `page_all_pages_part_<n>.png`, numbered across the whole batch
    Running,
}

pub fn band_file_name(page: u32, index: u32) -> String {
    format!("page_{}_part_{}.png", page, index)
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(bytes)
}

/// Package a single band as a standalone PNG.
pub fn single(band: &ImageBand) -> Result<DownloadArtifact> {
    Ok(DownloadArtifact {
        kind: ArtifactKind::Png,
        file_name: band_file_name(band.page, band.index),
        bytes: encode_png(&band.image)?,
    })
}

/// Package every band into one deflate-compressed ZIP archive.
pub fn bundle<'a, I>(bands: I, naming: ArchiveNaming) -> Result<DownloadArtifact>
where
    I: IntoIterator<Item = &'a ImageBand>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (band, n) in bands.into_iter().zip(1u32..) {
        let name = match naming {
            ArchiveNaming::PerPage => band_file_name(band.page, band.index),
            ArchiveNaming::Running => format!("page_{}_part_{}.png", RUNNING_PREFIX, n),
        };
        let png = encode_png(&band.image)?;

        writer
            .start_file(name.clone(), options)
            .with_context(|| format!("Failed to add {} to archive", name))?;
        writer
            .write_all(&png)
            .with_context(|| format!("Failed to write {} to archive", name))?;
    }

    let bytes = writer
        .finish()
        .context("Failed to finish archive")?
        .into_inner();

    Ok(DownloadArtifact {
        kind: ArtifactKind::Zip,
        file_name: ARCHIVE_FILE_NAME.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbaImage};
    use std::collections::HashSet;
    use std::io::Read;
    use zip::ZipArchive;

    fn bands(page: u32) -> Vec<ImageBand> {
        (1..=4)
            .map(|index| ImageBand {
                page,
                index,
                image: DynamicImage::ImageRgba8(RgbaImage::new(30, 20)),
            })
            .collect()
    }

    fn entries(artifact: &DownloadArtifact) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(artifact.bytes.as_slice())).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                assert_eq!(file.compression(), CompressionMethod::Deflated);
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[test]
    fn test_single_band() {
        let band = &bands(7)[2];
        let artifact = single(band).unwrap();

        assert_eq!(artifact.file_name, "page_7_part_3.png");
        assert_eq!(artifact.mime(), "image/png");

        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (30, 20));
    }

    #[test]
    fn test_bundle_four_bands() {
        let artifact = bundle(&bands(1), ArchiveNaming::PerPage).unwrap();
        assert_eq!(artifact.file_name, "all_pages_parts.zip");
        assert_eq!(artifact.mime(), "application/zip");

        let entries = entries(&artifact);
        assert_eq!(entries.len(), 4);

        let names: HashSet<_> = entries.iter().map(|(name, _)| name.clone()).collect();
        assert_eq!(names.len(), 4);

        for (_, data) in &entries {
            let decoded = image::load_from_memory(data).unwrap();
            assert_eq!(decoded.dimensions(), (30, 20));
        }
    }

    #[test]
    fn test_per_page_names_do_not_collide() {
        let all: Vec<_> = bands(2).into_iter().chain(bands(5)).collect();
        let names: Vec<_> = entries(&bundle(&all, ArchiveNaming::PerPage).unwrap())
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        assert_eq!(names[0], "page_2_part_1.png");
        assert_eq!(names[7], "page_5_part_4.png");
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), 8);
    }

    #[test]
    fn test_running_names_span_the_batch() {
        let all: Vec<_> = bands(2).into_iter().chain(bands(5)).collect();
        let names: Vec<_> = entries(&bundle(&all, ArchiveNaming::Running).unwrap())
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        let expected: Vec<_> = (1..=8)
            .map(|i| format!("page_all_pages_part_{}.png", i))
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_empty_bundle_is_a_valid_archive() {
        let artifact = bundle(Vec::<ImageBand>::new().iter(), ArchiveNaming::PerPage).unwrap();
        assert!(entries(&artifact).is_empty());
    }
}
