use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::bands::{ResizeMode, TargetSize};
use crate::messages::{self, Locale};
use crate::package::{ArchiveNaming, PNG_MIME};
use crate::page_range::{all_pages, expand_page_ranges, PageRangeError};
use crate::pdf::render::DEFAULT_DPI;
use crate::pdf::{HayroRasterizer, PdfSource};
use crate::pipeline::{artifacts_for, bundle, slice_pages, SliceOptions};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SelectPagesRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Pages to process (e.g., '1,3,5' or '2-4')")]
    pub pages: String,
    #[schemars(description = "Language for page selection errors: 'en' or 'fr' (default: en)")]
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SliceSettings {
    #[schemars(description = "Width of each strip in pixels (default: 600)")]
    #[serde(default = "default_width")]
    pub width: u32,
    #[schemars(description = "Height of each strip in pixels (default: 800)")]
    #[serde(default = "default_height")]
    pub height: u32,
    #[schemars(description = "Rendering resolution (default: 200)")]
    #[serde(default = "default_dpi")]
    pub dpi: f32,
    #[schemars(description = "'band' to size each strip, 'page' to size the page before cutting (default: band)")]
    pub resize: Option<String>,
    #[schemars(description = "Language for page selection errors: 'en' or 'fr' (default: en)")]
    pub lang: Option<String>,
}

fn default_width() -> u32 {
    TargetSize::DEFAULT_WIDTH
}

fn default_height() -> u32 {
    TargetSize::DEFAULT_HEIGHT
}

fn default_dpi() -> f32 {
    DEFAULT_DPI
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SlicePagesRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Pages to process (e.g., '1,3,5' or '2-4')")]
    pub pages: String,
    #[schemars(description = "Directory the PNG strips are written to")]
    pub output_dir: String,
    #[serde(flatten)]
    pub settings: SliceSettings,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SliceZipRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Pages to process (e.g., '1,3,5' or '2-4'); all pages when omitted")]
    pub pages: Option<String>,
    #[schemars(description = "Output archive path")]
    pub output: String,
    #[schemars(description = "Entry naming: 'per-page' or 'running' (default: per-page)")]
    pub naming: Option<String>,
    #[serde(flatten)]
    pub settings: SliceSettings,
}

#[derive(Debug, Clone)]
pub struct PdfBandsServer {
    tool_router: ToolRouter<Self>,
}

impl PdfBandsServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfBandsServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfBandsServer {
    #[tool(description = "Get the number of pages in a PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let result = PdfSource::open(&path)
            .and_then(|source| source.page_count())
            .map(|page_count| PageCountResult { path, page_count });
        respond(result, Locale::En)
    }

    #[tool(description = "Validate a page selection like '1,3,5' or '2-4' and list the pages it covers")]
    fn pdf_select_pages(&self, Parameters(req): Parameters<SelectPagesRequest>) -> String {
        let locale = match parse_choice::<Locale>(req.lang.as_deref(), "lang") {
            Ok(l) => l,
            Err(e) => return format!("Error: {}", e),
        };
        respond(select_pages(&req), locale)
    }

    #[tool(description = "Render pages of a PDF, cut each into four horizontal strips, resize them and write each strip as a PNG file")]
    fn pdf_slice_pages(&self, Parameters(req): Parameters<SlicePagesRequest>) -> String {
        let locale = match parse_choice::<Locale>(req.settings.lang.as_deref(), "lang") {
            Ok(l) => l,
            Err(e) => return format!("Error: {}", e),
        };
        respond(slice_to_files(&req), locale)
    }

    #[tool(description = "Render pages of a PDF, cut each into four resized horizontal strips and bundle them in a ZIP archive")]
    fn pdf_slice_zip(&self, Parameters(req): Parameters<SliceZipRequest>) -> String {
        let locale = match parse_choice::<Locale>(req.settings.lang.as_deref(), "lang") {
            Ok(l) => l,
            Err(e) => return format!("Error: {}", e),
        };
        respond(slice_to_zip(&req), locale)
    }
}

fn select_pages(req: &SelectPagesRequest) -> Result<SelectPagesResult> {
    let source = PdfSource::open(&req.path)?;
    let page_count = source.page_count()?;
    let pages = expand_page_ranges(&req.pages, page_count)?;
    Ok(SelectPagesResult {
        pages: pages.into_iter().collect(),
        page_count,
    })
}

fn slice_to_files(req: &SlicePagesRequest) -> Result<Vec<PartResult>> {
    let (rasterizer, options) = req.settings.resolve()?;
    let source = PdfSource::open(&req.path)?;
    let selected = expand_page_ranges(&req.pages, source.page_count()?)?;

    let sliced = slice_pages(&source, &selected, &rasterizer, &options)?;
    let output_dir = Path::new(&req.output_dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut parts = Vec::new();
    for (artifact, band) in artifacts_for(&sliced)?
        .into_iter()
        .zip(sliced.iter().flat_map(|p| p.bands.iter()))
    {
        let output_path = output_dir.join(&artifact.file_name);
        std::fs::write(&output_path, &artifact.bytes)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        parts.push(PartResult {
            page: band.page,
            part: band.index,
            path: output_path.display().to_string(),
            mime: PNG_MIME.to_string(),
        });
    }
    Ok(parts)
}

fn slice_to_zip(req: &SliceZipRequest) -> Result<ZipResult> {
    let (rasterizer, options) = req.settings.resolve()?;
    let naming = parse_choice::<ArchiveNaming>(req.naming.as_deref(), "naming")?;
    let source = PdfSource::open(&req.path)?;
    let total_pages = source.page_count()?;
    let selected = match &req.pages {
        Some(pages) => expand_page_ranges(pages, total_pages)?,
        None => all_pages(total_pages),
    };

    let sliced = slice_pages(&source, &selected, &rasterizer, &options)?;
    let archive = bundle(&sliced, naming)?;
    let output = Path::new(&req.output);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(output, &archive.bytes)
        .with_context(|| format!("Failed to write archive: {}", req.output))?;

    Ok(ZipResult {
        output_path: req.output.clone(),
        mime: archive.mime().to_string(),
        page_count: sliced.len() as u32,
        part_count: sliced.iter().map(|p| p.bands.len() as u32).sum(),
    })
}

impl SliceSettings {
    fn resolve(&self) -> Result<(HayroRasterizer, SliceOptions)> {
        let options = SliceOptions {
            size: TargetSize::new(self.width, self.height)?,
            resize: parse_choice::<ResizeMode>(self.resize.as_deref(), "resize")?,
        };
        Ok((HayroRasterizer::with_dpi(self.dpi)?, options))
    }
}

fn parse_choice<T: ValueEnum + Default>(value: Option<&str>, field: &str) -> Result<T> {
    match value {
        None => Ok(T::default()),
        Some(v) => T::from_str(v, true).map_err(|_| anyhow!("Invalid {}: {}", field, v)),
    }
}

fn respond<T: Serialize>(result: Result<T>, locale: Locale) -> String {
    match result {
        Ok(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("Error: {}", e))
        }
        Err(e) => match e.downcast_ref::<PageRangeError>() {
            Some(range_err) => format!("Error: {}", messages::describe(range_err, locale)),
            None => format!("Error: {:#}", e),
        },
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub path: String,
    pub page_count: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SelectPagesResult {
    pub pages: Vec<u32>,
    pub page_count: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PartResult {
    pub page: u32,
    pub part: u32,
    pub path: String,
    pub mime: String,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ZipResult {
    pub output_path: String,
    pub mime: String,
    pub page_count: u32,
    pub part_count: u32,
}

#[tool_handler]
impl ServerHandler for PdfBandsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Cut PDF pages into four horizontal strips. Use pdf_page_count to learn how many \
                 pages a document has, pdf_select_pages to check a page selection, \
                 pdf_slice_pages to write each strip as a PNG, and pdf_slice_zip to bundle \
                 the strips into one archive."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfBandsServer::new();
    tracing::info!("starting MCP server on stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice_defaults_and_case() {
        assert_eq!(parse_choice::<Locale>(None, "lang").unwrap(), Locale::En);
        assert_eq!(parse_choice::<Locale>(Some("FR"), "lang").unwrap(), Locale::Fr);
        assert_eq!(
            parse_choice::<ArchiveNaming>(Some("running"), "naming").unwrap(),
            ArchiveNaming::Running
        );
        assert!(parse_choice::<ResizeMode>(Some("diagonal"), "resize").is_err());
    }

    #[test]
    fn test_page_errors_are_localized() {
        let err: anyhow::Error = PageRangeError::OutOfRange { page: 9, max: 3 }.into();
        let text = respond::<()>(Err(err), Locale::Fr);
        assert!(text.starts_with("Error: Numéro de page hors limite"));
    }

    #[test]
    fn test_other_errors_keep_context() {
        let text = respond(PdfSource::open("/nonexistent/file.pdf").map(|_| ()), Locale::En);
        assert!(text.starts_with("Error: Failed to open PDF: /nonexistent/file.pdf"));
    }

    /// Write a PDF with `count` blank 200x400 pages into `dir`.
    fn write_pdf(dir: &Path, count: usize) -> String {
        use lopdf::{dictionary, Object, Stream};

        let mut doc = lopdf::Document::with_version("1.5");
        let mut page_ids = Vec::new();
        for _ in 0..count {
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                b"0 0 1 rg 20 20 160 60 re f".to_vec(),
            ));
            page_ids.push(doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(200),
                    Object::Integer(400),
                ],
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {},
            }));
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count as i64),
        });
        for &pid in &page_ids {
            if let Ok(dict) = doc.get_object_mut(pid).and_then(|o| o.as_dict_mut()) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let path = dir.join("doc.pdf");
        doc.save(&path).unwrap();
        path.display().to_string()
    }

    fn zip_names(path: &str) -> Vec<String> {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_slice_to_files_writes_each_part() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(dir.path(), 3);
        let out = dir.path().join("parts");

        let req: SlicePagesRequest = serde_json::from_value(serde_json::json!({
            "path": pdf,
            "pages": "3,1",
            "output_dir": out.display().to_string(),
            "width": 40,
            "height": 30,
            "dpi": 72.0,
        }))
        .unwrap();
        let parts = slice_to_files(&req).unwrap();

        let pairs: Vec<(u32, u32)> = parts.iter().map(|p| (p.page, p.part)).collect();
        assert_eq!(
            pairs,
            vec![(1, 1), (1, 2), (1, 3), (1, 4), (3, 1), (3, 2), (3, 3), (3, 4)]
        );
        for part in &parts {
            assert!(part
                .path
                .ends_with(&format!("page_{}_part_{}.png", part.page, part.part)));
            assert_eq!(part.mime, "image/png");
            let img = image::open(&part.path).unwrap();
            assert_eq!((img.width(), img.height()), (40, 30));
        }
    }

    #[test]
    fn test_slice_to_zip_defaults_to_all_pages() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(dir.path(), 2);
        let output = dir.path().join("nested").join("deeper").join("bands.zip");

        let req: SliceZipRequest = serde_json::from_value(serde_json::json!({
            "path": pdf,
            "output": output.display().to_string(),
            "width": 10,
            "height": 10,
            "dpi": 72.0,
        }))
        .unwrap();
        let result = slice_to_zip(&req).unwrap();

        assert_eq!(result.page_count, 2);
        assert_eq!(result.part_count, 8);
        assert_eq!(result.mime, "application/zip");
        let names = zip_names(&result.output_path);
        assert_eq!(names.first().unwrap(), "page_1_part_1.png");
        assert_eq!(names.last().unwrap(), "page_2_part_4.png");
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn test_slice_to_zip_running_naming() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(dir.path(), 3);
        let output = dir.path().join("running.zip");

        let req: SliceZipRequest = serde_json::from_value(serde_json::json!({
            "path": pdf,
            "pages": "2-3",
            "output": output.display().to_string(),
            "naming": "running",
            "width": 10,
            "height": 10,
            "dpi": 72.0,
        }))
        .unwrap();
        slice_to_zip(&req).unwrap();

        let expected: Vec<_> = (1..=8)
            .map(|i| format!("page_all_pages_part_{}.png", i))
            .collect();
        assert_eq!(zip_names(&output.display().to_string()), expected);
    }

    #[test]
    fn test_slice_to_zip_rejects_unknown_naming() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(dir.path(), 1);
        let req: SliceZipRequest = serde_json::from_value(serde_json::json!({
            "path": pdf,
            "output": dir.path().join("x.zip").display().to_string(),
            "naming": "alphabetical",
        }))
        .unwrap();
        assert!(slice_to_zip(&req).is_err());
    }

    #[test]
    fn test_slice_settings_reject_excessive_dpi() {
        let settings: SliceSettings = serde_json::from_str(r#"{"dpi": 1000000.0}"#).unwrap();
        assert!(settings.resolve().is_err());
    }

    #[test]
    fn test_slice_settings_reject_zero_width() {
        let settings: SliceSettings = serde_json::from_str(r#"{"width": 0}"#).unwrap();
        assert!(settings.resolve().is_err());

        let settings: SliceSettings = serde_json::from_str("{}").unwrap();
        let (_, options) = settings.resolve().unwrap();
        assert_eq!(options.size, TargetSize::default());
        assert_eq!(options.resize, ResizeMode::Band);
    }
}
