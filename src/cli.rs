use crate::bands::{ResizeMode, TargetSize};
use crate::messages::Locale;
use crate::package::ArchiveNaming;
use crate::pdf::render::DEFAULT_DPI;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfbands")]
#[command(about = "Render PDF pages and cut them into four resized horizontal strips")]
#[command(version)]
pub struct Cli {
    /// Language for page selection errors
    #[arg(long, global = true, value_enum, default_value_t = Locale::En, env = "PDFBANDS_LANG")]
    pub lang: Locale,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Show the number of pages in a PDF
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Check a page selection and print the pages it expands to
    Select {
        /// PDF file the selection applies to
        path: PathBuf,

        /// Pages (e.g., "1,3,5" or "2-4")
        pages: String,
    },

    /// Write every strip of the selected pages as its own PNG
    Parts {
        /// PDF file to slice
        path: PathBuf,

        /// Pages (e.g., "1,3,5" or "2-4")
        #[arg(default_value = "1")]
        pages: String,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,

        #[command(flatten)]
        slice: SliceArgs,
    },

    /// Bundle the strips of several pages into one ZIP archive
    Zip {
        /// PDF file to slice
        path: PathBuf,

        /// Pages (e.g., "1,3,5" or "2-4"); all pages when omitted
        #[arg(short, long)]
        pages: Option<String>,

        /// Output archive
        #[arg(short, long, default_value = crate::package::ARCHIVE_FILE_NAME)]
        output: PathBuf,

        /// How entries inside the archive are named
        #[arg(long, value_enum, default_value_t = ArchiveNaming::PerPage)]
        naming: ArchiveNaming,

        #[command(flatten)]
        slice: SliceArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SliceArgs {
    /// Width of each strip in pixels
    #[arg(long, default_value_t = TargetSize::DEFAULT_WIDTH, env = "PDFBANDS_WIDTH",
          value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Height of each strip in pixels
    #[arg(long, default_value_t = TargetSize::DEFAULT_HEIGHT, env = "PDFBANDS_HEIGHT",
          value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Rendering resolution
    #[arg(long, default_value_t = DEFAULT_DPI, env = "PDFBANDS_DPI")]
    pub dpi: f32,

    /// Apply the size to each strip, or to the whole page before cutting
    #[arg(long, value_enum, default_value_t = ResizeMode::Band)]
    pub resize: ResizeMode,
}
