use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Label table, figure and text regions of tagged PDF documents.
#[derive(Debug, Parser)]
#[command(name = "tagbox", about, version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write one annotation record per page for a PDF or a directory of PDFs
    Annotate {
        /// PDF file, or a directory whose *.pdf files are all processed
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory. Default: 'output' next to the input
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Resolution of the page images the records refer to
        #[arg(long, default_value_t = 150, value_parser = clap::value_parser!(u32).range(1..))]
        dpi: u32,

        /// Coordinate system of bounding boxes
        #[arg(long, value_enum, default_value_t = CoordsArg::Page)]
        coords: CoordsArg,

        /// Record format
        #[arg(long, value_enum, default_value_t = RecordFormat::Xml)]
        format: RecordFormat,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Measure glyphs without outlines by advance width and ascent
        #[arg(long)]
        metrics_fallback: bool,
    },

    /// Print the structure tree with each element's boxes and class
    Tree {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the labeled regions of each page
    Tags {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CoordsArg {
    /// PDF points, origin bottom left
    Page,
    /// Image pixels at --dpi, origin top left
    Pixel,
}

impl From<CoordsArg> for tagbox::Coords {
    fn from(arg: CoordsArg) -> Self {
        match arg {
            CoordsArg::Page => tagbox::Coords::Page,
            CoordsArg::Pixel => tagbox::Coords::Pixel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordFormat {
    /// One Pascal-VOC XML file per page
    Xml,
    /// One JSON file per document
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TextFormat {
    Text,
    Json,
}
