use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "cmanual",
    version,
    about = "Coding-manual PDF to data dictionary extraction"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Status(StatusArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ManualFormat {
    Current,
    Old,
}

impl ManualFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Old => "old",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum LayoutSource {
    Json,
    Pdftotext,
}

impl LayoutSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pdftotext => "pdftotext",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub pdf_path: PathBuf,

    #[arg(long, value_enum, default_value_t = ManualFormat::Current)]
    pub format: ManualFormat,

    #[arg(long, default_value = ".cache/cmanual")]
    pub cache_root: PathBuf,

    #[arg(long, value_enum, default_value_t = LayoutSource::Pdftotext)]
    pub layout_source: LayoutSource,

    #[arg(long)]
    pub layout_path: Option<PathBuf>,

    #[arg(long)]
    pub ocr_text_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub regen_ocr: bool,

    #[arg(long, default_value = "eng")]
    pub ocr_lang: String,

    #[arg(long)]
    pub thresholds_path: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub export_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/cmanual")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
