use serde::{Deserialize, Serialize};

use crate::engine::{DictionaryRow, ExtractionStats, Variable};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub filename: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolVersions {
    pub pdftotext: Option<String>,
    pub pdftoppm: Option<String>,
    pub tesseract: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractPaths {
    pub cache_root: String,
    pub db_path: String,
    pub export_path: String,
    pub ocr_text_path: Option<String>,
    pub layout_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractCounts {
    pub page_count: usize,
    pub detected_table_count: usize,
    pub coded_table_count: usize,
    pub merged_table_count: usize,
    pub located_name_count: usize,
    pub duplicate_name_count: usize,
    pub variable_count: usize,
    pub bound_table_count: usize,
    pub description_count: usize,
    pub descriptions_exhausted: usize,
    pub review_needed_count: usize,
}

impl ExtractCounts {
    pub fn from_stats(stats: &ExtractionStats, variable_count: usize) -> Self {
        Self {
            page_count: stats.page_count,
            detected_table_count: stats.detected_table_count,
            coded_table_count: stats.coded_table_count,
            merged_table_count: stats.merged_table_count,
            located_name_count: stats.located_name_count,
            duplicate_name_count: stats.duplicate_name_count,
            variable_count,
            bound_table_count: stats.bound_table_count,
            description_count: stats.description_count,
            descriptions_exhausted: stats.descriptions_exhausted,
            review_needed_count: stats.review_needed_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub manual_id: String,
    pub format: String,
    pub layout_source: String,
    pub db_schema_version: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub total_observations: Option<i64>,
    pub column_offset: Option<f64>,
    pub tool_versions: ToolVersions,
    pub paths: ExtractPaths,
    pub counts: ExtractCounts,
    pub source: SourceEntry,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DictionaryExport {
    pub manual_id: String,
    pub generated_at: String,
    pub total_observations: Option<i64>,
    pub rows: Vec<DictionaryRow>,
    pub variables: Vec<Variable>,
}
