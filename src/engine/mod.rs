pub mod binder;
pub mod continuity;
pub mod descriptions;
pub mod dictionary;
pub mod labels_current;
pub mod labels_old;
pub mod observations;
pub mod patterns;
pub mod pipeline;
pub mod segmenter;
pub mod table_cells;
pub mod thresholds;
pub mod words;

#[cfg(test)]
mod tests;

pub use dictionary::{DictionaryRow, Variable};
pub use patterns::ManualPatterns;
pub use pipeline::{ExtractionStats, extract_current_format, extract_old_format};
pub use thresholds::LayoutThresholds;
pub use words::{LayoutDocument, LayoutPage, PositionedWord};
