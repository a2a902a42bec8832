use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutThresholds {
    pub max_table_gap: f64,
    pub last_on_page_bottom: f64,
    pub first_on_page_top: f64,
    pub near_top_of_page: f64,
    pub lookahead_name_y: f64,
    pub name_column_x: f64,
    pub offset_step: f64,
    pub max_offset: f64,
    pub line_tolerance: f64,
}

impl Default for LayoutThresholds {
    fn default() -> Self {
        Self {
            max_table_gap: 140.0,
            last_on_page_bottom: 670.0,
            first_on_page_top: 75.0,
            near_top_of_page: 150.0,
            lookahead_name_y: 650.0,
            name_column_x: 40.0,
            offset_step: 0.5,
            max_offset: 40.0,
            line_tolerance: 1.0,
        }
    }
}
