use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedWord {
    pub text: String,
    #[serde(alias = "x0")]
    pub x_start: f64,
    #[serde(alias = "x1")]
    pub x_end: f64,
    #[serde(alias = "top")]
    pub y_top: f64,
    #[serde(alias = "bottom")]
    pub y_bottom: f64,
}

impl PositionedWord {
    #[cfg(test)]
    pub fn new(text: &str, x_start: f64, x_end: f64, y_top: f64, y_bottom: f64) -> Self {
        Self {
            text: text.to_string(),
            x_start,
            x_end,
            y_top,
            y_bottom,
        }
    }

    pub fn spans_x(&self, x: f64) -> bool {
        self.x_start <= x && x <= self.x_end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedTable {
    pub bbox: [f64; 4],
    #[serde(default)]
    pub cells: Vec<String>,
    #[serde(default)]
    pub text_top: Option<f64>,
}

impl DetectedTable {
    pub fn anchor_y(&self) -> f64 {
        self.text_top.unwrap_or(self.bbox[1])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub words: Vec<PositionedWord>,
    #[serde(default)]
    pub tables: Vec<DetectedTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub pages: Vec<LayoutPage>,
}

impl LayoutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn first_page_words(&self) -> &[PositionedWord] {
        self.pages
            .first()
            .map(|page| page.words.as_slice())
            .unwrap_or(&[])
    }

    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|page| page.tables.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableNameEntry {
    pub name: String,
    pub page_y: f64,
}

impl VariableNameEntry {
    pub fn new(name: &str, page_y: f64) -> Self {
        Self {
            name: name.to_string(),
            page_y,
        }
    }
}

pub fn pull_text_between(
    y_start: f64,
    y_end: f64,
    words: &[PositionedWord],
    tolerance: f64,
) -> String {
    let mut text = String::new();
    let mut last_bottom: Option<f64> = None;

    for word in words {
        if word.y_top < y_start - tolerance || word.y_top >= y_end {
            continue;
        }

        if let Some(previous) = last_bottom
            && (previous - word.y_bottom).abs() > tolerance
        {
            let trimmed = text.trim_end().len();
            text.truncate(trimmed);
            text.push('\n');
        }

        text.push_str(&word.text);
        text.push(' ');
        last_bottom = Some(word.y_bottom);
    }

    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    text
}
