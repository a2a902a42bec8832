use serde::Serialize;

use super::table_cells::CodedValueTable;

pub const MANUAL_REVIEW_SENTINEL: &str = "!MANUALLY INPUT DESCRIPTION!";
pub const MISSING_DESCRIPTION_PLACEHOLDER: &str = "ran out of descriptions";

const RANGE_DASHES: [char; 3] = ['-', '–', '—'];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DocumentPosition {
    pub page: usize,
    pub y: f64,
}

impl DocumentPosition {
    pub fn new(page: usize, y: f64) -> Self {
        Self { page, y }
    }

    pub fn sort_key(&self) -> String {
        format!("{:04}{:04}", self.page, self.y.round_ties_even() as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub description: String,
    pub values: Option<CodedValueTable>,
    pub total_observations: Option<i64>,
    pub position: DocumentPosition,
}

impl Variable {
    pub fn new(
        name: &str,
        description: &str,
        values: Option<CodedValueTable>,
        total_observations: Option<i64>,
        position: DocumentPosition,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description_or_sentinel(description),
            values,
            total_observations,
            position,
        }
    }

    pub fn needs_review(&self) -> bool {
        self.description == MANUAL_REVIEW_SENTINEL
            || self.description == MISSING_DESCRIPTION_PLACEHOLDER
    }

    pub fn dictionary_row(&self) -> DictionaryRow {
        let (without_notes, notes) = split_labelled_suffix(&self.description, "Note:");
        let (description, units) = split_labelled_suffix(&without_notes, "Units:");

        let observed = self
            .total_observations
            .and(self.values.as_ref())
            .and_then(observed_count);
        let missing = match (self.total_observations, observed) {
            (Some(total), Some(observed)) => Some(total - observed),
            _ => None,
        };
        let (minimum, maximum) = self
            .values
            .as_ref()
            .map(numeric_code_bounds)
            .unwrap_or((None, None));

        DictionaryRow {
            variable: self.name.clone(),
            description: description_or_sentinel(&description),
            n: observed,
            miss: missing,
            minimum,
            maximum,
            units,
            coded_values: self
                .values
                .as_ref()
                .map(render_coded_values)
                .unwrap_or_default(),
            notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryRow {
    pub variable: String,
    pub description: String,
    pub n: Option<i64>,
    pub miss: Option<i64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub units: Option<String>,
    pub coded_values: String,
    pub notes: Option<String>,
}

pub fn order_variables(variables: &mut [Variable]) {
    variables.sort_by_key(|variable| variable.position.sort_key());
}

pub fn description_or_sentinel(description: &str) -> String {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        MANUAL_REVIEW_SENTINEL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn split_labelled_suffix(text: &str, label: &str) -> (String, Option<String>) {
    match text.split_once(label) {
        Some((head, tail)) => {
            let tail = tail.split(label).next().unwrap_or_default().trim();
            let suffix = if tail.is_empty() {
                None
            } else {
                Some(tail.to_string())
            };
            (head.trim().to_string(), suffix)
        }
        None => (text.to_string(), None),
    }
}

fn observed_count(values: &CodedValueTable) -> Option<i64> {
    let total = values
        .iter()
        .map(|(_, value)| value.count)
        .sum::<Option<i64>>()?;
    if total == 0 { None } else { Some(total) }
}

fn numeric_code_bounds(values: &CodedValueTable) -> (Option<f64>, Option<f64>) {
    let numbers = values
        .codes()
        .flat_map(|code| {
            let compact = code
                .chars()
                .filter(|character| !character.is_whitespace())
                .collect::<String>();
            if compact.contains(RANGE_DASHES) {
                compact
                    .split(RANGE_DASHES)
                    .filter_map(|part| part.parse::<f64>().ok())
                    .collect::<Vec<f64>>()
            } else {
                compact.parse::<f64>().ok().into_iter().collect()
            }
        })
        .collect::<Vec<f64>>();

    let minimum = numbers.iter().copied().min_by(f64::total_cmp);
    let maximum = numbers.iter().copied().max_by(f64::total_cmp);
    (minimum, maximum)
}

fn render_coded_values(values: &CodedValueTable) -> String {
    values
        .iter()
        .map(|(code, value)| format!("{} = {}", code, value.description))
        .collect::<Vec<String>>()
        .join("\n")
}
