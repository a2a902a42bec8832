use tracing::{debug, warn};

use super::thresholds::LayoutThresholds;
use super::words::{LayoutDocument, PositionedWord, VariableNameEntry};

const ANCHOR_NAMES: [&str; 2] = ["ID", "IDTYPE"];
const SEPARATOR_CHARS: [char; 6] = ['-', '_', '=', '*', '~', '.'];
const REJECTED_CHARS: [char; 13] = [
    '.', ',', ':', ';', '(', ')', '=', '/', '?', '!', '"', '\'', '-',
];
const NAME_STOPLIST: [&str; 40] = [
    "a", "all", "and", "blank", "code", "codes", "cohort", "data", "dataset", "date",
    "description", "exam", "field", "form", "framingham", "if", "in", "n/a", "na", "no",
    "none", "not", "note", "notes", "of", "offspring", "or", "page", "see", "study", "the",
    "to", "total", "type", "unknown", "value", "values", "variable", "variables", "yes",
];

pub fn scan_name_column(
    words: &[PositionedWord],
    scan_x: f64,
    first_page: bool,
) -> Vec<VariableNameEntry> {
    let mut crossing = words
        .iter()
        .filter(|word| word.spans_x(scan_x))
        .collect::<Vec<&PositionedWord>>();

    if first_page {
        let rule_len = crossing
            .iter()
            .take_while(|word| is_separator_only(&word.text))
            .count();
        crossing.drain(..rule_len);
    }

    crossing
        .into_iter()
        .filter(|word| is_variable_name_candidate(&word.text))
        .map(|word| VariableNameEntry::new(&word.text, word.y_top))
        .collect()
}

pub fn is_variable_name_candidate(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || is_punctuation_only(text) {
        return false;
    }
    if NAME_STOPLIST.contains(&text.to_lowercase().as_str()) {
        return false;
    }
    if !is_upper_case(text) {
        return false;
    }
    if text.chars().all(|character| character.is_ascii_digit()) {
        return false;
    }

    !text.contains(REJECTED_CHARS)
}

pub fn discover_column_offset(
    first_page_words: &[PositionedWord],
    thresholds: &LayoutThresholds,
) -> Option<f64> {
    let max_steps = if thresholds.offset_step > 0.0 {
        (thresholds.max_offset / thresholds.offset_step).floor() as usize
    } else {
        0
    };

    for step in 0..=max_steps {
        let offset = step as f64 * thresholds.offset_step;
        let names = scan_name_column(
            first_page_words,
            thresholds.name_column_x + offset,
            true,
        );

        let has_anchor = names
            .iter()
            .any(|entry| ANCHOR_NAMES.contains(&entry.name.as_str()));
        if names.len() >= 2 || has_anchor {
            debug!(offset, names = names.len(), "name column offset found");
            return Some(offset);
        }
    }

    None
}

pub fn locate_old_format_names(
    document: &LayoutDocument,
    thresholds: &LayoutThresholds,
) -> (Vec<Vec<VariableNameEntry>>, f64) {
    let offset = match discover_column_offset(document.first_page_words(), thresholds) {
        Some(offset) => offset,
        None => {
            warn!(
                max_offset = thresholds.max_offset,
                "name column offset search exhausted; scanning without offset"
            );
            0.0
        }
    };

    let scan_x = thresholds.name_column_x + offset;
    let names = document
        .pages
        .iter()
        .enumerate()
        .map(|(index, page)| scan_name_column(&page.words, scan_x, index == 0))
        .collect();

    (names, offset)
}

fn is_separator_only(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|character| SEPARATOR_CHARS.contains(&character))
}

fn is_punctuation_only(text: &str) -> bool {
    text.chars()
        .all(|character| character.is_ascii_punctuation() || !character.is_alphanumeric())
}

fn is_upper_case(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}
