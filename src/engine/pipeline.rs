use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::binder::bind_names_to_tables;
use super::continuity::{build_table_pools, merge_split_tables, stitch_text_across_pages};
use super::descriptions::{DescriptionQueue, split_descriptions};
use super::dictionary::{DocumentPosition, Variable, order_variables};
use super::labels_current::locate_current_format_names;
use super::labels_old::locate_old_format_names;
use super::observations::parse_total_observations;
use super::patterns::ManualPatterns;
use super::segmenter::segment_variable_text;
use super::thresholds::LayoutThresholds;
use super::words::{LayoutDocument, VariableNameEntry, pull_text_between};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionStats {
    pub page_count: usize,
    pub detected_table_count: usize,
    pub coded_table_count: usize,
    pub merged_table_count: usize,
    pub located_name_count: usize,
    pub duplicate_name_count: usize,
    pub bound_table_count: usize,
    pub description_count: usize,
    pub descriptions_exhausted: usize,
    pub review_needed_count: usize,
    pub column_offset: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedManual {
    pub total_observations: Option<i64>,
    pub variables: Vec<Variable>,
    pub stats: ExtractionStats,
}

pub fn extract_current_format(
    document: &LayoutDocument,
    ocr_text: &str,
    patterns: &ManualPatterns,
    thresholds: &LayoutThresholds,
) -> ExtractedManual {
    let mut stats = ExtractionStats {
        page_count: document.page_count(),
        detected_table_count: document.table_count(),
        ..ExtractionStats::default()
    };

    let names_by_page = document
        .pages
        .iter()
        .map(|page| locate_current_format_names(&page.words))
        .collect::<Vec<Vec<VariableNameEntry>>>();
    stats.located_name_count = names_by_page.iter().map(Vec::len).sum();

    let mut pools = build_table_pools(document);
    stats.coded_table_count = pools.iter().map(Vec::len).sum();
    stats.merged_table_count = merge_split_tables(&mut pools, thresholds);

    let bindings = bind_names_to_tables(&names_by_page, &mut pools, thresholds);
    let (mut bindings, duplicates) = keep_last_by_name(bindings, |binding| &binding.name);
    stats.duplicate_name_count = duplicates;
    bindings.sort_by_key(|binding| binding.position.sort_key());

    let descriptions = split_descriptions(ocr_text, patterns);
    stats.description_count = descriptions.len();
    if descriptions.len() != bindings.len() {
        warn!(
            descriptions = descriptions.len(),
            names = bindings.len(),
            "description count does not match variable count"
        );
    }

    let total_observations = parse_total_observations(document.first_page_words(), patterns);
    let mut queue = DescriptionQueue::new(descriptions);
    let variables = bindings
        .into_iter()
        .filter_map(|binding| {
            // An unnamed label still owns a `Description:` section in the OCR text.
            let description = queue.next_description();
            if binding.name.is_empty() {
                debug!(
                    page = binding.position.page,
                    y = binding.position.y,
                    "label without a name"
                );
                return None;
            }
            Some(Variable::new(
                &binding.name,
                &description,
                binding.table,
                total_observations,
                binding.position,
            ))
        })
        .collect::<Vec<Variable>>();
    stats.descriptions_exhausted = queue.exhausted();
    if queue.remaining() > 0 {
        debug!(leftover = queue.remaining(), "OCR text has more descriptions than variables");
    }

    finish(variables, total_observations, stats)
}

pub fn extract_old_format(
    document: &LayoutDocument,
    patterns: &ManualPatterns,
    thresholds: &LayoutThresholds,
) -> ExtractedManual {
    let mut stats = ExtractionStats {
        page_count: document.page_count(),
        detected_table_count: document.table_count(),
        ..ExtractionStats::default()
    };

    let (mut names_by_page, offset) = locate_old_format_names(document, thresholds);
    for names in &mut names_by_page {
        names.sort_by(|left, right| left.page_y.total_cmp(&right.page_y));
    }
    stats.column_offset = Some(offset);
    stats.located_name_count = names_by_page.iter().map(Vec::len).sum();

    let total_observations = parse_total_observations(document.first_page_words(), patterns);
    let tolerance = thresholds.line_tolerance;

    let mut variables = Vec::<Variable>::new();
    for (page_index, names) in names_by_page.iter().enumerate() {
        let words = &document.pages[page_index].words;

        for (name_index, entry) in names.iter().enumerate() {
            let text = match (names.get(name_index + 1), document.pages.get(page_index + 1)) {
                (Some(next), _) => pull_text_between(entry.page_y, next.page_y, words, tolerance),
                (None, Some(next_page)) => stitch_text_across_pages(
                    entry.page_y,
                    words,
                    &next_page.words,
                    &names_by_page[page_index + 1],
                    tolerance,
                ),
                (None, None) => pull_text_between(entry.page_y, f64::INFINITY, words, tolerance),
            };

            let segmented = segment_variable_text(&text, patterns);
            variables.push(Variable::new(
                &entry.name,
                &segmented.description,
                segmented.values,
                total_observations,
                DocumentPosition::new(page_index, entry.page_y),
            ));
        }
    }

    let (variables, duplicates) = keep_last_by_name(variables, |variable| &variable.name);
    stats.duplicate_name_count = duplicates;

    finish(variables, total_observations, stats)
}

fn finish(
    mut variables: Vec<Variable>,
    total_observations: Option<i64>,
    mut stats: ExtractionStats,
) -> ExtractedManual {
    order_variables(&mut variables);
    stats.bound_table_count = variables
        .iter()
        .filter(|variable| variable.values.is_some())
        .count();
    stats.review_needed_count = variables
        .iter()
        .filter(|variable| variable.needs_review())
        .count();

    info!(
        variables = variables.len(),
        bound_tables = stats.bound_table_count,
        review_needed = stats.review_needed_count,
        "manual extracted"
    );

    ExtractedManual {
        total_observations,
        variables,
        stats,
    }
}

fn keep_last_by_name<T>(items: Vec<T>, name: impl Fn(&T) -> &String) -> (Vec<T>, usize) {
    let mut kept = Vec::<T>::with_capacity(items.len());
    let mut slots = HashMap::<String, usize>::new();
    let mut duplicates = 0usize;

    for item in items {
        let key = name(&item).clone();
        match slots.get(&key) {
            Some(&slot) => {
                warn!(name = %key, "variable name located more than once; keeping the last");
                kept[slot] = item;
                duplicates += 1;
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(item);
            }
        }
    }

    (kept, duplicates)
}
