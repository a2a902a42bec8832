use tracing::debug;

use super::table_cells::{CodedValueTable, classify_table_cells};
use super::thresholds::LayoutThresholds;
use super::words::{LayoutDocument, PositionedWord, VariableNameEntry, pull_text_between};

#[derive(Debug, Clone, PartialEq)]
pub struct PooledTable {
    pub y: f64,
    pub bbox: [f64; 4],
    pub table: CodedValueTable,
}

impl PooledTable {
    pub fn top(&self) -> f64 {
        self.bbox[1]
    }

    pub fn bottom(&self) -> f64 {
        self.bbox[3]
    }
}

pub type TablePool = Vec<PooledTable>;

pub fn build_table_pools(document: &LayoutDocument) -> Vec<TablePool> {
    document
        .pages
        .iter()
        .enumerate()
        .map(|(page_index, page)| {
            let mut pool = page
                .tables
                .iter()
                .filter_map(|detected| {
                    let cells = detected
                        .cells
                        .iter()
                        .map(|cell| cell.trim())
                        .filter(|cell| !cell.is_empty())
                        .map(str::to_string)
                        .collect::<Vec<String>>();

                    match classify_table_cells(&cells) {
                        Some(table) => Some(PooledTable {
                            y: detected.anchor_y(),
                            bbox: detected.bbox,
                            table,
                        }),
                        None => {
                            debug!(
                                page = page_index,
                                y = detected.anchor_y(),
                                cells = cells.len(),
                                "dropping table that is not a coded-value table"
                            );
                            None
                        }
                    }
                })
                .collect::<TablePool>();
            pool.sort_by(|left, right| left.y.total_cmp(&right.y));
            pool
        })
        .collect()
}

pub fn is_last_on_page(table: &PooledTable, thresholds: &LayoutThresholds) -> bool {
    table.bottom() > thresholds.last_on_page_bottom
}

pub fn is_first_on_page(table: &PooledTable, thresholds: &LayoutThresholds) -> bool {
    table.top() < thresholds.first_on_page_top
}

/// Joins tables cut by a page break when both halves have the same shape.
pub fn merge_split_tables(pools: &mut [TablePool], thresholds: &LayoutThresholds) -> usize {
    let mut merges = 0usize;

    for page_index in 0..pools.len() {
        let Some(last_index) = pools[page_index]
            .iter()
            .position(|table| is_last_on_page(table, thresholds))
        else {
            continue;
        };
        let Some(next_pool) = pools.get(page_index + 1) else {
            break;
        };
        let Some(first_index) = next_pool
            .iter()
            .position(|table| is_first_on_page(table, thresholds))
        else {
            continue;
        };

        let head_shape = pools[page_index][last_index].table.shape();
        let tail_shape = next_pool[first_index].table.shape();
        if head_shape != tail_shape {
            debug!(
                page = page_index,
                "table continuation shape differs from the table it would extend"
            );
            continue;
        }

        let continuation = pools[page_index + 1].remove(first_index);
        pools[page_index][last_index]
            .table
            .merge_from(continuation.table);
        merges += 1;
    }

    merges
}

pub fn stitch_text_across_pages(
    name_y: f64,
    words: &[PositionedWord],
    next_words: &[PositionedWord],
    next_names: &[VariableNameEntry],
    tolerance: f64,
) -> String {
    let head = pull_text_between(name_y, f64::INFINITY, words, tolerance);
    let next_first_y = next_names
        .iter()
        .map(|entry| entry.page_y)
        .min_by(f64::total_cmp)
        .unwrap_or(f64::INFINITY);
    let tail = pull_text_between(0.0, next_first_y, next_words, tolerance);

    format!("{head}\n{tail}")
}
