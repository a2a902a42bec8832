use tracing::debug;

use super::continuity::{PooledTable, TablePool};
use super::dictionary::DocumentPosition;
use super::table_cells::CodedValueTable;
use super::thresholds::LayoutThresholds;
use super::words::VariableNameEntry;

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub position: DocumentPosition,
    pub table: Option<CodedValueTable>,
}

pub fn bind_names_to_tables(
    names_by_page: &[Vec<VariableNameEntry>],
    pools: &mut [TablePool],
    thresholds: &LayoutThresholds,
) -> Vec<Binding> {
    let mut bindings = Vec::new();

    for (page_index, names) in names_by_page.iter().enumerate() {
        let mut ordered = names.iter().collect::<Vec<&VariableNameEntry>>();
        ordered.sort_by(|left, right| left.page_y.total_cmp(&right.page_y));

        for entry in ordered {
            let mut table = match pools.get_mut(page_index) {
                Some(pool) => take_table_below(entry, names, pool, thresholds),
                None => None,
            };

            if table.is_none()
                && entry.page_y > thresholds.lookahead_name_y
                && let Some(next_pool) = pools.get_mut(page_index + 1)
            {
                let next_first_label_y = names_by_page
                    .get(page_index + 1)
                    .and_then(|next_names| {
                        next_names
                            .iter()
                            .map(|next| next.page_y)
                            .min_by(f64::total_cmp)
                    })
                    .unwrap_or(f64::INFINITY);
                table = take_table_at_page_top(next_pool, next_first_label_y, thresholds);
                if table.is_some() {
                    debug!(
                        name = %entry.name,
                        page = page_index,
                        "bound table from top of next page"
                    );
                }
            }

            bindings.push(Binding {
                name: entry.name.clone(),
                position: DocumentPosition::new(page_index, entry.page_y),
                table,
            });
        }
    }

    bindings
}

/// Takes the closest table strictly below `entry` when it lies within the
/// gap ceiling and is not a legend shared by the names on the page.
pub fn take_table_below(
    entry: &VariableNameEntry,
    names_on_page: &[VariableNameEntry],
    pool: &mut TablePool,
    thresholds: &LayoutThresholds,
) -> Option<CodedValueTable> {
    let index = pool.iter().position(|table| table.y > entry.page_y)?;
    let candidate = &pool[index];

    if candidate.y - entry.page_y > thresholds.max_table_gap {
        return None;
    }
    // The check includes `entry` itself.
    if is_legend_table(candidate, names_on_page) {
        debug!(name = %entry.name, y = candidate.y, "skipping legend table");
        return None;
    }

    Some(pool.remove(index).table)
}

pub fn is_legend_table(table: &PooledTable, names_on_page: &[VariableNameEntry]) -> bool {
    names_on_page
        .iter()
        .any(|entry| table.table.has_description(&entry.name.to_uppercase()))
}

fn take_table_at_page_top(
    pool: &mut TablePool,
    first_label_y: f64,
    thresholds: &LayoutThresholds,
) -> Option<CodedValueTable> {
    let index = pool.iter().position(|table| {
        table.top() < thresholds.near_top_of_page && table.y < first_label_y
    })?;
    Some(pool.remove(index).table)
}
