use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::extract::{DEFAULT_DB_FILE, LATEST_MANIFEST_FILE};
use crate::model::ExtractRunManifest;
use crate::util::read_json_file;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_path = args
        .cache_root
        .join("manifests")
        .join(LATEST_MANIFEST_FILE);
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join(DEFAULT_DB_FILE));

    info!(cache_root = %args.cache_root.display(), "status requested");

    if manifest_path.exists() {
        let manifest: ExtractRunManifest = read_json_file(&manifest_path)?;

        info!(
            run_id = %manifest.run_id,
            manual_id = %manifest.manual_id,
            format = %manifest.format,
            layout_source = %manifest.layout_source,
            started_at = %manifest.started_at,
            updated_at = %manifest.updated_at,
            pages = manifest.counts.page_count,
            variables = manifest.counts.variable_count,
            bound_tables = manifest.counts.bound_table_count,
            review_needed = manifest.counts.review_needed_count,
            total_observations = manifest.total_observations.unwrap_or_default(),
            command = %manifest.command,
            "loaded latest extract manifest"
        );
        for warning in &manifest.warnings {
            warn!(run_id = %manifest.run_id, "{warning}");
        }
    } else {
        warn!(path = %manifest_path.display(), "extract manifest missing");
    }

    if db_path.exists() {
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let manuals = query_count(&conn, "SELECT COUNT(*) FROM manuals").unwrap_or(0);
        let variables = query_count(&conn, "SELECT COUNT(*) FROM variables").unwrap_or(0);
        let coded_values = query_count(&conn, "SELECT COUNT(*) FROM coded_values").unwrap_or(0);
        let review_needed =
            query_count(&conn, "SELECT COUNT(*) FROM variables WHERE needs_review = 1")
                .unwrap_or(0);

        info!(
            path = %db_path.display(),
            manuals,
            variables,
            coded_values,
            review_needed,
            "dictionary store status"
        );
    } else {
        warn!(path = %db_path.display(), "dictionary store missing");
    }

    Ok(())
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get::<_, i64>(0))?;
    Ok(count)
}
