use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::engine::Variable;
use crate::util::now_utc_string;

pub(crate) const DB_SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone)]
pub(super) struct ManualRecord {
    pub manual_id: String,
    pub filename: String,
    pub sha256: String,
    pub format: String,
    pub page_count: usize,
    pub total_observations: Option<i64>,
    pub extracted_at: String,
}

pub(super) fn open_store(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        crate::util::ensure_directory(parent)?;
    }
    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign_keys")?;
    Ok(())
}

pub(super) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS manuals (
          manual_id TEXT PRIMARY KEY,
          filename TEXT NOT NULL,
          sha256 TEXT NOT NULL,
          format TEXT NOT NULL,
          page_count INTEGER NOT NULL,
          total_observations INTEGER,
          extracted_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS variables (
          manual_id TEXT NOT NULL,
          name TEXT NOT NULL,
          order_index INTEGER NOT NULL,
          description TEXT NOT NULL,
          page INTEGER NOT NULL,
          page_y REAL NOT NULL,
          n INTEGER,
          miss INTEGER,
          minimum REAL,
          maximum REAL,
          units TEXT,
          notes TEXT,
          needs_review INTEGER NOT NULL DEFAULT 0,
          PRIMARY KEY (manual_id, name),
          FOREIGN KEY (manual_id) REFERENCES manuals(manual_id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS coded_values (
          manual_id TEXT NOT NULL,
          variable_name TEXT NOT NULL,
          code_seq INTEGER NOT NULL,
          code TEXT NOT NULL,
          description TEXT NOT NULL,
          count INTEGER,
          PRIMARY KEY (manual_id, variable_name, code_seq),
          FOREIGN KEY (manual_id, variable_name)
            REFERENCES variables(manual_id, name) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_variables_manual_order ON variables(manual_id, order_index);
        CREATE INDEX IF NOT EXISTS idx_variables_review ON variables(needs_review);
        CREATE INDEX IF NOT EXISTS idx_coded_values_code ON coded_values(manual_id, code);
        ",
        )
        .context("failed to create dictionary schema")?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

pub(super) fn replace_manual(
    connection: &mut Connection,
    record: &ManualRecord,
    variables: &[Variable],
) -> Result<usize> {
    let tx = connection.transaction()?;

    tx.execute(
        "DELETE FROM coded_values WHERE manual_id = ?1",
        [&record.manual_id],
    )?;
    tx.execute(
        "DELETE FROM variables WHERE manual_id = ?1",
        [&record.manual_id],
    )?;
    tx.execute(
        "DELETE FROM manuals WHERE manual_id = ?1",
        [&record.manual_id],
    )?;

    tx.execute(
        "
        INSERT INTO manuals(manual_id, filename, sha256, format, page_count, total_observations, extracted_at)
        VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
        params![
            &record.manual_id,
            &record.filename,
            &record.sha256,
            &record.format,
            record.page_count as i64,
            record.total_observations,
            &record.extracted_at
        ],
    )
    .with_context(|| format!("failed to insert manual {}", record.manual_id))?;

    let mut coded_value_count = 0_usize;
    {
        let mut variable_statement = tx.prepare(
            "
            INSERT INTO variables(
              manual_id, name, order_index, description, page, page_y,
              n, miss, minimum, maximum, units, notes, needs_review
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ",
        )?;
        let mut value_statement = tx.prepare(
            "
            INSERT INTO coded_values(manual_id, variable_name, code_seq, code, description, count)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )?;

        for (order_index, variable) in variables.iter().enumerate() {
            let row = variable.dictionary_row();
            variable_statement
                .execute(params![
                    &record.manual_id,
                    &variable.name,
                    order_index as i64,
                    &row.description,
                    variable.position.page as i64,
                    variable.position.y,
                    row.n,
                    row.miss,
                    row.minimum,
                    row.maximum,
                    row.units,
                    row.notes,
                    variable.needs_review() as i64
                ])
                .with_context(|| format!("failed to insert variable {}", variable.name))?;

            let Some(values) = &variable.values else {
                continue;
            };
            for (code_seq, (code, value)) in values.iter().enumerate() {
                value_statement.execute(params![
                    &record.manual_id,
                    &variable.name,
                    code_seq as i64,
                    code,
                    &value.description,
                    value.count
                ])?;
                coded_value_count += 1;
            }
        }
    }

    tx.commit()?;
    Ok(coded_value_count)
}
