//! SQLite schema versioning and the destructive migration routine.
//!
//! # Responsibility
//! - Create the current schema on fresh database files.
//! - Replace any stale schema wholesale and reseed the sample dataset.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - There is no field-level upgrade path: a stale store is dropped entirely.
//! - Drop, recreate and reseed run in one transaction; a failure leaves the
//!   previous file untouched.

use crate::db::{DbError, DbResult};
use crate::seed::insert_seed_data;
use chrono::Utc;
use log::{error, info, warn};
use rusqlite::{Connection, TransactionBehavior};

/// Schema version written by this binary.
pub const CURRENT_SCHEMA_VERSION: u32 = 4;

const SCHEMA_SQL: &str = include_str!("0004_schema.sql");

/// What [`apply_migrations`] did to the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Empty file: schema created, no data inserted.
    Fresh,
    /// Schema already at the current version.
    UpToDate,
    /// Stale schema dropped, recreated and reseeded.
    Reset { from_version: u32 },
}

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

/// Brings the connection to the current schema version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `Sqlite`/`Reseed` when the reset transaction fails; it is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationOutcome> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(MigrationOutcome::UpToDate);
    }

    let existing_tables = list_user_tables(conn)?;
    if current_version == 0 && existing_tables.is_empty() {
        let tx = conn.transaction()?;
        tx.execute_batch(SCHEMA_SQL)?;
        stamp_version(&tx, latest)?;
        tx.commit()?;
        info!("event=db_migrate module=db status=ok outcome=fresh version={latest}");
        return Ok(MigrationOutcome::Fresh);
    }

    warn!(
        "event=db_migrate module=db status=start outcome=reset from_version={} to_version={} tables={}",
        current_version,
        latest,
        existing_tables.len()
    );

    match reset_schema(conn, &existing_tables) {
        Ok(()) => {
            info!(
                "event=db_migrate module=db status=ok outcome=reset from_version={current_version} to_version={latest}"
            );
            Ok(MigrationOutcome::Reset {
                from_version: current_version,
            })
        }
        Err(err) => {
            error!(
                "event=db_migrate module=db status=error outcome=reset from_version={current_version} error={err}"
            );
            Err(err)
        }
    }
}

/// Drops every user table, recreates the schema and inserts the seed dataset.
///
/// Used both by stale-version migration and by an explicit store reset.
pub fn reset_schema(conn: &mut Connection, existing_tables: &[String]) -> DbResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    // Tables are dropped parent-first in some orders; checks run at commit.
    tx.execute_batch("PRAGMA defer_foreign_keys = ON;")?;
    for table in existing_tables {
        tx.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\";", table.replace('"', "\"\"")))?;
    }
    tx.execute_batch(SCHEMA_SQL)?;
    stamp_version(&tx, latest_version())?;
    insert_seed_data(&tx, Utc::now()).map_err(|err| DbError::Reseed(err.to_string()))?;
    tx.commit()?;
    Ok(())
}

/// Lists application tables, newest first.
pub fn list_user_tables(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM sqlite_master
         WHERE type = 'table'
           AND name NOT LIKE 'sqlite_%'
         ORDER BY rowid DESC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = Vec::new();
    while let Some(row) = rows.next()? {
        tables.push(row.get(0)?);
    }
    Ok(tables)
}

/// Reads the stored schema version.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn stamp_version(conn: &Connection, version: u32) -> DbResult<()> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))?;
    Ok(())
}
