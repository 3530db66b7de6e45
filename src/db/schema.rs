// src/db/schema.rs

//! Registry schema and migrations
//!
//! The registry records which recipes are installed, where, and which bin
//! links each install created. Schema changes are applied as numbered
//! migrations tracked in `schema_version`.

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

fn init_schema_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version (0 for a fresh database)
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    init_schema_version(conn)?;

    let version = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Apply all pending migrations
pub fn migrate(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version >= SCHEMA_VERSION {
        debug!("Registry schema is up to date (version {})", current_version);
        return Ok(());
    }

    for version in (current_version + 1)..=SCHEMA_VERSION {
        info!("Applying registry migration to version {}", version);
        if version == 1 {
            migrate_v1(conn)?;
        }
        set_schema_version(conn, version)?;
    }

    Ok(())
}

/// Initial schema
///
/// - installed: one row per installed recipe (name is unique)
/// - links: symlinks created in the shared bin directory
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE installed (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            version TEXT NOT NULL,
            prefix TEXT NOT NULL,
            checksum TEXT NOT NULL,
            installed_at TEXT NOT NULL
        );

        CREATE TABLE links (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            installed_id INTEGER NOT NULL,
            link_path TEXT NOT NULL UNIQUE,
            target_path TEXT NOT NULL,
            FOREIGN KEY (installed_id) REFERENCES installed(id) ON DELETE CASCADE
        );

        CREATE INDEX idx_links_installed_id ON links(installed_id);
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('installed', 'links')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }
}
