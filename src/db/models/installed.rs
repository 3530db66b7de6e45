// src/db/models/installed.rs

//! Installed recipe model

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use std::path::PathBuf;

use super::BinaryLink;

/// A recipe that has been installed into the cellar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledRecipe {
    pub id: Option<i64>,
    pub name: String,
    pub version: String,
    /// Install prefix (`<root>/cellar/<name>/<version>`)
    pub prefix: PathBuf,
    /// Verified source checksum, `sha256:<hex>`
    pub checksum: String,
    /// RFC 3339 timestamp
    pub installed_at: String,
    pub links: Vec<BinaryLink>,
}

impl InstalledRecipe {
    pub fn new(name: &str, version: &str, prefix: PathBuf, checksum: String) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            version: version.to_string(),
            prefix,
            checksum,
            installed_at: chrono::Utc::now().to_rfc3339(),
            links: Vec::new(),
        }
    }

    /// Insert this record and its links
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO installed (name, version, prefix, checksum, installed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &self.name,
                &self.version,
                self.prefix.to_string_lossy(),
                &self.checksum,
                &self.installed_at,
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);

        for link in &self.links {
            link.insert(conn, id)?;
        }

        Ok(id)
    }

    /// Find an installed recipe by name, with its links
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, version, prefix, checksum, installed_at FROM installed WHERE name = ?1",
        )?;

        let mut installed = match stmt.query_row([name], Self::from_row).optional()? {
            Some(i) => i,
            None => return Ok(None),
        };

        if let Some(id) = installed.id {
            installed.links = BinaryLink::find_by_installed(conn, id)?;
        }

        Ok(Some(installed))
    }

    /// List all installed recipes, with links, ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, version, prefix, checksum, installed_at FROM installed ORDER BY name",
        )?;

        let mut all = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for installed in &mut all {
            if let Some(id) = installed.id {
                installed.links = BinaryLink::find_by_installed(conn, id)?;
            }
        }

        Ok(all)
    }

    /// Delete a record by name; links go with it
    pub fn delete_by_name(conn: &Connection, name: &str) -> Result<bool> {
        let removed = conn.execute("DELETE FROM installed WHERE name = ?1", [name])?;
        Ok(removed > 0)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let prefix: String = row.get(3)?;
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            version: row.get(2)?,
            prefix: PathBuf::from(prefix),
            checksum: row.get(4)?,
            installed_at: row.get(5)?,
            links: Vec::new(),
        })
    }
}
