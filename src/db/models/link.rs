// src/db/models/link.rs

//! Binary link model

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A command-line binary symlinked from the prefix into the shared bin dir
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryLink {
    pub link_path: PathBuf,
    pub target_path: PathBuf,
}

impl BinaryLink {
    pub fn new(link_path: PathBuf, target_path: PathBuf) -> Self {
        Self {
            link_path,
            target_path,
        }
    }

    pub(crate) fn insert(&self, conn: &Connection, installed_id: i64) -> Result<()> {
        conn.execute(
            "INSERT INTO links (installed_id, link_path, target_path) VALUES (?1, ?2, ?3)",
            params![
                installed_id,
                self.link_path.to_string_lossy(),
                self.target_path.to_string_lossy(),
            ],
        )?;
        Ok(())
    }

    pub(crate) fn find_by_installed(conn: &Connection, installed_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT link_path, target_path FROM links WHERE installed_id = ?1 ORDER BY link_path",
        )?;

        let links = stmt
            .query_map([installed_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(links)
    }

    /// Name of the installed recipe that owns `link_path`, if any
    pub(crate) fn find_owner(conn: &Connection, link_path: &Path) -> Result<Option<String>> {
        let owner = conn
            .query_row(
                "SELECT i.name FROM links l JOIN installed i ON i.id = l.installed_id
                 WHERE l.link_path = ?1",
                [link_path.to_string_lossy()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(owner)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let link: String = row.get(0)?;
        let target: String = row.get(1)?;
        Ok(Self::new(PathBuf::from(link), PathBuf::from(target)))
    }
}
