// src/db/mod.rs

//! Installed-recipe registry backed by SQLite

pub mod models;
pub mod schema;

use crate::error::{Error, Result};
use models::{BinaryLink, InstalledRecipe};
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create the database file (and parent directory) and apply migrations
pub fn init(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = open(db_path)?;
    drop(conn);
    Ok(())
}

/// Open a connection with foreign keys enabled and the schema migrated
pub fn open(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure(&conn)?;
    Ok(conn)
}

/// In-memory registry, used by tests
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
    schema::migrate(conn)
}

/// Run `f` inside a transaction, committing on success
pub fn transaction<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let result = f(&tx)?;
    tx.commit()?;
    Ok(result)
}

/// Handle on the registry database
///
/// Opens a fresh connection per operation so the handle can be shared across
/// worker threads.
#[derive(Debug, Clone)]
pub struct Registry {
    db_path: PathBuf,
}

impl Registry {
    /// Open (creating if needed) the registry at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        init(db_path)?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        open(&self.db_path)
    }

    /// Record an install, replacing any previous record for the same name
    pub fn record(&self, installed: &mut InstalledRecipe) -> Result<()> {
        let mut conn = self.connect()?;
        transaction(&mut conn, |tx| {
            InstalledRecipe::delete_by_name(tx, &installed.name)?;
            installed.insert(tx)?;
            Ok(())
        })?;
        debug!("Recorded install of {} {}", installed.name, installed.version);
        Ok(())
    }

    /// Recipe that owns a link in the shared bin directory
    pub fn link_owner(&self, link_path: &Path) -> Result<Option<String>> {
        let conn = self.connect()?;
        BinaryLink::find_owner(&conn, link_path)
    }

    pub fn get(&self, name: &str) -> Result<Option<InstalledRecipe>> {
        let conn = self.connect()?;
        InstalledRecipe::find_by_name(&conn, name)
    }

    /// Like [`Registry::get`], but a missing entry is `NotFound`
    pub fn require(&self, name: &str) -> Result<InstalledRecipe> {
        self.get(name)?
            .ok_or_else(|| Error::NotFound(format!("{} is not installed", name)))
    }

    pub fn is_installed(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.is_some())
    }

    pub fn list(&self) -> Result<Vec<InstalledRecipe>> {
        let conn = self.connect()?;
        InstalledRecipe::list_all(&conn)
    }

    /// Forget an installed recipe; returns whether it was present
    pub fn remove(&self, name: &str) -> Result<bool> {
        let conn = self.connect()?;
        InstalledRecipe::delete_by_name(&conn, name)
    }
}
