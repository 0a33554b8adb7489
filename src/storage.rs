//! Local persistence for emergency contacts.
//!
//! Contacts live in a single `SQLite` database under the storage root:
//!
//! ```text
//! <root>/
//!   contacts.sqlite   # Ordered emergency contacts
//! ```

mod contacts;

use std::{fs, io, path::PathBuf};

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::task;
use uuid::Uuid;

use crate::error::SosError;
use crate::model::Contact;
use crate::ports::EmergencyContactStore;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("contact not found: {0}")]
    ContactNotFound(Uuid),

    #[error("corrupt contact store: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS contact (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        phone TEXT NOT NULL,
        position INTEGER NOT NULL
    );
";

/// Local file-based storage for emergency contacts.
///
/// Cheap to clone; each operation opens its own connection.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.beacon/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".beacon"))
    }

    /// Opens the contact database, creating the schema on first use.
    fn open_db(&self) -> Result<Connection> {
        let conn = Connection::open(self.root.join("contacts.sqlite"))?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }
}

#[async_trait]
impl EmergencyContactStore for Storage {
    /// Reads on the blocking pool; rusqlite calls block.
    async fn contacts(&self) -> crate::error::Result<Vec<Contact>> {
        let storage = self.clone();
        task::spawn_blocking(move || storage.list_contacts())
            .await
            .map_err(|e| SosError::Store(format!("contact read aborted: {e}")))?
            .map_err(|e| SosError::Store(e.to_string()))
    }
}
