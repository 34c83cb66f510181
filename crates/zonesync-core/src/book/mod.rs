// # Address Book Store
//
// Durable mapping from client name to that client's named address
// records. This is the only durable state in the system.
//
// ## Transactions
//
// All mutation happens through a `Transaction` obtained from
// `AddressBook::begin()`. The transaction holds the store mutex for its
// whole lifetime, so the read-merge-render-write window of one request
// can never interleave with another request's commit. Mutations are
// applied to a working copy; `commit()` persists the copy atomically
// and installs it, while dropping the transaction without committing
// leaves no observable effect.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename via a `.tmp` sibling
// - Automatic backup: `.backup` of the last known good file
// - Corruption detection: JSON validation on load, fall back to backup
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "clients": {
//     "alice": { "eth0": "2001:db8::10" }
//   }
// }
// ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};

/// Book file format version, for future migration
const BOOK_FILE_VERSION: &str = "1.0";

/// Named address records of one client: `address_id -> raw stored value`
pub type ClientRecords = BTreeMap<String, String>;

/// The full book: `client_name -> records`.
///
/// Both levels are `BTreeMap` so enumeration order, and therefore the
/// rendered zone file, is deterministic.
pub type BookContents = BTreeMap<String, ClientRecords>;

/// Serializable book file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct BookFileFormat {
    version: String,
    clients: BookContents,
}

/// Durable per-client address book with exclusive transactions
///
/// `open()` gives a file-backed book with crash recovery; `ephemeral()`
/// gives an in-memory book for tests and sandbox runs.
#[derive(Debug, Clone)]
pub struct AddressBook {
    path: Option<PathBuf>,
    contents: Arc<Mutex<BookContents>>,
}

impl AddressBook {
    /// Create or load a file-backed address book
    ///
    /// Creates parent directories if needed, then loads existing
    /// contents, falling back to the `.backup` file on corruption and
    /// to an empty book if both are unreadable.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::store(format!(
                    "failed to create book directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let contents = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path: Some(path),
            contents: Arc::new(Mutex::new(contents)),
        })
    }

    /// Create an in-memory book with no persistence
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            contents: Arc::new(Mutex::new(BookContents::new())),
        }
    }

    /// Begin an exclusive transaction.
    ///
    /// Blocks until no other transaction is in flight. The returned
    /// transaction keeps the store locked until it is committed or
    /// dropped.
    pub async fn begin(&self) -> Transaction<'_> {
        let guard = self.contents.lock().await;
        let working = guard.clone();
        Transaction {
            path: self.path.as_deref(),
            guard,
            working,
        }
    }

    /// Load book contents with automatic backup recovery
    async fn load_with_recovery(path: &Path) -> Result<BookContents> {
        match Self::load(path).await {
            Ok(contents) => {
                tracing::debug!(
                    clients = contents.len(),
                    path = %path.display(),
                    "loaded address book"
                );
                Ok(contents)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "address book {} appears corrupted: {}. Attempting backup recovery.",
                    path.display(),
                    e
                );

                let backup = backup_path(path);
                if backup.exists() {
                    match Self::load(&backup).await {
                        Ok(contents) => {
                            tracing::info!(
                                clients = contents.len(),
                                "recovered address book from backup"
                            );
                            if let Err(restore_err) = fs::copy(&backup, path).await {
                                tracing::error!(
                                    "failed to restore book file from backup: {}",
                                    restore_err
                                );
                            }
                            Ok(contents)
                        }
                        Err(backup_err) => {
                            tracing::error!(
                                "backup also unreadable: {}. Starting with empty book.",
                                backup_err
                            );
                            Ok(BookContents::new())
                        }
                    }
                } else {
                    tracing::warn!("no backup file found, starting with empty book");
                    Ok(BookContents::new())
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Load book contents from one file
    async fn load(path: &Path) -> Result<BookContents> {
        if !path.exists() {
            tracing::debug!("book file does not exist yet: {}", path.display());
            return Ok(BookContents::new());
        }

        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| Error::store(format!("failed to read {}: {}", path.display(), e)))?;

        let file: BookFileFormat = serde_json::from_str(&raw)?;

        if file.version != BOOK_FILE_VERSION {
            tracing::warn!(
                "book file version mismatch: expected {}, got {}. Loading anyway.",
                BOOK_FILE_VERSION,
                file.version
            );
        }

        Ok(file.clients)
    }
}

/// An exclusive read-modify-write transaction on the address book
///
/// Holds the store mutex; at most one exists at a time. Mutations only
/// become visible (and durable, for file-backed books) on `commit()`.
#[derive(Debug)]
pub struct Transaction<'a> {
    path: Option<&'a Path>,
    guard: MutexGuard<'a, BookContents>,
    working: BookContents,
}

impl Transaction<'_> {
    /// Records currently stored for one client, including pending writes
    pub fn records(&self, client: &str) -> Option<&ClientRecords> {
        self.working.get(client)
    }

    /// Write or overwrite one record in a client's namespace.
    ///
    /// Records are replaced wholesale, never merged field-by-field.
    pub fn set(&mut self, client: &str, address_id: &str, value: &str) {
        self.working
            .entry(client.to_string())
            .or_default()
            .insert(address_id.to_string(), value.to_string());
    }

    /// Full view of the book including pending writes, for rendering
    pub fn snapshot(&self) -> &BookContents {
        &self.working
    }

    /// Persist pending writes and make them visible.
    ///
    /// For file-backed books the working copy is written to a `.tmp`
    /// sibling, the previous file is copied to `.backup`, and the
    /// temporary file is renamed into place. Only after the write
    /// succeeds does the in-memory book take the new contents; a write
    /// failure leaves both disk and memory untouched.
    pub async fn commit(mut self) -> Result<()> {
        if let Some(path) = self.path {
            write_atomic(path, &self.working).await?;
        }
        *self.guard = std::mem::take(&mut self.working);
        Ok(())
    }
}

/// Atomically replace `path` with the serialized book contents
async fn write_atomic(path: &Path, contents: &BookContents) -> Result<()> {
    let file = BookFileFormat {
        version: BOOK_FILE_VERSION.to_string(),
        clients: contents.clone(),
    };
    let json = serde_json::to_string_pretty(&file)?;

    let temp = temp_path(path);
    {
        let mut f = fs::File::create(&temp).await.map_err(|e| {
            Error::store(format!("failed to create {}: {}", temp.display(), e))
        })?;
        f.write_all(json.as_bytes()).await.map_err(|e| {
            Error::store(format!("failed to write {}: {}", temp.display(), e))
        })?;
        f.flush()
            .await
            .map_err(|e| Error::store(format!("failed to flush {}: {}", temp.display(), e)))?;
    }

    if path.exists()
        && let Err(e) = fs::copy(path, backup_path(path)).await
    {
        tracing::warn!("failed to create book backup: {}", e);
    }

    fs::rename(&temp, path).await.map_err(|e| {
        Error::store(format!(
            "failed to rename {} to {}: {}",
            temp.display(),
            path.display(),
            e
        ))
    })?;

    tracing::trace!("address book written to {}", path.display());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.to_path_buf();
    temp.set_extension("tmp");
    temp
}

fn backup_path(path: &Path) -> PathBuf {
    let mut backup = path.to_path_buf();
    backup.set_extension("backup");
    backup
}
