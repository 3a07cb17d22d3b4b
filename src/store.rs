//! Item store: the durable item collection.

use crate::error::{Result, TrackerError};
use crate::persist;
use crate::types::{Collection, Item};
use fs2::FileExt;
use parking_lot::{Mutex, MutexGuard};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Owner of the item collection document.
///
/// Every access runs under one store-wide lock. Mutations go through
/// [`ItemStore::begin`], which holds the lock across read, reconcile and
/// write so no two mutations interleave.
pub struct ItemStore {
    path: PathBuf,

    /// Exclusive advisory lock: one writer process per document.
    _lock_file: File,

    /// Serializes every read-modify-write of the document.
    write_lock: Mutex<()>,
}

impl ItemStore {
    /// Open the store backed by `path`. The document need not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let lock_file = Self::acquire_lock(&path)?;

        Ok(Self {
            path,
            _lock_file: lock_file,
            write_lock: Mutex::new(()),
        })
    }

    /// Read the whole collection. Missing document reads as empty.
    pub fn load(&self) -> Result<Collection> {
        let _lock = self.write_lock.lock();
        self.read_unlocked()
    }

    /// Replace the whole collection.
    pub fn save(&self, items: &[Item]) -> Result<()> {
        let _lock = self.write_lock.lock();
        persist::write_json(&self.path, items)
    }

    /// Replace the collection with seed data, e.g. from an import.
    pub fn seed(&self, items: Collection) -> Result<()> {
        tracing::info!(count = items.len(), path = %self.path.display(), "seeding item store");
        self.save(&items)
    }

    /// Start a read-modify-write transaction.
    ///
    /// The store lock is held until the returned transaction is dropped.
    /// Changes made through [`StoreTxn::items_mut`] reach disk only on
    /// [`StoreTxn::commit`].
    pub fn begin(&self) -> Result<StoreTxn<'_>> {
        let guard = self.write_lock.lock();
        let items = self.read_unlocked()?;
        Ok(StoreTxn {
            store: self,
            _guard: guard,
            items,
        })
    }

    /// Get the document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_unlocked(&self) -> Result<Collection> {
        Ok(persist::read_json(&self.path)?.unwrap_or_default())
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".lock");
        let lock_file = File::create(path.with_file_name(name))?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| TrackerError::Locked)?;

        Ok(lock_file)
    }
}

/// An open read-modify-write on the item store.
pub struct StoreTxn<'a> {
    store: &'a ItemStore,
    _guard: MutexGuard<'a, ()>,
    items: Collection,
}

impl StoreTxn<'_> {
    /// The collection as of the start of the transaction, plus any edits.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Collection {
        &mut self.items
    }

    /// Persist the current collection. The lock stays held.
    pub fn commit(&self) -> Result<()> {
        persist::write_json(&self.store.path, &self.items)
    }
}
