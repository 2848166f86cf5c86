//! File-backed entity store.
//!
//! Every durable record in the system lives here: one directory per
//! [`Collection`], one JSON file per entity, named by the entity id. The
//! per-entity-file layout makes `create` naturally exclusive and `delete`
//! final, at the cost of no cross-entity atomicity - a multi-entity
//! operation that fails partway leaves the earlier writes committed.
//! Components layered on the store are written defensively for this.
//!
//! Entity ids arrive through the validated newtypes in `pronto-core`
//! (`Email`, `CartId`, ...); the store re-checks them before touching the
//! filesystem so a raw string can never escape the data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Named entity collections, one directory each under the data root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Tokens,
    Carts,
    Menus,
    Orders,
}

impl Collection {
    /// Every collection, in directory-creation order.
    pub const ALL: [Self; 5] = [
        Self::Users,
        Self::Tokens,
        Self::Carts,
        Self::Menus,
        Self::Orders,
    ];

    /// Directory name of this collection under the data root.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Tokens => "tokens",
            Self::Carts => "carts",
            Self::Menus => "menus",
            Self::Orders => "orders",
        }
    }
}

/// Errors that can occur during entity store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entity with the given id exists in the collection.
    #[error("entity not found")]
    NotFound,

    /// An entity with the given id already exists in the collection.
    #[error("entity already exists")]
    AlreadyExists,

    /// The stored bytes cannot be deserialized into a record. An empty file
    /// is corrupt, not an empty record.
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),

    /// The id would escape the collection directory.
    #[error("invalid entity id: {0:?}")]
    InvalidId(String),

    /// Underlying filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable, collection-scoped CRUD over serialized records.
///
/// The store is the only component that touches the data directory; every
/// other component goes through these five primitives.
#[derive(Debug, Clone)]
pub struct EntityStore {
    base_dir: PathBuf,
}

impl EntityStore {
    /// Create a store handle rooted at `base_dir`.
    ///
    /// The directory tree is not touched until [`Self::init`] is called.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The data directory this store is rooted at.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the collection directories if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if a directory cannot be created.
    pub async fn init(&self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            fs::create_dir_all(self.base_dir.join(collection.dir_name())).await?;
        }
        Ok(())
    }

    /// Write a new entity. Fails if an entity with that id already exists;
    /// an existing record is never silently overwritten.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` on id collision, `InvalidId` for unsafe ids,
    /// `Corrupt` if the record cannot be serialized, or `Io` on filesystem
    /// failure.
    pub async fn create<T: Serialize>(
        &self,
        collection: Collection,
        id: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let path = self.entity_path(collection, id)?;
        let bytes =
            serde_json::to_vec(record).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        // create_new gives exclusive-create semantics without a separate
        // existence check.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists,
                _ => StoreError::Io(e),
            })?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        Ok(())
    }

    /// Read an entity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such entity exists, or `Corrupt` if the
    /// stored bytes (including an empty file) cannot be deserialized.
    pub async fn read<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<T, StoreError> {
        let path = self.entity_path(collection, id)?;
        let bytes = fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound,
            _ => StoreError::Io(e),
        })?;

        if bytes.is_empty() {
            return Err(StoreError::Corrupt("empty file".to_owned()));
        }

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Replace an existing entity's full contents. There are no
    /// partial/merge semantics; callers read-modify-write the whole record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entity does not exist.
    pub async fn update<T: Serialize>(
        &self,
        collection: Collection,
        id: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let path = self.entity_path(collection, id)?;
        let bytes =
            serde_json::to_vec(record).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        // Opening without `create` refuses to conjure the entity into
        // existence on update.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StoreError::NotFound,
                _ => StoreError::Io(e),
            })?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        Ok(())
    }

    /// Remove an entity permanently.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entity does not exist.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let path = self.entity_path(collection, id)?;
        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound,
            _ => StoreError::Io(e),
        })
    }

    /// List the ids present in a collection, sorted. An empty collection is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the collection directory cannot be read.
    pub async fn list(&self, collection: Collection) -> Result<Vec<String>, StoreError> {
        let dir = self.base_dir.join(collection.dir_name());
        let mut entries = fs::read_dir(&dir).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with('.') {
                continue;
            }
            if let Some(id) = name.strip_suffix(".json") {
                ids.push(id.to_owned());
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }

    /// Resolve the file path of an entity, rejecting ids that could escape
    /// the collection directory.
    fn entity_path(&self, collection: Collection, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty()
            || id.starts_with('.')
            || id.contains(['/', '\\'])
            || id.contains(char::is_whitespace)
        {
            return Err(StoreError::InvalidId(id.to_owned()));
        }
        Ok(self
            .base_dir
            .join(collection.dir_name())
            .join(format!("{id}.json")))
    }
}
