//! Storage backends for the serialized layout

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{PersistError, PersistResult};

/// Somewhere the layout document is kept between runs.
///
/// Stores move opaque text; encoding and migration happen above them.
pub trait LayoutStore {
    /// Returns the stored document, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self) -> PersistResult<Option<String>>;

    /// Replaces the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, contents: &str) -> PersistResult<()>;

    /// Keeps a copy of a document that could not be loaded, so that the
    /// next save does not destroy it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn backup(&self, contents: &str) -> PersistResult<()>;
}

/// A JSON file on disk.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write leaves the previous layout intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for `path`. Nothing is touched until the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns where [`LayoutStore::backup`] writes, `<path>.bak`.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    fn ensure_parent(&self) -> PersistResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LayoutStore for JsonFileStore {
    fn load(&self) -> PersistResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, contents: &str) -> PersistResult<()> {
        self.ensure_parent()?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn backup(&self, contents: &str) -> PersistResult<()> {
        self.ensure_parent()?;
        let backup = self.backup_path();
        std::fs::write(&backup, contents).map_err(|source| PersistError::Io {
            path: backup.clone(),
            source,
        })?;
        tracing::debug!(path = %backup.display(), "Layout backup written");
        Ok(())
    }
}

/// An in-memory store; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<String>>>,
    backup: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `contents`.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(contents.into()))),
            backup: Rc::default(),
        }
    }

    /// Returns a copy of the last saved document.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Returns a copy of the last backed-up document.
    #[must_use]
    pub fn backup_contents(&self) -> Option<String> {
        self.backup.borrow().clone()
    }
}

impl LayoutStore for MemoryStore {
    fn load(&self) -> PersistResult<Option<String>> {
        Ok(self.contents())
    }

    fn save(&self, contents: &str) -> PersistResult<()> {
        *self.slot.borrow_mut() = Some(contents.to_owned());
        Ok(())
    }

    fn backup(&self, contents: &str) -> PersistResult<()> {
        *self.backup.borrow_mut() = Some(contents.to_owned());
        Ok(())
    }
}
