use std::path::Path;

use super::DictEngine;
use crate::error::{DictError, Result};
use tracing::debug;

/// A [`DictEngine`] backed by the [`sled`] embedded database.
///
/// Kept around as an alternative to [`FileStore`] for comparison; both
/// engines honor the same contract, including reporting an empty stored
/// value as a missing key.
///
/// [`FileStore`]: ./struct.FileStore.html
#[derive(Debug, Clone)]
pub struct SledStore {
    tree: sled::Db,
}

impl SledStore {
    /// opens (or creates) a sled database rooted at `path`
    pub fn open(path: &Path) -> Result<SledStore> {
        Ok(SledStore {
            tree: sled::open(path)?,
        })
    }
}

impl DictEngine for SledStore {
    fn set(&self, key: String, value: String) -> Result<()> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        self.tree.flush()?;
        debug!(%key, "set");
        Ok(())
    }

    fn get(&self, key: String) -> Result<Option<String>> {
        let value = self
            .tree
            .get(key.as_bytes())?
            .map(|ivec| String::from_utf8_lossy(&ivec).into_owned())
            .filter(|value| !value.is_empty());
        debug!(%key, found = value.is_some(), "get");
        Ok(value)
    }

    fn remove(&self, key: String) -> Result<()> {
        match self.tree.remove(key.as_bytes())? {
            Some(_) => {
                self.tree.flush()?;
                debug!(%key, "del");
                Ok(())
            }
            None => Err(DictError::KeyNotFound),
        }
    }
}
