//! This module provides the key/value storage engine implementations backing
//! the dictionary server.
//! The two engines that are implemented are [`FileStore`], which keeps one
//! unit file per key the way the original server did, and a wrapper around the
//! [`sled`] database engine, selectable at server start.
//!
//! [`sled`]: https://docs.rs/sled/latest/sled/
use crate::Result;

/// A trait for the basic functionality of a key/value storage engine
pub trait DictEngine: Clone + Send + 'static {
    /// sets a `key` and `value`
    ///
    /// If the given `key` already exists the previous `value` will be fully
    /// replaced, never appended to or merged with.
    fn set(&self, key: String, value: String) -> Result<()>;

    /// Gets the value associated with the given `key`
    ///
    /// Returns `None` if the given `key` does not exist. An empty stored
    /// value is reported as `None` as well; the wire protocol cannot tell
    /// the two apart and the engines keep that contract uniform.
    fn get(&self, key: String) -> Result<Option<String>>;

    /// Removes the given `key` (and associated value) from the store
    ///
    /// # Errors
    ///
    /// Returns [`DictError::KeyNotFound`] if the given `key` is not found.
    ///
    /// [`DictError::KeyNotFound`]: ../enum.DictError.html
    fn remove(&self, key: String) -> Result<()>;
}

mod file_store;
mod sled_store;

pub use self::file_store::{FileStore, MAX_VALUE_SIZE};
pub use self::sled_store::SledStore;
