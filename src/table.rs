//! Backend seam for the list table.
//!
//! [`crate::store::ListStore`] is written against the [`TableClient`]
//! trait, so the remote table can be swapped for
//! [`crate::memory::MemoryTable`] in tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::schema::{ATTR_PK, ATTR_SK};

/// A single attribute value.
///
/// Only the shapes this table actually stores: strings and booleans.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attr {
    /// String attribute.
    S(String),
    /// Boolean attribute.
    Bool(bool),
}

impl Attr {
    /// String payload, if this is a string attribute.
    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    /// Boolean payload, if this is a boolean attribute.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::S(_) => None,
        }
    }
}

/// Composite primary key of one row.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Partition key.
    pub pk: String,
    /// Sort key.
    pub sk: String,
}

impl Key {
    /// Create a key.
    #[must_use]
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

/// One stored row: named attributes, including the key pair.
pub type Row = HashMap<String, Attr>;

/// Extract the key pair from a row.
#[must_use]
pub fn row_key(row: &Row) -> Option<Key> {
    let pk = row.get(ATTR_PK)?.as_s()?;
    let sk = row.get(ATTR_SK)?.as_s()?;
    Some(Key::new(pk, sk))
}

/// A single request inside a batched write.
#[derive(Clone, Debug)]
pub enum WriteOp {
    /// Insert or replace a row.
    Put(Row),
    /// Remove the row with this key.
    Delete(Key),
}

/// Asynchronous client for one wide-column table.
///
/// Implementations must return `query_prefix` rows in ascending sort-key
/// order; the item index encoding relies on it. Calls carry no implicit
/// retry; failures propagate to the caller.
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Return the rows with partition key `pk` whose sort key starts
    /// with `sk_prefix`, in ascending sort-key order.
    ///
    /// With `keys_only`, rows may be reduced to their key attributes.
    /// `limit` caps the number of rows returned.
    ///
    /// # Errors
    /// Returns [`crate::error::StoreError::Backend`] on transport or
    /// service failure.
    async fn query_prefix(
        &self,
        pk: &str,
        sk_prefix: &str,
        keys_only: bool,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>>;

    /// Fetch a single row by key.
    ///
    /// # Errors
    /// Returns [`crate::error::StoreError::Backend`] on transport or
    /// service failure.
    async fn get(&self, key: &Key) -> StoreResult<Option<Row>>;

    /// Insert or replace a row unconditionally.
    ///
    /// # Errors
    /// Returns [`crate::error::StoreError::Backend`] on transport or
    /// service failure.
    async fn put(&self, row: Row) -> StoreResult<()>;

    /// Insert a row only if no row with the same key exists.
    ///
    /// # Errors
    /// Returns [`crate::error::StoreError::ConditionFailed`] when the
    /// key is already taken, [`crate::error::StoreError::Backend`]
    /// otherwise.
    async fn put_if_absent(&self, row: Row) -> StoreResult<()>;

    /// Apply up to [`crate::schema::BATCH_WRITE_LIMIT`] writes in one
    /// call.
    ///
    /// # Errors
    /// Returns [`crate::error::StoreError::BatchTooLarge`] when the
    /// slice is over the limit, and
    /// [`crate::error::StoreError::Throttled`] when the backend leaves
    /// part of the batch unapplied.
    async fn batch_write(&self, ops: &[WriteOp]) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_accessors() {
        assert_eq!(Attr::S("x".to_string()).as_s(), Some("x"));
        assert_eq!(Attr::S("x".to_string()).as_bool(), None);
        assert_eq!(Attr::Bool(true).as_bool(), Some(true));
        assert_eq!(Attr::Bool(true).as_s(), None);
    }

    #[test]
    fn test_row_key() {
        let row = Row::from([
            (ATTR_PK.to_string(), Attr::S("USER#u1".to_string())),
            (ATTR_SK.to_string(), Attr::S("LIST#l1".to_string())),
        ]);
        assert_eq!(row_key(&row), Some(Key::new("USER#u1", "LIST#l1")));
        assert_eq!(row_key(&Row::new()), None);
    }
}
