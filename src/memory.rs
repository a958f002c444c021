//! In-process table backend for tests and local development.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::schema::{ATTR_PK, ATTR_SK, BATCH_WRITE_LIMIT};
use crate::table::{Attr, Key, Row, TableClient, WriteOp};

/// Ordered in-memory table with the remote backend's write semantics:
/// conditional puts, the batch-write ceiling, and sort-key ordered
/// prefix queries.
#[derive(Debug, Default)]
pub struct MemoryTable {
    rows: Mutex<BTreeMap<(String, String), Row>>,
}

impl MemoryTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<(String, String), Row>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key_of(row: &Row) -> StoreResult<(String, String)> {
        let pk = row.get(ATTR_PK).and_then(Attr::as_s);
        let sk = row.get(ATTR_SK).and_then(Attr::as_s);
        match (pk, sk) {
            (Some(pk), Some(sk)) => Ok((pk.to_string(), sk.to_string())),
            _ => Err(StoreError::Backend(
                "row is missing its key attributes".to_string(),
            )),
        }
    }
}

#[async_trait]
impl TableClient for MemoryTable {
    async fn query_prefix(
        &self,
        pk: &str,
        sk_prefix: &str,
        keys_only: bool,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>> {
        let rows = self.lock();
        let mut out = Vec::new();

        // BTreeMap iterates (pk, sk) tuples in order, so matches arrive
        // in ascending sort-key order within the partition.
        for ((row_pk, row_sk), row) in rows.iter() {
            if row_pk != pk || !row_sk.starts_with(sk_prefix) {
                continue;
            }
            if keys_only {
                out.push(Row::from([
                    (ATTR_PK.to_string(), Attr::S(row_pk.clone())),
                    (ATTR_SK.to_string(), Attr::S(row_sk.clone())),
                ]));
            } else {
                out.push(row.clone());
            }
            if limit.is_some_and(|l| out.len() >= l) {
                break;
            }
        }

        Ok(out)
    }

    async fn get(&self, key: &Key) -> StoreResult<Option<Row>> {
        let rows = self.lock();
        Ok(rows.get(&(key.pk.clone(), key.sk.clone())).cloned())
    }

    async fn put(&self, row: Row) -> StoreResult<()> {
        let key = Self::key_of(&row)?;
        self.lock().insert(key, row);
        Ok(())
    }

    async fn put_if_absent(&self, row: Row) -> StoreResult<()> {
        let key = Self::key_of(&row)?;
        let mut rows = self.lock();
        if rows.contains_key(&key) {
            return Err(StoreError::ConditionFailed);
        }
        rows.insert(key, row);
        Ok(())
    }

    async fn batch_write(&self, ops: &[WriteOp]) -> StoreResult<()> {
        if ops.len() > BATCH_WRITE_LIMIT {
            return Err(StoreError::BatchTooLarge(ops.len()));
        }
        let mut rows = self.lock();
        for op in ops {
            match op {
                WriteOp::Put(row) => {
                    let key = Self::key_of(row)?;
                    rows.insert(key, row.clone());
                }
                WriteOp::Delete(key) => {
                    rows.remove(&(key.pk.clone(), key.sk.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pk: &str, sk: &str) -> Row {
        Row::from([
            (ATTR_PK.to_string(), Attr::S(pk.to_string())),
            (ATTR_SK.to_string(), Attr::S(sk.to_string())),
            ("Marker".to_string(), Attr::Bool(true)),
        ])
    }

    #[tokio::test]
    async fn test_put_if_absent_rejects_existing_key() {
        let table = MemoryTable::new();
        table.put_if_absent(row("USER#u1", "LIST#a")).await.unwrap();

        let err = table
            .put_if_absent(row("USER#u1", "LIST#a"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConditionFailed));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_query_prefix_is_sorted_and_scoped() {
        let table = MemoryTable::new();
        table.put(row("USER#u1", "LIST#a#ITEM#0001")).await.unwrap();
        table.put(row("USER#u1", "LIST#a#ITEM#0000")).await.unwrap();
        table.put(row("USER#u1", "LIST#a")).await.unwrap();
        table.put(row("USER#u2", "LIST#a")).await.unwrap();

        let rows = table
            .query_prefix("USER#u1", "LIST#a", false, None)
            .await
            .unwrap();
        let sks: Vec<&str> = rows
            .iter()
            .map(|r| r.get(ATTR_SK).and_then(Attr::as_s).unwrap())
            .collect();
        assert_eq!(sks, vec!["LIST#a", "LIST#a#ITEM#0000", "LIST#a#ITEM#0001"]);
    }

    #[tokio::test]
    async fn test_query_keys_only_strips_attributes() {
        let table = MemoryTable::new();
        table.put(row("USER#u1", "LIST#a")).await.unwrap();

        let rows = table
            .query_prefix("USER#u1", "LIST#", true, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].contains_key("Marker"));
    }

    #[tokio::test]
    async fn test_query_limit() {
        let table = MemoryTable::new();
        for i in 0..5 {
            table
                .put(row("USER#u1", &format!("LIST#a#ITEM#000{i}")))
                .await
                .unwrap();
        }
        let rows = table
            .query_prefix("USER#u1", "LIST#a", false, Some(2))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_write_enforces_limit() {
        let table = MemoryTable::new();
        let ops: Vec<WriteOp> = (0..26)
            .map(|i| WriteOp::Put(row("USER#u1", &format!("LIST#a#ITEM#{i:04}"))))
            .collect();

        let err = table.batch_write(&ops).await.unwrap_err();
        assert!(matches!(err, StoreError::BatchTooLarge(26)));
        assert!(table.is_empty());

        table.batch_write(&ops[..25]).await.unwrap();
        assert_eq!(table.len(), 25);
    }

    #[tokio::test]
    async fn test_batch_write_mixes_puts_and_deletes() {
        let table = MemoryTable::new();
        table.put(row("USER#u1", "LIST#a")).await.unwrap();

        table
            .batch_write(&[
                WriteOp::Delete(Key::new("USER#u1", "LIST#a")),
                WriteOp::Put(row("USER#u1", "LIST#b")),
            ])
            .await
            .unwrap();

        assert!(table.get(&Key::new("USER#u1", "LIST#a")).await.unwrap().is_none());
        assert!(table.get(&Key::new("USER#u1", "LIST#b")).await.unwrap().is_some());
    }
}
