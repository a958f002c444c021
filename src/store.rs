//! Read/write operations for per-user lists.
//!
//! All list data lives in one wide table under the key scheme in
//! [`crate::schema`]: one header row per list plus one row per item,
//! ordered by a zero-padded index in the sort key. The store exposes
//! plain data and takes an already-resolved user id; sessions, tokens
//! and UI state are the application's concern.
//!
//! Writes larger than the backend's batch ceiling are chunked
//! client-side. There is no transaction across batches: `save` and
//! `delete_list` are best-effort sequences, and every operation is
//! independently retryable by the caller.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use crate::config::{PreviewCacheConfig, StoreConfig};
use crate::dynamo::DynamoTable;
use crate::error::{StoreError, StoreResult};
use crate::model::{DEFAULT_LIST_NAME, ListContent, ListItem, ListSummary};
use crate::preview::{ListPreviews, PreviewCache};
use crate::schema::{
    self, ATTR_IS_CHECKED, ATTR_LIST_NAME, ATTR_PK, ATTR_SK, ATTR_TEXT, ATTR_TYPE, ATTR_UPDATED_AT,
    BATCH_WRITE_LIMIT, TYPE_LIST, TYPE_LIST_ITEM,
};
use crate::table::{self, Attr, Key, Row, TableClient, WriteOp};

/// Data access for one table of user-owned lists.
pub struct ListStore {
    table: Arc<dyn TableClient>,
    previews: PreviewCache,
}

impl ListStore {
    /// Create a store over any table client, with default preview
    /// caching.
    #[must_use]
    pub fn new(table: Arc<dyn TableClient>) -> Self {
        Self::with_preview_cache(table, PreviewCacheConfig::default())
    }

    /// Create a store with explicit preview-cache tuning.
    #[must_use]
    pub fn with_preview_cache(table: Arc<dyn TableClient>, cache: PreviewCacheConfig) -> Self {
        Self {
            table,
            previews: PreviewCache::new(cache),
        }
    }

    /// Connect to the configured DynamoDB table using ambient AWS
    /// credentials.
    #[must_use]
    pub fn connect(sdk_config: &aws_config::SdkConfig, config: &StoreConfig) -> Self {
        let table = Arc::new(DynamoTable::new(sdk_config, config));
        Self::with_preview_cache(table, config.preview_cache.clone())
    }

    /// Enumerate a user's lists.
    ///
    /// Returns a summary for every header row under the user's
    /// partition, substituting [`DEFAULT_LIST_NAME`] when a header
    /// carries no name. Item rows share the `LIST#` sort-key prefix, so
    /// classification goes by type tag, not key shape. Order is whatever
    /// the backend returns; callers must not rely on it.
    ///
    /// # Errors
    /// [`StoreError::InvalidId`] for a malformed `user_id`;
    /// [`StoreError::Backend`] when the table call fails.
    pub async fn get_lists(&self, user_id: &str) -> StoreResult<Vec<ListSummary>> {
        schema::validate_id(user_id)?;

        let rows = self
            .table
            .query_prefix(&schema::user_pk(user_id), schema::LIST_PREFIX, false, None)
            .await?;

        let lists: Vec<ListSummary> = rows
            .iter()
            .filter(|row| row_type(row) == Some(TYPE_LIST))
            .filter_map(|row| {
                let sk = row.get(ATTR_SK)?.as_s()?;
                let list_id = schema::list_id_from_sk(sk)?;
                Some(ListSummary {
                    list_id: list_id.to_string(),
                    name: row_name(row),
                })
            })
            .collect();

        tracing::debug!(user_id, count = lists.len(), "enumerated list headers");
        Ok(lists)
    }

    /// Create a list header.
    ///
    /// Write-once-if-absent: the header is written with a fresh
    /// timestamp only when no row occupies the `(user_id, list_id)` key
    /// pair. A lost race (e.g. a duplicate tap) surfaces as
    /// [`StoreError::AlreadyExists`] and leaves the existing header
    /// untouched.
    ///
    /// # Errors
    /// [`StoreError::AlreadyExists`] when the pair is taken;
    /// [`StoreError::InvalidId`] / [`StoreError::Backend`] as above.
    pub async fn create_list(&self, user_id: &str, list_id: &str, name: &str) -> StoreResult<()> {
        schema::validate_id(user_id)?;
        schema::validate_id(list_id)?;

        let result = self
            .table
            .put_if_absent(Self::header_row(user_id, list_id, name))
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(user_id, list_id, "created list header");
                Ok(())
            }
            Err(StoreError::ConditionFailed) => {
                Err(StoreError::AlreadyExists(list_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a list: its header and every item row.
    ///
    /// Deletes are issued in batches of [`BATCH_WRITE_LIMIT`]. Deleting
    /// a list that does not exist is a no-op, not an error.
    ///
    /// # Errors
    /// [`StoreError::InvalidId`] / [`StoreError::Backend`] /
    /// [`StoreError::Throttled`].
    pub async fn delete_list(&self, user_id: &str, list_id: &str) -> StoreResult<()> {
        schema::validate_id(user_id)?;
        schema::validate_id(list_id)?;

        let rows = self
            .table
            .query_prefix(&schema::user_pk(user_id), &schema::list_sk(list_id), true, None)
            .await?;

        let deletes: Vec<WriteOp> = rows
            .iter()
            .filter_map(table::row_key)
            .map(WriteOp::Delete)
            .collect();

        self.write_chunked(&deletes).await?;
        self.previews.invalidate(user_id, list_id);

        tracing::debug!(user_id, list_id, rows = deletes.len(), "deleted list");
        Ok(())
    }

    /// Load a snapshot of one list.
    ///
    /// The header row supplies the name, falling back to
    /// [`DEFAULT_LIST_NAME`] when absent or when no header exists; item
    /// rows arrive in ascending sort-key order, which the index encoding
    /// makes equal to list order. Blank-text items are skipped. A
    /// missing list is not an error: the result is an empty list under
    /// the default name.
    ///
    /// # Errors
    /// [`StoreError::InvalidId`] / [`StoreError::Backend`].
    pub async fn load(&self, user_id: &str, list_id: &str) -> StoreResult<ListContent> {
        schema::validate_id(user_id)?;
        schema::validate_id(list_id)?;

        let rows = self
            .table
            .query_prefix(&schema::user_pk(user_id), &schema::list_sk(list_id), false, None)
            .await?;

        let mut content = ListContent::new(user_id, list_id);
        for row in &rows {
            match row_type(row) {
                Some(TYPE_LIST) => content.name = row_name(row),
                Some(TYPE_LIST_ITEM) => {
                    let text = row.get(ATTR_TEXT).and_then(Attr::as_s).unwrap_or_default();
                    if text.trim().is_empty() {
                        continue;
                    }
                    let is_checked = row
                        .get(ATTR_IS_CHECKED)
                        .and_then(Attr::as_bool)
                        .unwrap_or(false);
                    content.items.push(ListItem::new(text, is_checked));
                }
                _ => {}
            }
        }

        Ok(content)
    }

    /// Persist a list, replacing its stored item set.
    ///
    /// Three phases, each batched at [`BATCH_WRITE_LIMIT`]: delete the
    /// existing item rows, upsert the header with a fresh timestamp,
    /// write the current items under fresh zero-padded indices (an
    /// item's index is its position in the input sequence; blank items
    /// leave gaps and are never persisted).
    ///
    /// The backend offers no transaction across batches, so a failure
    /// mid-save can leave the item set empty or partial while the header
    /// already reflects the new name. The operation is safe to retry
    /// wholesale; concurrent saves of the same list can interleave into
    /// a mix of both writers' items.
    ///
    /// # Errors
    /// [`StoreError::InvalidId`] / [`StoreError::Backend`] /
    /// [`StoreError::Throttled`].
    pub async fn save(&self, list: &ListContent) -> StoreResult<()> {
        schema::validate_id(&list.user_id)?;
        schema::validate_id(&list.list_id)?;

        let pk = schema::user_pk(&list.user_id);

        // Phase 1: clear the existing item rows.
        let existing = self
            .table
            .query_prefix(&pk, &schema::item_prefix(&list.list_id), true, None)
            .await?;
        let deletes: Vec<WriteOp> = existing
            .iter()
            .filter_map(table::row_key)
            .map(WriteOp::Delete)
            .collect();
        self.write_chunked(&deletes).await?;

        // Phase 2: upsert the header.
        self.table
            .put(Self::header_row(&list.user_id, &list.list_id, &list.name))
            .await?;

        // Phase 3: rewrite the items.
        let puts: Vec<WriteOp> = list
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_blank())
            .map(|(index, item)| {
                WriteOp::Put(Self::item_row(&list.user_id, &list.list_id, index, item))
            })
            .collect();
        self.write_chunked(&puts).await?;

        self.previews.invalidate(&list.user_id, &list.list_id);
        tracing::debug!(
            user_id = %list.user_id,
            list_id = %list.list_id,
            deleted = deletes.len(),
            written = puts.len(),
            "saved list"
        );
        Ok(())
    }

    /// Whether a header row exists for `(user_id, list_id)`.
    ///
    /// # Errors
    /// [`StoreError::InvalidId`] / [`StoreError::Backend`].
    pub async fn exists(&self, user_id: &str, list_id: &str) -> StoreResult<bool> {
        schema::validate_id(user_id)?;
        schema::validate_id(list_id)?;

        let key = Key::new(schema::user_pk(user_id), schema::list_sk(list_id));
        Ok(self.table.get(&key).await?.is_some())
    }

    /// Apply writes in batches bounded by the backend limit.
    async fn write_chunked(&self, ops: &[WriteOp]) -> StoreResult<()> {
        for chunk in ops.chunks(BATCH_WRITE_LIMIT) {
            self.table.batch_write(chunk).await?;
        }
        Ok(())
    }

    fn now_iso8601() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn header_row(user_id: &str, list_id: &str, name: &str) -> Row {
        Row::from([
            (ATTR_PK.to_string(), Attr::S(schema::user_pk(user_id))),
            (ATTR_SK.to_string(), Attr::S(schema::list_sk(list_id))),
            (ATTR_TYPE.to_string(), Attr::S(TYPE_LIST.to_string())),
            (ATTR_LIST_NAME.to_string(), Attr::S(name.to_string())),
            (ATTR_UPDATED_AT.to_string(), Attr::S(Self::now_iso8601())),
        ])
    }

    fn item_row(user_id: &str, list_id: &str, index: usize, item: &ListItem) -> Row {
        Row::from([
            (ATTR_PK.to_string(), Attr::S(schema::user_pk(user_id))),
            (ATTR_SK.to_string(), Attr::S(schema::item_sk(list_id, index))),
            (ATTR_TYPE.to_string(), Attr::S(TYPE_LIST_ITEM.to_string())),
            (ATTR_TEXT.to_string(), Attr::S(item.text.clone())),
            (ATTR_IS_CHECKED.to_string(), Attr::Bool(item.is_checked)),
        ])
    }
}

#[async_trait]
impl ListPreviews for ListStore {
    async fn first_items(
        &self,
        user_id: &str,
        list_id: &str,
        take: usize,
    ) -> StoreResult<Vec<ListItem>> {
        schema::validate_id(user_id)?;
        schema::validate_id(list_id)?;

        if let Some(cached) = self.previews.get(user_id, list_id) {
            tracing::debug!(user_id, list_id, "preview cache hit");
            return Ok(cached.into_iter().take(take).collect());
        }

        // The header sorts before every item row under the same prefix,
        // so one extra row covers it.
        let rows = self
            .table
            .query_prefix(
                &schema::user_pk(user_id),
                &schema::list_sk(list_id),
                false,
                Some(take.saturating_add(1)),
            )
            .await?;

        let items: Vec<ListItem> = rows
            .iter()
            .filter(|row| row_type(row) == Some(TYPE_LIST_ITEM))
            .filter_map(|row| {
                let text = row.get(ATTR_TEXT).and_then(Attr::as_s)?;
                if text.trim().is_empty() {
                    return None;
                }
                let is_checked = row
                    .get(ATTR_IS_CHECKED)
                    .and_then(Attr::as_bool)
                    .unwrap_or(false);
                Some(ListItem::new(text, is_checked))
            })
            .take(take)
            .collect();

        self.previews.set(user_id, list_id, &items);
        Ok(items)
    }
}

fn row_type(row: &Row) -> Option<&str> {
    row.get(ATTR_TYPE).and_then(Attr::as_s)
}

fn row_name(row: &Row) -> String {
    row.get(ATTR_LIST_NAME)
        .and_then(Attr::as_s)
        .map_or_else(|| DEFAULT_LIST_NAME.to_string(), ToString::to_string)
}
