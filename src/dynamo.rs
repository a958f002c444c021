//! DynamoDB table client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, PutRequest, WriteRequest};
use aws_smithy_types::timeout::TimeoutConfig;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::schema::{ATTR_PK, ATTR_SK, BATCH_WRITE_LIMIT};
use crate::table::{Attr, Key, Row, TableClient, WriteOp};

/// [`TableClient`] backed by an Amazon DynamoDB table.
///
/// Credential acquisition is the caller's concern: the client inherits
/// whatever the supplied [`aws_config::SdkConfig`] resolved (federated
/// identity, profile, environment), then applies the store's region,
/// endpoint and timeout overrides on top.
#[derive(Clone)]
pub struct DynamoTable {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoTable")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DynamoTable {
    /// Build a client from ambient AWS configuration plus store overrides.
    #[must_use]
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &StoreConfig) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

        if let Some(region) = &config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }
        if let Some(timeout_ms) = config.timeout_ms {
            let timeout = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout);
        }

        Self {
            client: Client::from_conf(builder.build()),
            table_name: config.table_name.clone(),
        }
    }

    /// Wrap a pre-built client (tests, custom wiring).
    #[must_use]
    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Name of the backing table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn to_av(attr: &Attr) -> AttributeValue {
        match attr {
            Attr::S(s) => AttributeValue::S(s.clone()),
            Attr::Bool(b) => AttributeValue::Bool(*b),
        }
    }

    /// Attribute shapes other than `S`/`BOOL` do not occur in this
    /// table; foreign ones are dropped rather than guessed at.
    fn from_av(av: &AttributeValue) -> Option<Attr> {
        match av {
            AttributeValue::S(s) => Some(Attr::S(s.clone())),
            AttributeValue::Bool(b) => Some(Attr::Bool(*b)),
            _ => None,
        }
    }

    fn to_item(row: &Row) -> HashMap<String, AttributeValue> {
        row.iter()
            .map(|(name, attr)| (name.clone(), Self::to_av(attr)))
            .collect()
    }

    fn from_item(item: &HashMap<String, AttributeValue>) -> Row {
        item.iter()
            .filter_map(|(name, av)| Self::from_av(av).map(|attr| (name.clone(), attr)))
            .collect()
    }

    fn key_item(key: &Key) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (ATTR_PK.to_string(), AttributeValue::S(key.pk.clone())),
            (ATTR_SK.to_string(), AttributeValue::S(key.sk.clone())),
        ])
    }

    fn is_condition_failure(err: &SdkError<PutItemError>) -> bool {
        match err {
            SdkError::ServiceError(service_err) => matches!(
                service_err.err(),
                PutItemError::ConditionalCheckFailedException(_)
            ),
            _ => false,
        }
    }

    fn to_write_request(op: &WriteOp) -> StoreResult<WriteRequest> {
        let request = match op {
            WriteOp::Put(row) => WriteRequest::builder()
                .put_request(
                    PutRequest::builder()
                        .set_item(Some(Self::to_item(row)))
                        .build()
                        .map_err(|e| StoreError::Backend(format!("PutRequest build failed: {e}")))?,
                )
                .build(),
            WriteOp::Delete(key) => WriteRequest::builder()
                .delete_request(
                    DeleteRequest::builder()
                        .set_key(Some(Self::key_item(key)))
                        .build()
                        .map_err(|e| {
                            StoreError::Backend(format!("DeleteRequest build failed: {e}"))
                        })?,
                )
                .build(),
        };
        Ok(request)
    }
}

#[async_trait]
impl TableClient for DynamoTable {
    async fn query_prefix(
        &self,
        pk: &str,
        sk_prefix: &str,
        keys_only: bool,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Row>> {
        let mut rows = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk)")
                .expression_attribute_values(":pk", AttributeValue::S(pk.to_string()))
                .expression_attribute_values(":sk", AttributeValue::S(sk_prefix.to_string()));

            if keys_only {
                request = request.projection_expression("PK, SK");
            }
            if let Some(l) = limit {
                let remaining = l.saturating_sub(rows.len());
                request = request.limit(i32::try_from(remaining).unwrap_or(i32::MAX));
            }
            if let Some(key) = last_evaluated_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let response = request
                .send()
                .await
                .map_err(|e| StoreError::Backend(format!("Query failed: {e}")))?;

            for item in response.items() {
                rows.push(Self::from_item(item));
            }

            if let Some(l) = limit {
                if rows.len() >= l {
                    rows.truncate(l);
                    break;
                }
            }

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => last_evaluated_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(rows)
    }

    async fn get(&self, key: &Key) -> StoreResult<Option<Row>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key_item(key)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("GetItem failed: {e}")))?;

        Ok(response.item().map(Self::from_item))
    }

    async fn put(&self, row: Row) -> StoreResult<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(&row)))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("PutItem failed: {e}")))?;
        Ok(())
    }

    async fn put_if_absent(&self, row: Row) -> StoreResult<()> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(&row)))
            .condition_expression("attribute_not_exists(PK) AND attribute_not_exists(SK)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if Self::is_condition_failure(&e) => Err(StoreError::ConditionFailed),
            Err(e) => Err(StoreError::Backend(format!("PutItem failed: {e}"))),
        }
    }

    async fn batch_write(&self, ops: &[WriteOp]) -> StoreResult<()> {
        if ops.is_empty() {
            return Ok(());
        }
        if ops.len() > BATCH_WRITE_LIMIT {
            return Err(StoreError::BatchTooLarge(ops.len()));
        }

        let requests = ops
            .iter()
            .map(Self::to_write_request)
            .collect::<StoreResult<Vec<WriteRequest>>>()?;

        let response = self
            .client
            .batch_write_item()
            .request_items(&self.table_name, requests)
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("BatchWriteItem failed: {e}")))?;

        // Unprocessed items mean the backend throttled part of the
        // batch; surface it instead of silently re-driving the writes.
        let unprocessed: usize = response
            .unprocessed_items()
            .map(|tables| tables.values().map(Vec::len).sum())
            .unwrap_or(0);
        if unprocessed > 0 {
            tracing::warn!(unprocessed, table = %self.table_name, "batch write left unprocessed items");
            return Err(StoreError::Throttled(unprocessed));
        }

        Ok(())
    }
}
