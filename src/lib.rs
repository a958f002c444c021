//! Cloud-backed storage core for per-user shopping lists.
//!
//! This crate is the data-access layer of a shopping-list application:
//! user-owned lists and their ordered items, encoded as rows of a single
//! wide DynamoDB table and manipulated through [`ListStore`].
//!
//! - [`store`]: the five list operations (enumerate, create, delete,
//!   load, save) plus an existence probe
//! - [`preview`]: first-items previews behind a capability trait
//! - [`table`], [`dynamo`], [`memory`]: the backend seam, its DynamoDB
//!   implementation, and an in-process stand-in for tests
//! - [`schema`]: the key/attribute wire contract shared with existing
//!   stored data
//!
//! Everything above the store (pages, view models, login) lives in the
//! application, not here; the store takes a resolved user id and ambient
//! AWS credentials and returns plain data.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![deny(non_snake_case)]
#![deny(nonstandard_style)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dynamo;
pub mod error;
pub mod memory;
pub mod model;
pub mod preview;
pub mod schema;
pub mod store;
pub mod table;

pub use config::{PreviewCacheConfig, StoreConfig};
pub use dynamo::DynamoTable;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryTable;
pub use model::{DEFAULT_LIST_NAME, ListContent, ListItem, ListSummary, new_list_id};
pub use preview::ListPreviews;
pub use store::ListStore;
pub use table::{Attr, Key, Row, TableClient, WriteOp};
