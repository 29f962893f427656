//! MongoDB access layer for docbridge
//!
//! A thin CRUD helper over the MongoDB driver: database existence checks,
//! single and batch inserts, whole, single and projected reads, and
//! filtered find/delete.
//!
//! # Features
//! - One client per call, released when the call returns
//! - Closed enums for insert, read and query modes
//! - Explicit unknown outcome for writes that time out
//! - Lazy record cursors implementing `futures::Stream`

pub mod config;
pub mod connection;
pub mod handler;
pub mod operation;
pub mod record;
pub mod validation;

pub use config::ConnectionConfig;
pub use connection::Connection;
pub use docbridge_common::{DocBridgeError, Result};
pub use handler::{DocumentStore, MongoHandler};
pub use operation::{
    InsertMode, InsertPayload, QueryOperation, QueryOutcome, ReadMode, ReadOutcome, WriteOutcome,
};
pub use record::{from_record, record_from_json, to_record, Record, RecordCursor};
pub use validation::{
    projection_for, ValidatedCollectionName, ValidatedDatabaseName, ValidatedFieldName,
};
