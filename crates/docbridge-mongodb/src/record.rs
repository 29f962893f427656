//! Records and lazy record cursors
//!
//! A record is an untyped BSON document. Helpers here convert between
//! records and serde types or JSON objects, and [`RecordCursor`] wraps the
//! driver cursor returned by reads and finds.

use bson::Document as BsonDocument;
use docbridge_common::{DocBridgeError, Result};
use futures::{Stream, TryStreamExt};
use mongodb::Cursor;
use serde::{de::DeserializeOwned, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};

/// One schema-less document
pub type Record = BsonDocument;

/// Convert any serializable value into a record
///
/// # Errors
/// `Serialization` when the value does not serialize to a BSON document
/// (for example a bare string or number).
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    bson::to_document(value).map_err(|e| DocBridgeError::Serialization(e.to_string()))
}

/// Convert a record into a typed value
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T> {
    bson::from_document(record).map_err(|e| DocBridgeError::Deserialization(e.to_string()))
}

/// Convert a JSON object into a record
///
/// # Errors
/// `InvalidArgument` if the value is not a JSON object.
pub fn record_from_json(value: serde_json::Value) -> Result<Record> {
    match value {
        serde_json::Value::Object(_) => {
            bson::to_document(&value).map_err(|e| DocBridgeError::Serialization(e.to_string()))
        }
        other => Err(DocBridgeError::InvalidArgument(format!(
            "Record must be a JSON object, got: {}",
            other
        ))),
    }
}

/// Lazy, forward-only sequence of records backed by a server cursor.
///
/// Records are fetched in batches as the stream is polled. The cursor holds
/// its own handle to the client, so it stays usable after the operation
/// that produced it has returned. It cannot be rewound; run the read again
/// for a fresh pass.
pub struct RecordCursor {
    cursor: Cursor<BsonDocument>,
}

impl std::fmt::Debug for RecordCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordCursor").finish_non_exhaustive()
    }
}

impl RecordCursor {
    pub(crate) fn new(cursor: Cursor<BsonDocument>) -> Self {
        Self { cursor }
    }

    /// Drain the remaining records into memory
    pub async fn collect_all(self) -> Result<Vec<Record>> {
        self.try_collect().await
    }

    /// Drain the remaining records, deserializing each into `T`
    pub async fn collect_as<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let records = self.collect_all().await?;
        records.into_iter().map(from_record).collect()
    }
}

impl Stream for RecordCursor {
    type Item = Result<Record>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.cursor)
            .poll_next(cx)
            .map(|item| item.map(|res| res.map_err(DocBridgeError::from)))
    }
}
