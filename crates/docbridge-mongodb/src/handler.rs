//! CRUD access helper
//!
//! [`MongoHandler`] keeps only its connection configuration. Every operation
//! opens its own [`Connection`], resolves database and collection, runs one
//! driver primitive and translates the driver's error.

use async_trait::async_trait;
use bson::{doc, Bson, Document as BsonDocument};
use docbridge_common::{DocBridgeError, Result};
use tracing::{debug, info, instrument, warn};

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::operation::{
    InsertPayload, QueryOperation, QueryOutcome, ReadMode, ReadOutcome, WriteOutcome,
};
use crate::record::RecordCursor;
use crate::validation::{ids_projection, is_ids_only, projection_for};

/// The four operations of the access layer, for callers that want to
/// depend on a store rather than on MongoDB directly.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether a database with this name exists
    async fn existence_check(&self, database: &str) -> Result<bool>;

    /// Insert one or many records
    async fn insert(
        &self,
        database: &str,
        collection: &str,
        payload: InsertPayload,
    ) -> WriteOutcome;

    /// Read one record, all records, or selected fields of all records
    async fn read(&self, database: &str, collection: &str, mode: ReadMode) -> Result<ReadOutcome>;

    /// Find or delete the records matching a filter
    async fn query(
        &self,
        database: &str,
        collection: &str,
        operation: QueryOperation,
        filter: BsonDocument,
    ) -> Result<QueryOutcome>;
}

/// Database access helper over the MongoDB driver
#[derive(Debug, Clone)]
pub struct MongoHandler {
    config: ConnectionConfig,
}

impl MongoHandler {
    /// Handler for `host:port` with default timeouts. Performs no I/O.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_config(ConnectionConfig::new(host, port))
    }

    /// Handler with a full configuration. Performs no I/O.
    pub fn with_config(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.config)
    }

    /// Returns true if `database` is among the server's database names
    ///
    /// # Errors
    /// `Connection` if the server cannot be reached.
    #[instrument(skip(self), fields(address = %self.config.address()))]
    pub async fn existence_check(&self, database: &str) -> Result<bool> {
        let conn = self.connect()?;
        let names = conn.list_database_names().await?;
        let exists = names.iter().any(|name| name == database);
        debug!(exists, "Checked database existence");
        Ok(exists)
    }

    /// Insert the payload into `database.collection`.
    ///
    /// The collection is created by the server on first insert.
    /// `WriteOutcome::Unknown` means the configured write timeout expired or
    /// the connection broke before the server confirmed the write; it may
    /// still have been applied.
    #[instrument(skip(self, payload), fields(mode = ?payload.mode(), records = payload.len()))]
    pub async fn insert(
        &self,
        database: &str,
        collection: &str,
        payload: InsertPayload,
    ) -> WriteOutcome {
        let result = self.try_insert(database, collection, payload).await;
        let outcome = WriteOutcome::from_result(result);

        match &outcome {
            WriteOutcome::Confirmed(ids) => info!(inserted = ids.len(), "Insert confirmed"),
            WriteOutcome::Unknown(e) => warn!(error = %e, "Insert outcome unknown"),
            WriteOutcome::Failed(e) => debug!(error = %e, "Insert failed"),
        }

        outcome
    }

    async fn try_insert(
        &self,
        database: &str,
        collection: &str,
        payload: InsertPayload,
    ) -> Result<Vec<Bson>> {
        if let InsertPayload::Multiple(records) = &payload {
            if records.is_empty() {
                return Err(DocBridgeError::InvalidArgument(
                    "'multiple' insert needs at least one record".to_string(),
                ));
            }
        }

        let conn = self.connect()?;
        let collection = conn.collection(database, collection)?;

        match payload {
            InsertPayload::Single(record) => {
                let result = collection
                    .insert_one(record)
                    .await
                    .map_err(DocBridgeError::from_write_error)?;
                Ok(vec![result.inserted_id])
            }
            InsertPayload::Multiple(records) => {
                let result = collection
                    .insert_many(records)
                    .await
                    .map_err(DocBridgeError::from_write_error)?;

                // The driver keys identifiers by payload index
                let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
                ids.sort_by_key(|(index, _)| *index);
                Ok(ids.into_iter().map(|(_, id)| id).collect())
            }
        }
    }

    /// Read from `database.collection`
    ///
    /// # Errors
    /// `InvalidArgument` for an empty or malformed field list in
    /// `ReadMode::Fields`, `Collection` for an invalid name, `Connection` if
    /// the server cannot be reached.
    #[instrument(skip(self))]
    pub async fn read(
        &self,
        database: &str,
        collection: &str,
        mode: ReadMode,
    ) -> Result<ReadOutcome> {
        let projection = match &mode {
            ReadMode::Fields(fields) if is_ids_only(fields) => Some(ids_projection()),
            ReadMode::Fields(fields) => Some(projection_for(fields)?),
            ReadMode::One | ReadMode::All => None,
        };

        let conn = self.connect()?;
        let collection = conn.collection(database, collection)?;

        match mode {
            ReadMode::One => {
                let record = collection.find_one(doc! {}).await?;
                debug!(found = record.is_some(), "Read one record");
                Ok(ReadOutcome::One(record))
            }
            ReadMode::All => {
                let cursor = collection.find(doc! {}).await?;
                Ok(ReadOutcome::Many(RecordCursor::new(cursor)))
            }
            ReadMode::Fields(_) => {
                let projection = projection.unwrap_or_else(ids_projection);
                debug!(?projection, "Projected read");
                let cursor = collection.find(doc! {}).projection(projection).await?;
                Ok(ReadOutcome::Many(RecordCursor::new(cursor)))
            }
        }
    }

    /// Find or delete the records in `database.collection` matching `filter`.
    ///
    /// The filter goes to the server unmodified, so equality matches and
    /// `$`-operator conditions such as `{"price": {"$gt": 120.0}}` both work.
    /// A delete that hits the write timeout fails with `WriteTimeout`; some
    /// matching records may already be gone.
    #[instrument(skip(self, filter))]
    pub async fn query(
        &self,
        database: &str,
        collection: &str,
        operation: QueryOperation,
        filter: BsonDocument,
    ) -> Result<QueryOutcome> {
        match operation {
            QueryOperation::Find => Ok(QueryOutcome::Found(
                self.find(database, collection, filter).await?,
            )),
            QueryOperation::Delete => Ok(QueryOutcome::Deleted(
                self.delete(database, collection, filter).await?,
            )),
        }
    }

    /// Lazy cursor over the records matching `filter`
    pub async fn find(
        &self,
        database: &str,
        collection: &str,
        filter: BsonDocument,
    ) -> Result<RecordCursor> {
        let conn = self.connect()?;
        let collection = conn.collection(database, collection)?;
        let cursor = collection.find(filter).await?;
        Ok(RecordCursor::new(cursor))
    }

    /// Remove every record matching `filter` and return how many were removed
    pub async fn delete(
        &self,
        database: &str,
        collection: &str,
        filter: BsonDocument,
    ) -> Result<u64> {
        let conn = self.connect()?;
        let collection = conn.collection(database, collection)?;
        let result = collection
            .delete_many(filter)
            .await
            .map_err(DocBridgeError::from_write_error)?;
        info!(deleted = result.deleted_count, "Deleted matching records");
        Ok(result.deleted_count)
    }

    /// Check that the server answers
    pub async fn ping(&self) -> Result<bool> {
        self.connect()?.ping().await
    }
}

#[async_trait]
impl DocumentStore for MongoHandler {
    async fn existence_check(&self, database: &str) -> Result<bool> {
        MongoHandler::existence_check(self, database).await
    }

    async fn insert(
        &self,
        database: &str,
        collection: &str,
        payload: InsertPayload,
    ) -> WriteOutcome {
        MongoHandler::insert(self, database, collection, payload).await
    }

    async fn read(
        &self,
        database: &str,
        collection: &str,
        mode: ReadMode,
    ) -> Result<ReadOutcome> {
        MongoHandler::read(self, database, collection, mode).await
    }

    async fn query(
        &self,
        database: &str,
        collection: &str,
        operation: QueryOperation,
        filter: BsonDocument,
    ) -> Result<QueryOutcome> {
        MongoHandler::query(self, database, collection, operation, filter).await
    }
}
