//! Per-call MongoDB connection handle

use bson::Document as BsonDocument;
use docbridge_common::{DocBridgeError, Result};
use mongodb::{Client, Collection, Database};
use tracing::{debug, instrument};

use crate::config::ConnectionConfig;
use crate::validation::{ValidatedCollectionName, ValidatedDatabaseName};

/// A client handle owned by exactly one operation.
///
/// Opening performs no network I/O; the driver connects lazily on the first
/// command, so an unreachable server surfaces as a `Connection` error from
/// that command. The client is released when the value is dropped, which
/// covers every exit path of the operation that opened it.
pub struct Connection {
    client: Client,
    address: String,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.address)
            .finish()
    }
}

impl Connection {
    /// Build a client for the configured host and port
    #[instrument(skip(config), fields(address = %config.address()))]
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        let client_options = config.to_client_options()?;

        let client = Client::with_options(client_options).map_err(|e| {
            DocBridgeError::Connection(format!(
                "Connection to the database cannot be made: {}",
                e
            ))
        })?;

        debug!("Opened client");

        Ok(Self {
            client,
            address: config.address(),
        })
    }

    /// Get a reference to the client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The `host:port` this connection targets
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Resolve a database by validated name
    pub fn database(&self, name: &str) -> Result<Database> {
        let name = ValidatedDatabaseName::new(name)?;
        Ok(self.client.database(name.as_str()))
    }

    /// Resolve an untyped collection inside a database
    pub fn collection(&self, database: &str, collection: &str) -> Result<Collection<BsonDocument>> {
        let database = self.database(database)?;
        let collection = ValidatedCollectionName::new(collection)?;
        Ok(database.collection(collection.as_str()))
    }

    /// List all database names on the server
    pub async fn list_database_names(&self) -> Result<Vec<String>> {
        let names = self.client.list_database_names().await?;
        Ok(names)
    }

    /// Check if the server answers a ping
    pub async fn ping(&self) -> Result<bool> {
        match self
            .client
            .database("admin")
            .run_command(bson::doc! { "ping": 1 })
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => Err(DocBridgeError::Connection(format!("Ping failed: {}", e))),
        }
    }
}
