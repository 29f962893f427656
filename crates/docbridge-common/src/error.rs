//! Error types for docbridge

use thiserror::Error;

/// Result type alias for docbridge operations
pub type Result<T> = std::result::Result<T, DocBridgeError>;

/// Server code for a write concern that was not satisfied in time (`wtimeout`).
#[cfg(feature = "mongodb-errors")]
const WRITE_CONCERN_FAILED: i32 = 64;

/// Server code for a database or collection name the server rejects.
#[cfg(feature = "mongodb-errors")]
const INVALID_NAMESPACE: i32 = 73;

/// Unified error type for all docbridge operations
#[derive(Error, Debug, Clone)]
pub enum DocBridgeError {
    /// The client could not be built or the configured host is unreachable
    #[error("Connection error: {0}")]
    Connection(String),

    /// A database or collection name could not be resolved
    #[error("Collection error: {0}")]
    Collection(String),

    /// A mode, operation or field list outside its accepted set
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The write may have been sent but its completion could not be confirmed.
    ///
    /// Raised for `wtimeout` expiry and for network failures mid-write. The
    /// write may or may not have been applied.
    #[error("Write timeout (outcome unknown): {0}")]
    WriteTimeout(String),

    #[error("MongoDB error: {0}")]
    MongoDB(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl DocBridgeError {
    /// Returns true when the store may or may not have applied the write
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, DocBridgeError::WriteTimeout(_))
    }

    /// Translates a driver error raised while a write was in flight.
    ///
    /// Unlike the plain `From` conversion, a network failure here (timeout,
    /// reset, cleared pool) means the write may have landed, so it maps to
    /// `WriteTimeout` rather than `Connection`. Only failures that happen
    /// before anything is sent (server selection, DNS) stay `Connection`.
    #[cfg(feature = "mongodb-errors")]
    pub fn from_write_error(err: mongodb::error::Error) -> Self {
        classify_mongodb_error(&err, true)
    }
}

impl From<serde_json::Error> for DocBridgeError {
    fn from(err: serde_json::Error) -> Self {
        DocBridgeError::Serialization(err.to_string())
    }
}

/// True when a write concern error reports that the server ran out of
/// `wtimeout` before the write was replicated
#[cfg(feature = "mongodb-errors")]
fn is_write_concern_timeout(wce: &mongodb::error::WriteConcernError) -> bool {
    wce.code == WRITE_CONCERN_FAILED
}

#[cfg(feature = "mongodb-errors")]
fn classify_mongodb_error(err: &mongodb::error::Error, during_write: bool) -> DocBridgeError {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        // Nothing was sent: no server was selected
        ErrorKind::ServerSelection { .. } | ErrorKind::DnsResolve { .. } => {
            DocBridgeError::Connection(err.to_string())
        }
        // The connection broke with the write possibly on the wire
        ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. } if during_write => {
            DocBridgeError::WriteTimeout(err.to_string())
        }
        ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. } => {
            DocBridgeError::Connection(err.to_string())
        }
        ErrorKind::InvalidArgument { .. } => DocBridgeError::InvalidArgument(err.to_string()),
        ErrorKind::Command(cmd) if cmd.code == INVALID_NAMESPACE => {
            DocBridgeError::Collection(err.to_string())
        }
        ErrorKind::Write(WriteFailure::WriteConcernError(wce))
            if is_write_concern_timeout(wce) =>
        {
            DocBridgeError::WriteTimeout(err.to_string())
        }
        ErrorKind::InsertMany(failure)
            if failure
                .write_concern_error
                .as_ref()
                .is_some_and(is_write_concern_timeout) =>
        {
            DocBridgeError::WriteTimeout(err.to_string())
        }
        ErrorKind::BsonSerialization(_) => DocBridgeError::Serialization(err.to_string()),
        ErrorKind::BsonDeserialization(_) => DocBridgeError::Deserialization(err.to_string()),
        _ => DocBridgeError::MongoDB(err.to_string()),
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for DocBridgeError {
    fn from(err: mongodb::error::Error) -> Self {
        classify_mongodb_error(&err, false)
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for DocBridgeError {
    fn from(err: bson::ser::Error) -> Self {
        DocBridgeError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for DocBridgeError {
    fn from(err: bson::de::Error) -> Self {
        DocBridgeError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}
