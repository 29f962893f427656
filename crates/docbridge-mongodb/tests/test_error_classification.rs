//! Translation of driver errors into the docbridge error taxonomy.
//!
//! Driver errors are built locally, so no server is needed.

use bson::doc;
use docbridge_mongodb::DocBridgeError;
use mongodb::error::{CommandError, Error, ErrorKind, WriteConcernError, WriteFailure};
use std::io;

fn write_concern_error(code: i32, code_name: &str) -> WriteConcernError {
    bson::from_document(doc! {
        "code": code,
        "codeName": code_name,
        "errmsg": "waiting for replication timed out",
    })
    .unwrap()
}

fn command_error(code: i32, code_name: &str) -> CommandError {
    bson::from_document(doc! {
        "code": code,
        "codeName": code_name,
        "errmsg": "Invalid namespace specified",
    })
    .unwrap()
}

fn io_error(kind: io::ErrorKind) -> Error {
    Error::from(io::Error::new(kind, "socket failure"))
}

#[test]
fn test_write_concern_timeout_is_write_timeout() {
    let err = Error::from(ErrorKind::Write(WriteFailure::WriteConcernError(
        write_concern_error(64, "WriteConcernFailed"),
    )));

    let translated = DocBridgeError::from_write_error(err);
    assert!(matches!(translated, DocBridgeError::WriteTimeout(_)));
    assert!(translated.is_ambiguous());
}

#[test]
fn test_other_write_concern_error_is_not_ambiguous() {
    let err = Error::from(ErrorKind::Write(WriteFailure::WriteConcernError(
        write_concern_error(100, "UnsatisfiableWriteConcern"),
    )));

    let translated = DocBridgeError::from_write_error(err);
    assert!(matches!(translated, DocBridgeError::MongoDB(_)));
    assert!(!translated.is_ambiguous());
}

#[test]
fn test_invalid_namespace_is_collection_error() {
    let err = Error::from(ErrorKind::Command(command_error(73, "InvalidNamespace")));
    assert!(matches!(
        DocBridgeError::from(err),
        DocBridgeError::Collection(_)
    ));
}

#[test]
fn test_other_command_error_is_mongodb_error() {
    let err = Error::from(ErrorKind::Command(command_error(2, "BadValue")));
    assert!(matches!(
        DocBridgeError::from(err),
        DocBridgeError::MongoDB(_)
    ));
}

#[test]
fn test_server_selection_is_connection_error() {
    let read = Error::from(ErrorKind::ServerSelection {
        message: "no server available".to_string(),
    });
    assert!(matches!(
        DocBridgeError::from(read),
        DocBridgeError::Connection(_)
    ));

    // Nothing reached the server, so a write is a confirmed failure
    let write = Error::from(ErrorKind::ServerSelection {
        message: "no server available".to_string(),
    });
    let translated = DocBridgeError::from_write_error(write);
    assert!(matches!(translated, DocBridgeError::Connection(_)));
    assert!(!translated.is_ambiguous());
}

#[test]
fn test_timed_out_write_is_write_timeout() {
    let translated = DocBridgeError::from_write_error(io_error(io::ErrorKind::TimedOut));
    assert!(matches!(translated, DocBridgeError::WriteTimeout(_)));
}

#[test]
fn test_reset_mid_write_is_ambiguous() {
    for kind in [
        io::ErrorKind::ConnectionReset,
        io::ErrorKind::BrokenPipe,
        io::ErrorKind::UnexpectedEof,
    ] {
        let translated = DocBridgeError::from_write_error(io_error(kind));
        assert!(
            matches!(translated, DocBridgeError::WriteTimeout(_)),
            "expected unknown outcome for {:?}, got {:?}",
            kind,
            translated
        );
    }
}

#[test]
fn test_pool_cleared_mid_write_is_ambiguous() {
    let err = Error::from(ErrorKind::ConnectionPoolCleared {
        message: "pool cleared after network error".to_string(),
    });
    assert!(DocBridgeError::from_write_error(err).is_ambiguous());
}

#[test]
fn test_io_failure_outside_write_is_connection_error() {
    for kind in [io::ErrorKind::ConnectionReset, io::ErrorKind::TimedOut] {
        assert!(matches!(
            DocBridgeError::from(io_error(kind)),
            DocBridgeError::Connection(_)
        ));
    }
}

#[test]
fn test_driver_invalid_argument() {
    let err = Error::from(ErrorKind::InvalidArgument {
        message: "empty batch".to_string(),
    });
    assert!(matches!(
        DocBridgeError::from(err),
        DocBridgeError::InvalidArgument(_)
    ));
}
