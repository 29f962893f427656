//! Operation modes and outcomes
//!
//! Each operation family is a closed enum. The string forms ("single",
//! "all", "delete", ...) are accepted only through `FromStr`/`parse`, which
//! is the one place an unknown mode can be reported.

use bson::Bson;
use docbridge_common::{DocBridgeError, Result};
use serde::Serialize;
use std::str::FromStr;

use crate::record::{to_record, Record, RecordCursor};
use crate::validation::ID_FIELD;

/// Insert mode, as named by string-keyed callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    Single,
    Multiple,
}

impl FromStr for InsertMode {
    type Err = DocBridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(InsertMode::Single),
            "multiple" => Ok(InsertMode::Multiple),
            other => Err(DocBridgeError::InvalidArgument(format!(
                "insert mode should be either 'single' or 'multiple', got '{}'",
                other
            ))),
        }
    }
}

/// Records to insert; the variant is the insert mode
#[derive(Debug, Clone, PartialEq)]
pub enum InsertPayload {
    Single(Record),
    Multiple(Vec<Record>),
}

impl InsertPayload {
    /// Single-record payload from a serializable value
    pub fn single_from<T: Serialize>(value: &T) -> Result<Self> {
        Ok(InsertPayload::Single(to_record(value)?))
    }

    /// Multi-record payload from serializable values
    pub fn multiple_from<T: Serialize>(values: &[T]) -> Result<Self> {
        let records = values.iter().map(to_record).collect::<Result<Vec<_>>>()?;
        Ok(InsertPayload::Multiple(records))
    }

    /// Pair a string mode with records, checking that they agree.
    ///
    /// `single` takes exactly one record; `multiple` takes any non-empty list.
    pub fn from_mode(mode: &str, mut records: Vec<Record>) -> Result<Self> {
        match mode.parse::<InsertMode>()? {
            InsertMode::Single if records.len() == 1 => {
                Ok(InsertPayload::Single(records.remove(0)))
            }
            InsertMode::Single => Err(DocBridgeError::InvalidArgument(format!(
                "'single' insert takes exactly one record, got {}",
                records.len()
            ))),
            InsertMode::Multiple => Ok(InsertPayload::Multiple(records)),
        }
    }

    pub fn mode(&self) -> InsertMode {
        match self {
            InsertPayload::Single(_) => InsertMode::Single,
            InsertPayload::Multiple(_) => InsertMode::Multiple,
        }
    }

    /// Number of records in the payload
    pub fn len(&self) -> usize {
        match self {
            InsertPayload::Single(_) => 1,
            InsertPayload::Multiple(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadMode {
    /// At most one record
    One,
    /// Every record in the collection
    All,
    /// Only the listed fields of every record
    Fields(Vec<String>),
}

impl ReadMode {
    /// Identifiers only, the default field selection
    pub fn ids() -> Self {
        ReadMode::Fields(vec![ID_FIELD.to_string()])
    }

    /// Projected read of the given fields
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReadMode::Fields(fields.into_iter().map(Into::into).collect())
    }

    /// Parse a string mode. `fields` is only consulted for "some", where
    /// `None` means the default identifier-only selection.
    pub fn parse(mode: &str, fields: Option<Vec<String>>) -> Result<Self> {
        match mode {
            "one" => Ok(ReadMode::One),
            "all" => Ok(ReadMode::All),
            "some" => Ok(fields.map(ReadMode::Fields).unwrap_or_else(ReadMode::ids)),
            other => Err(DocBridgeError::InvalidArgument(format!(
                "find method should be either 'one', 'all' or 'some', got '{}'",
                other
            ))),
        }
    }
}

/// Filtered operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperation {
    Find,
    Delete,
}

impl FromStr for QueryOperation {
    type Err = DocBridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "find" => Ok(QueryOperation::Find),
            "delete" => Ok(QueryOperation::Delete),
            other => Err(DocBridgeError::InvalidArgument(format!(
                "operation should be either 'find' or 'delete', got '{}'",
                other
            ))),
        }
    }
}

/// Result of an insert.
///
/// `Unknown` covers a write the server did not confirm in time and a
/// connection that broke while the write was in flight; either way it may
/// or may not have been applied. Callers that
/// need certainty must check the collection themselves.
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    /// The server acknowledged the write; identifiers in payload order
    Confirmed(Vec<Bson>),
    /// The write was rejected by the server or never sent
    Failed(DocBridgeError),
    /// The write may or may not have been applied
    Unknown(DocBridgeError),
}

impl WriteOutcome {
    pub(crate) fn from_result(result: Result<Vec<Bson>>) -> Self {
        match result {
            Ok(ids) => WriteOutcome::Confirmed(ids),
            Err(e) if e.is_ambiguous() => WriteOutcome::Unknown(e),
            Err(e) => WriteOutcome::Failed(e),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, WriteOutcome::Confirmed(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, WriteOutcome::Unknown(_))
    }

    /// Inserted identifiers, if the write was confirmed
    pub fn inserted_ids(&self) -> Option<&[Bson]> {
        match self {
            WriteOutcome::Confirmed(ids) => Some(ids),
            _ => None,
        }
    }

    /// Collapse into a `Result`; an unknown outcome becomes its `WriteTimeout` error
    pub fn into_result(self) -> Result<Vec<Bson>> {
        match self {
            WriteOutcome::Confirmed(ids) => Ok(ids),
            WriteOutcome::Failed(e) | WriteOutcome::Unknown(e) => Err(e),
        }
    }
}

/// Result of a read
#[derive(Debug)]
pub enum ReadOutcome {
    /// `ReadMode::One`: the first record, if any
    One(Option<Record>),
    /// `ReadMode::All` / `ReadMode::Fields`: a lazy cursor
    Many(RecordCursor),
}

impl ReadOutcome {
    /// Materialize the outcome as a list of records
    pub async fn into_records(self) -> Result<Vec<Record>> {
        match self {
            ReadOutcome::One(record) => Ok(record.into_iter().collect()),
            ReadOutcome::Many(cursor) => cursor.collect_all().await,
        }
    }
}

/// Result of a filtered operation
#[derive(Debug)]
pub enum QueryOutcome {
    /// Matching records
    Found(RecordCursor),
    /// Number of records removed
    Deleted(u64),
}

impl QueryOutcome {
    pub fn deleted_count(&self) -> Option<u64> {
        match self {
            QueryOutcome::Deleted(n) => Some(*n),
            QueryOutcome::Found(_) => None,
        }
    }

    /// The cursor of a find, or `None` for a delete
    pub fn into_cursor(self) -> Option<RecordCursor> {
        match self {
            QueryOutcome::Found(cursor) => Some(cursor),
            QueryOutcome::Deleted(_) => None,
        }
    }
}
