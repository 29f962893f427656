//! Name and field-list validation for MongoDB operations
//!
//! Database and collection names are checked before a request is built, so a
//! name the server would reject fails fast as a `Collection` error. Field
//! lists for projected reads are checked the same way and fail as
//! `InvalidArgument`.

use bson::{doc, Document as BsonDocument};
use docbridge_common::{DocBridgeError, Result};
use tracing::warn;

/// Maximum allowed length for database names (server limit is 64 bytes, exclusive)
const MAX_DATABASE_NAME_LENGTH: usize = 63;

/// Maximum allowed length for collection names (MongoDB limit is 255, we're more conservative)
const MAX_COLLECTION_NAME_LENGTH: usize = 120;

/// Maximum allowed length for field names
const MAX_FIELD_NAME_LENGTH: usize = 1024;

/// Characters the server refuses in database names
const INVALID_DATABASE_CHARS: &[char] = &[
    '/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?', '\0',
];

/// Identifier field every document carries
pub const ID_FIELD: &str = "_id";

/// Validated database name
///
/// - Not empty
/// - At most 63 bytes
/// - None of `/\. "$*<>:|?` or null bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDatabaseName {
    name: String,
}

impl ValidatedDatabaseName {
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(DocBridgeError::Collection(
                "Database name cannot be empty".to_string(),
            ));
        }

        if name.len() > MAX_DATABASE_NAME_LENGTH {
            return Err(DocBridgeError::Collection(format!(
                "Database name exceeds maximum length of {} bytes: '{}'",
                MAX_DATABASE_NAME_LENGTH, name
            )));
        }

        if let Some(c) = name.chars().find(|c| INVALID_DATABASE_CHARS.contains(c)) {
            return Err(DocBridgeError::Collection(format!(
                "Database name cannot contain {:?}: '{}'",
                c, name
            )));
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for ValidatedDatabaseName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedDatabaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validated collection name
///
/// - Not empty
/// - Maximum 120 characters
/// - No null bytes
/// - No "system." prefix (system collections)
/// - No $ characters
/// - Logs a warning on suspicious patterns (.., //)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCollectionName {
    name: String,
}

impl ValidatedCollectionName {
    /// Creates a new validated collection name
    ///
    /// # Errors
    /// Returns `DocBridgeError::Collection` if:
    /// - Name is empty
    /// - Name exceeds MAX_COLLECTION_NAME_LENGTH
    /// - Name contains null bytes
    /// - Name starts with "system."
    /// - Name contains $ characters
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(DocBridgeError::Collection(
                "Invalid collection name: name cannot be empty".to_string(),
            ));
        }

        if name.len() > MAX_COLLECTION_NAME_LENGTH {
            return Err(DocBridgeError::Collection(format!(
                "Invalid collection name: exceeds maximum length of {} characters: '{}'",
                MAX_COLLECTION_NAME_LENGTH, name
            )));
        }

        if name.contains('\0') {
            return Err(DocBridgeError::Collection(
                "Invalid collection name: cannot contain null bytes".to_string(),
            ));
        }

        if name.starts_with("system.") {
            return Err(DocBridgeError::Collection(format!(
                "Invalid collection name: cannot start with 'system.' (reserved): '{}'",
                name
            )));
        }

        if name.contains('$') {
            return Err(DocBridgeError::Collection(format!(
                "Invalid collection name: cannot contain '$' character: '{}'",
                name
            )));
        }

        // Allowed, but worth noticing
        if name.contains("..") || name.contains("//") {
            warn!(
                collection = name,
                "Collection name contains suspicious pattern"
            );
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Returns the validated collection name as a string slice
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Consumes the ValidatedCollectionName and returns the inner String
    pub fn into_string(self) -> String {
        self.name
    }
}

impl AsRef<str> for ValidatedCollectionName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedCollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validated field name for projections
///
/// - Not empty
/// - Maximum 1024 characters
/// - No null bytes
/// - No $ prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFieldName {
    name: String,
}

impl ValidatedFieldName {
    /// # Errors
    /// Returns `DocBridgeError::InvalidArgument` if the name is empty, too
    /// long, contains a null byte or starts with `$`.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(DocBridgeError::InvalidArgument(
                "Field name cannot be empty".to_string(),
            ));
        }

        if name.len() > MAX_FIELD_NAME_LENGTH {
            return Err(DocBridgeError::InvalidArgument(format!(
                "Field name exceeds maximum length of {} characters",
                MAX_FIELD_NAME_LENGTH
            )));
        }

        if name.contains('\0') {
            return Err(DocBridgeError::InvalidArgument(
                "Field name cannot contain null bytes".to_string(),
            ));
        }

        if name.starts_with('$') {
            return Err(DocBridgeError::InvalidArgument(format!(
                "Field name cannot start with '$' (reserved for operators): '{}'",
                name
            )));
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn into_string(self) -> String {
        self.name
    }
}

impl AsRef<str> for ValidatedFieldName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Returns true when the field list asks for identifiers only
pub fn is_ids_only(fields: &[String]) -> bool {
    fields.len() == 1 && fields[0] == ID_FIELD
}

/// Builds an inclusion projection from a requested field list.
///
/// Fields keep their requested order; repeats collapse into one entry.
///
/// # Errors
/// `InvalidArgument` when the list is empty or any name fails
/// [`ValidatedFieldName`].
pub fn projection_for(fields: &[String]) -> Result<BsonDocument> {
    if fields.is_empty() {
        return Err(DocBridgeError::InvalidArgument(
            "Field list cannot be empty; pass [\"_id\"] to read identifiers only".to_string(),
        ));
    }

    let mut projection = BsonDocument::new();
    for field in fields {
        let field = ValidatedFieldName::new(field)?;
        projection.insert(field.into_string(), 1);
    }
    Ok(projection)
}

/// Projection returning only the identifier
pub fn ids_projection() -> BsonDocument {
    doc! { ID_FIELD: 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_database_names() {
        assert!(ValidatedDatabaseName::new("Movies").is_ok());
        assert!(ValidatedDatabaseName::new("app_db-2").is_ok());
    }

    #[test]
    fn test_invalid_database_names() {
        for name in ["", "my.db", "my db", "a/b", "a$b", "a\0b"] {
            let result = ValidatedDatabaseName::new(name);
            assert!(
                matches!(result, Err(DocBridgeError::Collection(_))),
                "expected rejection for {:?}",
                name
            );
        }
        let long = "d".repeat(64);
        assert!(ValidatedDatabaseName::new(&long).is_err());
        assert!(ValidatedDatabaseName::new(&"d".repeat(63)).is_ok());
    }

    #[test]
    fn test_valid_collection_names() {
        assert!(ValidatedCollectionName::new("Action").is_ok());
        assert!(ValidatedCollectionName::new("movies.archive").is_ok());
        assert!(ValidatedCollectionName::new("a..b").is_ok());
    }

    #[test]
    fn test_invalid_collection_names() {
        for name in ["", "system.users", "price$", "a\0b"] {
            let result = ValidatedCollectionName::new(name);
            assert!(
                matches!(result, Err(DocBridgeError::Collection(_))),
                "expected rejection for {:?}",
                name
            );
        }
        assert!(ValidatedCollectionName::new(&"c".repeat(121)).is_err());
    }

    #[test]
    fn test_collection_name_accessors() {
        let name = ValidatedCollectionName::new("Action").unwrap();
        assert_eq!(name.as_str(), "Action");
        assert_eq!(name.to_string(), "Action");
        assert_eq!(name.into_string(), "Action".to_string());
    }

    #[test]
    fn test_field_names() {
        assert!(ValidatedFieldName::new("title").is_ok());
        assert!(ValidatedFieldName::new("ratings.imdb").is_ok());
        assert!(matches!(
            ValidatedFieldName::new("$where"),
            Err(DocBridgeError::InvalidArgument(_))
        ));
        assert!(matches!(
            ValidatedFieldName::new(""),
            Err(DocBridgeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_is_ids_only() {
        assert!(is_ids_only(&fields(&["_id"])));
        assert!(!is_ids_only(&fields(&["_id", "title"])));
        assert!(!is_ids_only(&fields(&["title"])));
        assert!(!is_ids_only(&[]));
    }

    #[test]
    fn test_projection_for_fields() {
        let projection = projection_for(&fields(&["title", "release"])).unwrap();
        assert_eq!(projection, doc! { "title": 1, "release": 1 });
        let keys: Vec<&str> = projection.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["title", "release"]);
    }

    #[test]
    fn test_projection_collapses_repeats() {
        let projection = projection_for(&fields(&["title", "title"])).unwrap();
        assert_eq!(projection, doc! { "title": 1 });
    }

    #[test]
    fn test_projection_rejects_empty_and_malformed() {
        assert!(matches!(
            projection_for(&[]),
            Err(DocBridgeError::InvalidArgument(_))
        ));
        assert!(matches!(
            projection_for(&fields(&["title", ""])),
            Err(DocBridgeError::InvalidArgument(_))
        ));
        assert!(matches!(
            projection_for(&fields(&["$gt"])),
            Err(DocBridgeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ids_projection() {
        assert_eq!(ids_projection(), doc! { "_id": 1 });
    }
}
