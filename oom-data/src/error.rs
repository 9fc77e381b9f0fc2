use crate::query::QueryError;
use crate::value::SqlType;

/// Errors raised while converting between a Rust value and a column value.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// A NULL was read into a non-optional field.
    UnexpectedNull { expected: SqlType },
    /// The column value has a different storage type than the field expects.
    TypeMismatch { expected: SqlType, actual: SqlType },
    /// An integer did not fit the field's width.
    OutOfRange { expected: SqlType, value: i64 },
    /// Calendar components that do not name a real instant.
    InvalidDateTime(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::UnexpectedNull { expected } => {
                write!(f, "unexpected NULL for non-null {} column", expected.name())
            }
            CodecError::TypeMismatch { expected, actual } => {
                write!(f, "expected {} value, got {}", expected.name(), actual.name())
            }
            CodecError::OutOfRange { expected, value } => {
                write!(f, "value {value} out of range for {}", expected.name())
            }
            CodecError::InvalidDateTime(msg) => write!(f, "invalid date-time: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    /// The entity type was used before `EntityMapper::register`.
    NotRegistered(&'static str),
    /// Descriptor or row shape problems.
    Mapping(String),
    Codec { column: String, source: CodecError },
    Query(QueryError),
    /// The dialect is modelled but no driver is available for it.
    UnsupportedBackend(String),
    Database(Box<dyn std::error::Error + Send + Sync>),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by the backend crate (`oom-data-sqlx`) to wrap driver errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }

    pub fn codec(column: &str, source: CodecError) -> Self {
        DataError::Codec {
            column: column.to_string(),
            source,
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::NotRegistered(entity) => write!(f, "Entity not registered: {entity}"),
            DataError::Mapping(msg) => write!(f, "Mapping error: {msg}"),
            DataError::Codec { column, source } => write!(f, "Column {column}: {source}"),
            DataError::Query(err) => write!(f, "Query error: {err}"),
            DataError::UnsupportedBackend(name) => write!(f, "No driver available for {name}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            DataError::Codec { source, .. } => Some(source),
            DataError::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueryError> for DataError {
    fn from(err: QueryError) -> Self {
        DataError::Query(err)
    }
}
