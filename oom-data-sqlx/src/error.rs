use oom_data::DataError;

/// Bridge from `sqlx::Error` to [`DataError`].
///
/// `From<sqlx::Error> for DataError` would break the orphan rule here, so
/// call sites use `.map_err(|e| e.into_data_error())`.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match self {
            sqlx::Error::RowNotFound => DataError::NotFound("no row returned".into()),
            sqlx::Error::ColumnNotFound(column) => {
                DataError::Mapping(format!("column {column} missing from result"))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => {
                DataError::Mapping(format!("column index {index} out of bounds for {len} columns"))
            }
            other => {
                if let sqlx::Error::Database(db) = &other {
                    tracing::debug!(code = ?db.code(), message = db.message(), "Database rejected statement");
                }
                DataError::database(other)
            }
        }
    }
}

/// Result alias for the backend operations.
pub type SqlxResult<T> = Result<T, DataError>;
