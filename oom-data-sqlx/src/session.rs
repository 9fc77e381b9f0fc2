//! Scoped database sessions.
//!
//! A [`DbSession`] owns one pooled connection for a unit of work. The
//! connection goes back to the pool when the session is closed or dropped,
//! so every exit path (including `?` and panics) releases it.

use oom_data::{DataError, Dialect, SqlType, SqlValue, Statement};
use sqlx::pool::PoolConnection;
use sqlx::{MySql, Postgres, Row, Sqlite};

use crate::bind::{bind_params, decode_column, decode_mysql_column, labels};
use crate::error::SqlxErrorExt;

/// Result of a statement that returns no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Key generated by the last insert on this connection, when the driver reports one.
    pub last_insert_id: Option<i64>,
}

/// A row as `(label, value)` pairs in select-list order.
pub type LabelledRow = Vec<(String, SqlValue)>;

pub enum DbSession {
    MySql(PoolConnection<MySql>),
    Postgres(PoolConnection<Postgres>),
    Sqlite(PoolConnection<Sqlite>),
}

impl DbSession {
    pub fn dialect(&self) -> Dialect {
        match self {
            DbSession::MySql(_) => Dialect::MySql,
            DbSession::Postgres(_) => Dialect::Postgres,
            DbSession::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Run literal DDL (or any unparameterized SQL) without preparing it.
    pub async fn execute_ddl(&mut self, sql: &str) -> Result<u64, DataError> {
        tracing::debug!(dialect = %self.dialect(), sql, "Executing DDL");
        let rows = match self {
            DbSession::MySql(conn) => sqlx::raw_sql(sql)
                .execute(&mut **conn)
                .await
                .map(|r| r.rows_affected()),
            DbSession::Postgres(conn) => sqlx::raw_sql(sql)
                .execute(&mut **conn)
                .await
                .map(|r| r.rows_affected()),
            DbSession::Sqlite(conn) => sqlx::raw_sql(sql)
                .execute(&mut **conn)
                .await
                .map(|r| r.rows_affected()),
        };
        rows.map_err(|e| e.into_data_error())
    }

    /// Execute a statement that returns no rows.
    pub async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome, DataError> {
        tracing::debug!(
            dialect = %self.dialect(),
            sql = %statement.sql,
            params = statement.params.len(),
            "Executing statement"
        );
        let outcome = match self {
            DbSession::MySql(conn) => {
                let result = bind_params!(sqlx::query(&statement.sql), &statement.params)
                    .execute(&mut **conn)
                    .await
                    .map_err(|e| e.into_data_error())?;
                ExecOutcome {
                    rows_affected: result.rows_affected(),
                    last_insert_id: i64::try_from(result.last_insert_id())
                        .ok()
                        .filter(|id| *id > 0),
                }
            }
            DbSession::Postgres(conn) => {
                let result = bind_params!(sqlx::query(&statement.sql), &statement.params)
                    .execute(&mut **conn)
                    .await
                    .map_err(|e| e.into_data_error())?;
                ExecOutcome {
                    rows_affected: result.rows_affected(),
                    last_insert_id: None,
                }
            }
            DbSession::Sqlite(conn) => {
                let result = bind_params!(sqlx::query(&statement.sql), &statement.params)
                    .execute(&mut **conn)
                    .await
                    .map_err(|e| e.into_data_error())?;
                ExecOutcome {
                    rows_affected: result.rows_affected(),
                    last_insert_id: Some(result.last_insert_rowid()).filter(|id| *id > 0),
                }
            }
        };
        Ok(outcome)
    }

    /// Fetch every row, decoding column `i` as `types[i]`.
    pub async fn fetch_rows(
        &mut self,
        statement: &Statement,
        types: &[SqlType],
    ) -> Result<Vec<LabelledRow>, DataError> {
        tracing::debug!(
            dialect = %self.dialect(),
            sql = %statement.sql,
            params = statement.params.len(),
            "Fetching rows"
        );
        match self {
            DbSession::MySql(conn) => {
                let rows = bind_params!(sqlx::query(&statement.sql), &statement.params)
                    .fetch_all(&mut **conn)
                    .await
                    .map_err(|e| e.into_data_error())?;
                rows.iter()
                    .map(|row| {
                        label_row(labels(row), types, |idx, ty| decode_mysql_column(row, idx, ty))
                    })
                    .collect()
            }
            DbSession::Postgres(conn) => {
                let rows = bind_params!(sqlx::query(&statement.sql), &statement.params)
                    .fetch_all(&mut **conn)
                    .await
                    .map_err(|e| e.into_data_error())?;
                rows.iter()
                    .map(|row| label_row(labels(row), types, |idx, ty| decode_column(row, idx, ty)))
                    .collect()
            }
            DbSession::Sqlite(conn) => {
                let rows = bind_params!(sqlx::query(&statement.sql), &statement.params)
                    .fetch_all(&mut **conn)
                    .await
                    .map_err(|e| e.into_data_error())?;
                rows.iter()
                    .map(|row| label_row(labels(row), types, |idx, ty| decode_column(row, idx, ty)))
                    .collect()
            }
        }
    }

    /// Fetch the first column of the single result row as a 64-bit integer.
    pub async fn fetch_i64(&mut self, statement: &Statement) -> Result<i64, DataError> {
        tracing::debug!(dialect = %self.dialect(), sql = %statement.sql, "Fetching scalar");
        let value = match self {
            DbSession::MySql(conn) => bind_params!(sqlx::query(&statement.sql), &statement.params)
                .fetch_one(&mut **conn)
                .await
                .and_then(|row| row.try_get::<i64, _>(0)),
            DbSession::Postgres(conn) => bind_params!(sqlx::query(&statement.sql), &statement.params)
                .fetch_one(&mut **conn)
                .await
                .and_then(|row| row.try_get::<i64, _>(0)),
            DbSession::Sqlite(conn) => bind_params!(sqlx::query(&statement.sql), &statement.params)
                .fetch_one(&mut **conn)
                .await
                .and_then(|row| row.try_get::<i64, _>(0)),
        };
        value.map_err(|e| e.into_data_error())
    }

    /// Return the connection to the pool.
    pub fn close(self) {
        tracing::trace!(dialect = %self.dialect(), "Session closed");
        drop(self);
    }
}

fn label_row<F>(labels: Vec<String>, types: &[SqlType], mut decode: F) -> Result<LabelledRow, DataError>
where
    F: FnMut(usize, SqlType) -> Result<SqlValue, sqlx::Error>,
{
    if labels.len() < types.len() {
        return Err(DataError::Mapping(format!(
            "expected {} columns, row has {}",
            types.len(),
            labels.len()
        )));
    }
    labels
        .into_iter()
        .zip(types)
        .enumerate()
        .map(|(idx, (label, ty))| {
            decode(idx, *ty)
                .map(|value| (label, value))
                .map_err(|e| e.into_data_error())
        })
        .collect()
}
