use std::time::Duration;

use oom_data::{DataError, Dialect};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::SqlxErrorExt;
use crate::session::DbSession;

/// Connection pool settings shared by every backend.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 2,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// A connection pool for one of the dialects that has a driver.
///
/// HSQLDB is modelled by [`Dialect`] but has no driver here; connecting to it
/// fails with [`DataError::UnsupportedBackend`].
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DbPool {
    pub async fn connect(
        dialect: Dialect,
        url: &str,
        settings: &PoolSettings,
    ) -> Result<Self, DataError> {
        tracing::debug!(%dialect, max_connections = settings.max_connections, "Connecting pool");
        let pool = match dialect {
            Dialect::MySql => DbPool::MySql(
                MySqlPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .acquire_timeout(settings.connect_timeout)
                    .connect(url)
                    .await
                    .map_err(|e| e.into_data_error())?,
            ),
            Dialect::Postgres => DbPool::Postgres(
                PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .acquire_timeout(settings.connect_timeout)
                    .connect(url)
                    .await
                    .map_err(|e| e.into_data_error())?,
            ),
            // An in-memory database lives and dies with its connection, so the
            // pool keeps exactly one and never recycles it.
            Dialect::Sqlite => DbPool::Sqlite(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .acquire_timeout(settings.connect_timeout)
                    .connect(url)
                    .await
                    .map_err(|e| e.into_data_error())?,
            ),
            Dialect::HsqlDb => {
                return Err(DataError::UnsupportedBackend(dialect.name().to_string()));
            }
        };
        Ok(pool)
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            DbPool::MySql(_) => Dialect::MySql,
            DbPool::Postgres(_) => Dialect::Postgres,
            DbPool::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Check out a connection as a new session.
    pub async fn open_session(&self) -> Result<DbSession, DataError> {
        let session = match self {
            DbPool::MySql(pool) => {
                DbSession::MySql(pool.acquire().await.map_err(|e| e.into_data_error())?)
            }
            DbPool::Postgres(pool) => {
                DbSession::Postgres(pool.acquire().await.map_err(|e| e.into_data_error())?)
            }
            DbPool::Sqlite(pool) => {
                DbSession::Sqlite(pool.acquire().await.map_err(|e| e.into_data_error())?)
            }
        };
        tracing::trace!(dialect = %self.dialect(), "Session opened");
        Ok(session)
    }

    /// Close every connection. Sessions still open are closed as they are returned.
    pub async fn close(&self) {
        match self {
            DbPool::MySql(pool) => pool.close().await,
            DbPool::Postgres(pool) => pool.close().await,
            DbPool::Sqlite(pool) => pool.close().await,
        }
        tracing::debug!(dialect = %self.dialect(), "Pool closed");
    }

    pub fn is_closed(&self) -> bool {
        match self {
            DbPool::MySql(pool) => pool.is_closed(),
            DbPool::Postgres(pool) => pool.is_closed(),
            DbPool::Sqlite(pool) => pool.is_closed(),
        }
    }
}
