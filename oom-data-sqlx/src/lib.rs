//! # oom-data-sqlx: SQLx backend for the OOM data layer
//!
//! This crate talks to real databases on behalf of `oom-data`. The mapping
//! core builds SQL text and typed parameters; this crate binds them, runs them
//! and decodes the result rows back into [`SqlValue`](oom_data::SqlValue)s.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DbPool`] | Connection pool for MySQL, PostgreSQL or SQLite |
//! | [`PoolSettings`] | Pool size and connect timeout |
//! | [`DbSession`] | One checked-out connection; returned to the pool on close or drop |
//! | [`OomQuery`] | Insert with generated key, find by id and count over a session |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Backends
//!
//! MySQL, PostgreSQL and SQLite are compiled in. HSQLDB has a [`Dialect`]
//! (so its SQL can be generated and inspected) but no driver: connecting
//! returns [`DataError::UnsupportedBackend`](oom_data::DataError::UnsupportedBackend).
//!
//! # Quick start
//!
//! ```ignore
//! use oom_data_sqlx::prelude::*;
//!
//! let pool = DbPool::connect(Dialect::Sqlite, "sqlite::memory:", &PoolSettings::default()).await?;
//! let mut mapper = EntityMapper::new(Dialect::Sqlite);
//! mapper.register::<Tester2>()?;
//!
//! let mut session = pool.open_session().await?;
//! let mut query = OomQuery::new(&mut session, &mapper)?;
//! query.insert(&mut entity).await?;
//! let loaded: Option<Tester2> = query.find_by_id(&entity.id).await?;
//! session.close();
//! pool.close().await;
//! ```
//!
//! # Error bridging
//!
//! Due to Rust's orphan rules, `From<sqlx::Error> for DataError` can't be
//! implemented here. Use the [`SqlxErrorExt`] trait instead.
//!
//! [`Dialect`]: oom_data::Dialect

mod bind;
pub mod error;
pub mod pool;
pub mod query;
pub mod session;

pub use error::{SqlxErrorExt, SqlxResult};
pub use pool::{DbPool, PoolSettings};
pub use query::OomQuery;
pub use session::{DbSession, ExecOutcome, LabelledRow};

/// Re-exports of the most commonly used types from both `oom-data` and this crate.
pub mod prelude {
    pub use crate::{DbPool, DbSession, OomQuery, PoolSettings, SqlxErrorExt};
    pub use oom_data::prelude::*;
}
