//! # oom-verify: entity round-trip verifier
//!
//! For each configured backend: connect, create `TESTER2`, insert one
//! [`Tester2`] while retrieving its generated key, reload it by that key and
//! compare every field. Backends run one after another; each gets a fresh
//! pool, fresh sessions and a fresh mapper.
//!
//! ```ignore
//! let config = VerifyConfig::from_config(&OomConfig::load("dev")?)?;
//! let report = verify_all(&config.backends, &config.pool).await;
//! assert!(report.all_passed());
//! ```

pub mod backend;
pub mod config;
pub mod fixture;
pub mod verifier;

pub use backend::{create_table_sql, drop_table_sql, Backend};
pub use config::VerifyConfig;
pub use fixture::Tester2;
pub use verifier::{
    compare, verify_all, verify_backend, RoundTripReport, Stage, SuiteReport, VerifyError,
    VerifyErrorKind,
};
