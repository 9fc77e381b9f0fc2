//! The per-backend round trip and the suite that runs it for every backend.
//!
//! Each backend walks `Init -> DbConnected -> TableCreated -> Inserted ->
//! Reloaded -> Closed`. A failure stops that backend's walk and is reported
//! with the stage that was being entered; the pool is closed and every session
//! released before the error is returned. Backends share nothing, so one
//! failing never affects the next.

use std::fmt;
use std::time::{Duration, Instant};

use oom_data::{DataError, Entity, EntityMapper};
use oom_data_sqlx::{DbPool, DbSession, OomQuery, PoolSettings};

use crate::backend::{drop_table_sql, Backend};
use crate::fixture::Tester2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    DbConnected,
    TableCreated,
    Inserted,
    Reloaded,
    Closed,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::DbConnected => "db-connected",
            Stage::TableCreated => "table-created",
            Stage::Inserted => "inserted",
            Stage::Reloaded => "reloaded",
            Stage::Closed => "closed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What went wrong during a backend run.
#[derive(Debug)]
pub enum VerifyErrorKind {
    /// No connection URL was configured for a backend that needs one.
    MissingUrl,
    /// The pool could not be opened.
    Connect(DataError),
    /// Dropping or creating the table failed.
    Provision(DataError),
    /// The store reported a different number of inserted rows.
    AffectedRows { expected: u64, actual: u64 },
    /// The key written back after insert is not a usable id.
    GeneratedKey(i64),
    /// Reloading by the generated id found nothing.
    NotFound(i64),
    /// A reloaded field differs from what was inserted.
    FieldMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
    /// The table holds a different number of rows than were inserted.
    RowCount { expected: i64, actual: i64 },
    /// Reloading twice produced different ids.
    UnstableId { first: i64, second: i64 },
    /// Any other data-layer failure (mapping, codec, driver).
    Data(DataError),
}

impl fmt::Display for VerifyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyErrorKind::MissingUrl => write!(f, "no connection URL configured"),
            VerifyErrorKind::Connect(e) => write!(f, "connect failed: {e}"),
            VerifyErrorKind::Provision(e) => write!(f, "table provisioning failed: {e}"),
            VerifyErrorKind::AffectedRows { expected, actual } => {
                write!(f, "insert affected {actual} rows, expected {expected}")
            }
            VerifyErrorKind::GeneratedKey(key) => write!(f, "generated key {key} is not positive"),
            VerifyErrorKind::NotFound(id) => write!(f, "no row found for id {id}"),
            VerifyErrorKind::FieldMismatch {
                field,
                expected,
                actual,
            } => write!(f, "field '{field}' differs: expected {expected}, got {actual}"),
            VerifyErrorKind::RowCount { expected, actual } => {
                write!(f, "table holds {actual} rows, expected {expected}")
            }
            VerifyErrorKind::UnstableId { first, second } => {
                write!(f, "reload returned id {second}, first reload returned {first}")
            }
            VerifyErrorKind::Data(e) => write!(f, "{e}"),
        }
    }
}

/// A failed backend run.
#[derive(Debug)]
pub struct VerifyError {
    pub backend: String,
    /// The stage the run was trying to reach.
    pub stage: Stage,
    pub kind: VerifyErrorKind,
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] failed reaching {}: {}", self.backend, self.stage, self.kind)
    }
}

impl std::error::Error for VerifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            VerifyErrorKind::Connect(e) | VerifyErrorKind::Provision(e) | VerifyErrorKind::Data(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}

/// A successful backend run.
#[derive(Debug, Clone)]
pub struct RoundTripReport {
    pub backend: String,
    pub generated_id: i32,
    pub reloaded: Tester2,
    pub elapsed: Duration,
}

/// Outcome of every backend in a suite, in run order.
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub outcomes: Vec<Result<RoundTripReport, VerifyError>>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(Result::is_ok)
    }

    pub fn passed(&self) -> impl Iterator<Item = &RoundTripReport> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerifyError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }
}

/// Tracks the stage a run has reached and stamps errors with the next one.
struct Run<'a> {
    backend: &'a str,
    stage: Stage,
}

impl<'a> Run<'a> {
    fn new(backend: &'a str) -> Self {
        Run {
            backend,
            stage: Stage::Init,
        }
    }

    fn reached(&mut self, stage: Stage) {
        tracing::debug!(backend = self.backend, from = %self.stage, to = %stage, "Stage reached");
        self.stage = stage;
    }

    fn fail(&self, stage: Stage, kind: VerifyErrorKind) -> VerifyError {
        VerifyError {
            backend: self.backend.to_string(),
            stage,
            kind,
        }
    }
}

/// Run the full round trip against one backend.
pub async fn verify_backend(
    backend: &Backend,
    settings: &PoolSettings,
) -> Result<RoundTripReport, VerifyError> {
    let started = Instant::now();
    let mut run = Run::new(backend.name());
    tracing::info!(backend = backend.name(), dialect = %backend.dialect(), "Verifying backend");

    let url = backend
        .url()
        .ok_or_else(|| run.fail(Stage::DbConnected, VerifyErrorKind::MissingUrl))?;
    let pool = DbPool::connect(backend.dialect(), url, settings)
        .await
        .map_err(|e| run.fail(Stage::DbConnected, VerifyErrorKind::Connect(e)))?;
    run.reached(Stage::DbConnected);

    let result = round_trip(backend, &pool, &mut run).await;
    pool.close().await;

    let reloaded = result?;
    run.reached(Stage::Closed);
    let report = RoundTripReport {
        backend: backend.name().to_string(),
        generated_id: reloaded.id,
        reloaded,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        backend = %report.backend,
        id = report.generated_id,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Round trip verified"
    );
    Ok(report)
}

/// Run every backend in order, continuing past failures.
pub async fn verify_all(backends: &[Backend], settings: &PoolSettings) -> SuiteReport {
    let mut report = SuiteReport::default();
    for backend in backends {
        let outcome = verify_backend(backend, settings).await;
        if let Err(e) = &outcome {
            tracing::warn!(backend = backend.name(), stage = %e.stage, error = %e.kind, "Backend failed");
        }
        report.outcomes.push(outcome);
    }
    report
}

async fn round_trip(backend: &Backend, pool: &DbPool, run: &mut Run<'_>) -> Result<Tester2, VerifyError> {
    let mut mapper = EntityMapper::with_naming(backend.dialect(), backend.naming());
    mapper
        .register::<Tester2>()
        .map_err(|e| run.fail(Stage::TableCreated, VerifyErrorKind::Data(e)))?;

    let mut session = open(pool, run, Stage::TableCreated).await?;
    let provisioned = provision(&mut session, backend).await;
    session.close();
    provisioned.map_err(|e| run.fail(Stage::TableCreated, VerifyErrorKind::Provision(e)))?;
    run.reached(Stage::TableCreated);

    let mut session = open(pool, run, Stage::Inserted).await?;
    let inserted = insert(&mut session, &mapper).await;
    session.close();
    let inserted = inserted.map_err(|kind| run.fail(Stage::Inserted, kind))?;
    run.reached(Stage::Inserted);

    let mut session = open(pool, run, Stage::Reloaded).await?;
    let reloaded = reload(&mut session, &mapper, &inserted).await;
    session.close();
    let reloaded = reloaded.map_err(|kind| run.fail(Stage::Reloaded, kind))?;
    run.reached(Stage::Reloaded);

    Ok(reloaded)
}

async fn open(pool: &DbPool, run: &Run<'_>, stage: Stage) -> Result<DbSession, VerifyError> {
    pool.open_session()
        .await
        .map_err(|e| run.fail(stage, VerifyErrorKind::Data(e)))
}

async fn provision(session: &mut DbSession, backend: &Backend) -> Result<(), DataError> {
    session.execute_ddl(&drop_table_sql()).await?;
    session.execute_ddl(backend.create_table_sql()).await?;
    Ok(())
}

async fn insert(session: &mut DbSession, mapper: &EntityMapper) -> Result<Tester2, VerifyErrorKind> {
    let mut query = OomQuery::new(session, mapper).map_err(VerifyErrorKind::Data)?;
    let mut entity = Tester2::sample();
    let affected = query.insert(&mut entity).await.map_err(VerifyErrorKind::Data)?;
    if affected != 1 {
        return Err(VerifyErrorKind::AffectedRows {
            expected: 1,
            actual: affected,
        });
    }
    if entity.id <= 0 {
        return Err(VerifyErrorKind::GeneratedKey(i64::from(entity.id)));
    }
    Ok(entity)
}

async fn reload(
    session: &mut DbSession,
    mapper: &EntityMapper,
    inserted: &Tester2,
) -> Result<Tester2, VerifyErrorKind> {
    let mut query = OomQuery::new(session, mapper).map_err(VerifyErrorKind::Data)?;
    let id = i64::from(inserted.id);

    let reloaded = query
        .find_by_id::<Tester2>(&inserted.id)
        .await
        .map_err(VerifyErrorKind::Data)?
        .ok_or(VerifyErrorKind::NotFound(id))?;
    compare(inserted, &reloaded)?;

    let count = query.count::<Tester2>().await.map_err(VerifyErrorKind::Data)?;
    if count != 1 {
        return Err(VerifyErrorKind::RowCount {
            expected: 1,
            actual: count,
        });
    }

    let again = query
        .find_by_id::<Tester2>(&inserted.id)
        .await
        .map_err(VerifyErrorKind::Data)?
        .ok_or(VerifyErrorKind::NotFound(id))?;
    if again.id != reloaded.id {
        return Err(VerifyErrorKind::UnstableId {
            first: i64::from(reloaded.id),
            second: i64::from(again.id),
        });
    }
    Ok(reloaded)
}

/// Compare two entities field by field through their column encodings.
///
/// Reports the first field, in declaration order, whose encoded values differ.
pub fn compare<E: Entity>(expected: &E, actual: &E) -> Result<(), VerifyErrorKind> {
    for field in E::fields() {
        let want = field.encode(expected);
        let got = field.encode(actual);
        if want != got {
            return Err(VerifyErrorKind::FieldMismatch {
                field: field.property(),
                expected: want.to_string(),
                actual: got.to_string(),
            });
        }
    }
    Ok(())
}
