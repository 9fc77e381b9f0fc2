use oom_data::{DataError, Entity, EntityMapper, EntitySql, GeneratedKeyStrategy};

use crate::error::SqlxResult;
use crate::session::DbSession;

/// Entity-level operations over one open session.
///
/// Borrows the session mutably for its lifetime, so statements issued through
/// it never interleave with other work on the same connection.
///
/// ```ignore
/// let mut session = pool.open_session().await?;
/// let mut query = OomQuery::new(&mut session, &mapper)?;
/// query.insert(&mut entity).await?;
/// let reloaded = query.find_by_id::<Tester2>(&entity.id).await?;
/// ```
pub struct OomQuery<'s> {
    session: &'s mut DbSession,
    mapper: &'s EntityMapper,
}

impl<'s> OomQuery<'s> {
    /// Fails when the mapper was built for a different dialect than the session.
    pub fn new(session: &'s mut DbSession, mapper: &'s EntityMapper) -> SqlxResult<Self> {
        if session.dialect() != mapper.dialect() {
            return Err(DataError::Mapping(format!(
                "mapper targets {} but the session is {}",
                mapper.dialect(),
                session.dialect()
            )));
        }
        Ok(Self { session, mapper })
    }

    pub fn mapper(&self) -> &EntityMapper {
        self.mapper
    }

    /// Insert `entity` and write any generated key back onto it.
    ///
    /// Returns the number of rows the store reports as inserted. The key is
    /// only written back when that count is exactly one.
    pub async fn insert<E: Entity>(&mut self, entity: &mut E) -> SqlxResult<u64> {
        let statement = EntitySql::insert(self.mapper, &*entity)?;
        let Some(key) = statement.generated_key.clone() else {
            return Ok(self.session.execute(&statement).await?.rows_affected);
        };

        let (affected, generated) = match key.strategy {
            GeneratedKeyStrategy::LastInsertId => {
                let outcome = self.session.execute(&statement).await?;
                (outcome.rows_affected, outcome.last_insert_id)
            }
            GeneratedKeyStrategy::Returning => {
                let rows = self.session.fetch_rows(&statement, &[key.sql_type]).await?;
                let generated = rows
                    .first()
                    .and_then(|row| row.first())
                    .and_then(|(_, value)| value.as_i64());
                (rows.len() as u64, generated)
            }
        };

        // A per-connection last insert id is stale unless this statement inserted exactly one row.
        if affected != 1 {
            tracing::debug!(
                entity = std::any::type_name::<E>(),
                affected,
                "Insert left generated key unassigned"
            );
            return Ok(affected);
        }
        let generated = generated.ok_or_else(|| {
            DataError::Mapping(format!("store returned no value for generated key {}", key.column))
        })?;
        self.mapper.assign_generated_key(entity, generated)?;
        tracing::debug!(
            entity = std::any::type_name::<E>(),
            key = generated,
            affected,
            "Entity inserted"
        );
        Ok(affected)
    }

    /// Load the entity whose id equals `id`.
    ///
    /// `Ok(None)` when no row matches. More than one match is a mapping error.
    pub async fn find_by_id<E: Entity>(&mut self, id: &E::Id) -> SqlxResult<Option<E>> {
        let statement = EntitySql::find_by_id::<E>(self.mapper, id)?;
        let types: Vec<_> = self
            .mapper
            .descriptor::<E>()?
            .columns()
            .iter()
            .map(|c| c.sql_type)
            .collect();
        let mut rows = self.session.fetch_rows(&statement, &types).await?;
        match rows.len() {
            0 => Ok(None),
            1 => {
                let row = rows.remove(0);
                self.mapper.materialize::<E>(row).map(Some)
            }
            n => Err(DataError::Mapping(format!(
                "find by id matched {n} rows of {}",
                std::any::type_name::<E>()
            ))),
        }
    }

    /// Number of rows in the entity's table.
    pub async fn count<E: Entity>(&mut self) -> SqlxResult<i64> {
        let statement = EntitySql::count::<E>(self.mapper)?;
        self.session.fetch_i64(&statement).await
    }

    /// Execute literal DDL on the underlying session.
    pub async fn execute_ddl(&mut self, sql: &str) -> SqlxResult<u64> {
        self.session.execute_ddl(sql).await
    }
}
