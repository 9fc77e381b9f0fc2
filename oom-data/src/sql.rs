//! Statement generation for registered entities.

use crate::codec::ColumnCodec;
use crate::dialect::GeneratedKeyStrategy;
use crate::entity::Entity;
use crate::error::DataError;
use crate::mapper::EntityMapper;
use crate::query::QueryBuilder;
use crate::value::{SqlType, SqlValue};

/// The key column a statement expects the store to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedKey {
    pub column: String,
    pub sql_type: SqlType,
    pub strategy: GeneratedKeyStrategy,
}

/// SQL text plus its bind parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
    pub generated_key: Option<GeneratedKey>,
}

impl Statement {
    fn new(sql: String, params: Vec<SqlValue>) -> Self {
        Self {
            sql,
            params,
            generated_key: None,
        }
    }
}

/// Builds INSERT, find-by-id and COUNT statements from entity descriptors.
pub struct EntitySql;

impl EntitySql {
    /// INSERT of every non-generated column of `entity`.
    ///
    /// When the id is generated, the statement carries a [`GeneratedKey`]
    /// and, for dialects that return keys inline, a `RETURNING` clause.
    pub fn insert<E: Entity>(mapper: &EntityMapper, entity: &E) -> Result<Statement, DataError> {
        let descriptor = mapper.descriptor::<E>()?;
        let dialect = mapper.dialect();
        let naming = mapper.naming();

        let mut columns = Vec::with_capacity(descriptor.columns().len());
        let mut params = Vec::with_capacity(descriptor.columns().len());
        for (field, column) in E::fields().iter().zip(descriptor.columns()) {
            if column.is_generated() {
                continue;
            }
            let value = field.encode(entity);
            check_length(&column.name, column.sql_type, &value)?;
            columns.push(naming.render(&column.name, dialect, "column")?);
            params.push(value);
        }

        let table = naming.render(descriptor.table(), dialect, "table")?;
        let placeholders: Vec<String> = (1..=params.len()).map(|i| dialect.placeholder(i)).collect();
        let mut sql = if columns.is_empty() {
            format!("INSERT INTO {table} {}", dialect.default_values_clause())
        } else {
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        let mut statement = Statement::new(String::new(), params);
        if let Some(key) = descriptor.generated_column() {
            let strategy = dialect.generated_key_strategy();
            if strategy == GeneratedKeyStrategy::Returning {
                sql.push_str(" RETURNING ");
                sql.push_str(&naming.render(&key.name, dialect, "column")?);
            }
            statement.generated_key = Some(GeneratedKey {
                column: key.name.clone(),
                sql_type: key.sql_type,
                strategy,
            });
        }
        statement.sql = sql;
        Ok(statement)
    }

    /// SELECT of all mapped columns where the id equals `id`.
    pub fn find_by_id<E: Entity>(mapper: &EntityMapper, id: &E::Id) -> Result<Statement, DataError> {
        let descriptor = mapper.descriptor::<E>()?;
        let columns: Vec<&str> = descriptor.columns().iter().map(|c| c.name.as_str()).collect();
        let (sql, params) = QueryBuilder::new(descriptor.table(), mapper.dialect())
            .identifier_policy(mapper.naming().policy())
            .where_eq(&descriptor.id_column().name, id.encode())
            .build_select(&columns)?;
        Ok(Statement::new(sql, params))
    }

    /// COUNT of all rows in the entity's table.
    pub fn count<E: Entity>(mapper: &EntityMapper) -> Result<Statement, DataError> {
        let descriptor = mapper.descriptor::<E>()?;
        let (sql, params) = QueryBuilder::new(descriptor.table(), mapper.dialect())
            .identifier_policy(mapper.naming().policy())
            .build_count()?;
        Ok(Statement::new(sql, params))
    }
}

fn check_length(column: &str, sql_type: SqlType, value: &SqlValue) -> Result<(), DataError> {
    if let (SqlType::Varchar(max), SqlValue::Text(text)) = (sql_type, value) {
        let len = text.chars().count();
        if max > 0 && len > max as usize {
            return Err(DataError::Mapping(format!(
                "value for {column} is {len} characters, limit is {max}"
            )));
        }
    }
    Ok(())
}
