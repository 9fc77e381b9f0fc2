use crate::dialect::Dialect;
use crate::naming::{format_identifier_checked, IdentifierPolicy};
use crate::value::SqlValue;

/// A fluent builder for parameterized SELECT and COUNT queries.
///
/// Identifiers are validated (and quoted, depending on the identifier
/// policy) when the query is built; values always travel as bind parameters.
///
/// # Example
///
/// ```ignore
/// let (sql, params) = QueryBuilder::new("TESTER2", Dialect::Postgres)
///     .where_eq("ID", SqlValue::Integer(1))
///     .build_select(&["ID", "NAME"])?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    conditions: Vec<(String, SqlValue)>,
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

impl QueryBuilder {
    pub fn new(table: &str, dialect: Dialect) -> Self {
        Self {
            table: table.to_string(),
            conditions: Vec::new(),
            dialect,
            identifier_policy: IdentifierPolicy::Validate,
        }
    }

    /// Configure identifier validation/quoting behavior.
    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn where_eq(mut self, column: &str, value: SqlValue) -> Self {
        self.conditions.push((column.to_string(), value));
        self
    }

    /// Build a SELECT query returning `(sql, bind_values)`.
    pub fn build_select(&self, columns: &[&str]) -> Result<(String, Vec<SqlValue>), QueryError> {
        let table = self.ident(&self.table, false, "table")?;
        let mut rendered = Vec::with_capacity(columns.len());
        for col in columns {
            rendered.push(self.ident(col, true, "column")?);
        }

        let mut sql = format!("SELECT {} FROM {table}", rendered.join(", "));
        let params = self.append_where(&mut sql)?;
        Ok((sql, params))
    }

    /// Build a COUNT query returning `(sql, bind_values)`.
    pub fn build_count(&self) -> Result<(String, Vec<SqlValue>), QueryError> {
        let table = self.ident(&self.table, false, "table")?;
        let mut sql = format!("SELECT COUNT(*) FROM {table}");
        let params = self.append_where(&mut sql)?;
        Ok((sql, params))
    }

    fn append_where(&self, sql: &mut String) -> Result<Vec<SqlValue>, QueryError> {
        let mut params = Vec::with_capacity(self.conditions.len());
        if self.conditions.is_empty() {
            return Ok(params);
        }
        sql.push_str(" WHERE ");
        let mut clauses = Vec::with_capacity(self.conditions.len());
        for (col, val) in &self.conditions {
            let col = self.ident(col, false, "column")?;
            if val.is_null() {
                clauses.push(format!("{col} IS NULL"));
            } else {
                let placeholder = self.dialect.placeholder(params.len() + 1);
                clauses.push(format!("{col} = {placeholder}"));
                params.push(val.clone());
            }
        }
        sql.push_str(&clauses.join(" AND "));
        Ok(params)
    }

    fn ident(&self, ident: &str, allow_star: bool, kind: &'static str) -> Result<String, QueryError> {
        format_identifier_checked(ident, self.dialect, self.identifier_policy, allow_star, kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
        }
    }
}

impl std::error::Error for QueryError {}
