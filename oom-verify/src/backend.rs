//! Per-backend connection profile and `TESTER2` DDL.

use oom_data::{Dialect, NamingStrategy};

use crate::fixture::TABLE;

const MYSQL_DDL: &str = "create table TESTER2 (\
    ID INT UNSIGNED NOT NULL AUTO_INCREMENT,\
    NAME VARCHAR(20) not null,\
    VALUE INT NULL,\
    TIME TIMESTAMP,\
    TIME2 TIMESTAMP,\
    primary key (ID))";

const POSTGRES_DDL: &str = "create table TESTER2 (\
    ID SERIAL,\
    NAME varchar(20) NOT NULL,\
    VALUE integer NULL,\
    TIME TIMESTAMP,\
    TIME2 TIMESTAMP,\
    primary key (ID))";

const HSQLDB_DDL: &str = "create table TESTER2 (\
    ID integer GENERATED BY DEFAULT AS IDENTITY(START WITH 1) PRIMARY KEY,\
    NAME varchar(20) NOT NULL,\
    VALUE integer NULL,\
    TIME TIMESTAMP,\
    TIME2 TIMESTAMP)";

const SQLITE_DDL: &str = "create table TESTER2 (\
    ID INTEGER PRIMARY KEY AUTOINCREMENT,\
    NAME varchar(20) NOT NULL,\
    VALUE integer NULL,\
    TIME TIMESTAMP,\
    TIME2 TIMESTAMP)";

/// The literal `TESTER2` DDL for `dialect`.
pub fn create_table_sql(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySql => MYSQL_DDL,
        Dialect::Postgres => POSTGRES_DDL,
        Dialect::HsqlDb => HSQLDB_DDL,
        Dialect::Sqlite => SQLITE_DDL,
    }
}

/// Drops a table left over from a previous run.
pub fn drop_table_sql() -> String {
    format!("DROP TABLE IF EXISTS {TABLE}")
}

/// Everything needed to run the round trip against one store.
#[derive(Debug, Clone)]
pub struct Backend {
    name: String,
    dialect: Dialect,
    url: Option<String>,
    naming: NamingStrategy,
    create_table: String,
}

impl Backend {
    /// A profile with the dialect's default naming and DDL.
    ///
    /// SQLite defaults to a private in-memory database; the other dialects
    /// need a URL.
    pub fn new(dialect: Dialect) -> Self {
        Backend {
            name: dialect.name().to_string(),
            dialect,
            url: (dialect == Dialect::Sqlite).then(|| "sqlite::memory:".to_string()),
            naming: dialect.default_naming(),
            create_table: create_table_sql(dialect).to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Force table and column names to lowercase, or back to as-declared.
    pub fn lowercase(mut self, on: bool) -> Self {
        self.naming = self.naming.lowercase(on);
        self
    }

    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    /// Replace the table DDL. It runs as a raw script, so it may hold several statements.
    pub fn with_create_table(mut self, sql: impl Into<String>) -> Self {
        self.create_table = sql.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn naming(&self) -> NamingStrategy {
        self.naming
    }

    pub fn create_table_sql(&self) -> &str {
        &self.create_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oom_data::CaseFolding;

    #[test]
    fn test_ddl_generated_key_syntax() {
        assert!(create_table_sql(Dialect::MySql).contains("AUTO_INCREMENT"));
        assert!(create_table_sql(Dialect::Postgres).contains("SERIAL"));
        assert!(create_table_sql(Dialect::HsqlDb).contains("GENERATED BY DEFAULT AS IDENTITY"));
        assert!(create_table_sql(Dialect::Sqlite).contains("AUTOINCREMENT"));
    }

    #[test]
    fn test_every_ddl_declares_five_columns() {
        for dialect in Dialect::ALL {
            let ddl = create_table_sql(dialect);
            for column in ["ID", "NAME", "VALUE", "TIME", "TIME2"] {
                assert!(ddl.contains(column), "{dialect} DDL lacks {column}");
            }
            assert!(ddl.contains("varchar(20)") || ddl.contains("VARCHAR(20)"));
        }
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(drop_table_sql(), "DROP TABLE IF EXISTS TESTER2");
    }

    #[test]
    fn test_defaults() {
        let sqlite = Backend::new(Dialect::Sqlite);
        assert_eq!(sqlite.name(), "sqlite");
        assert_eq!(sqlite.url(), Some("sqlite::memory:"));
        assert!(Backend::new(Dialect::MySql).url().is_none());

        let pg = Backend::new(Dialect::Postgres);
        assert_eq!(pg.naming().table_case(), CaseFolding::Lowercase);
        assert_eq!(pg.naming().column_case(), CaseFolding::Lowercase);
    }

    #[test]
    fn test_lowercase_override() {
        let pg = Backend::new(Dialect::Postgres).lowercase(false);
        assert_eq!(pg.naming().table_case(), CaseFolding::AsIs);
        let mysql = Backend::new(Dialect::MySql).lowercase(true);
        assert_eq!(mysql.naming().column_case(), CaseFolding::Lowercase);
    }
}
