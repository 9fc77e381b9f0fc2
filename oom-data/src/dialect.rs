use crate::naming::{CaseFolding, NamingStrategy};

/// SQL dialects the mapper can generate statements for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// MySQL-style `?` placeholders with backtick quoting.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders. Folds unquoted names to lowercase.
    Postgres,
    /// HSQLDB: `?` placeholders, identity columns.
    HsqlDb,
    /// SQLite-style `?` placeholders.
    Sqlite,
}

/// How the store hands back a key it generated during an INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedKeyStrategy {
    /// The session reports the last generated id after the statement.
    LastInsertId,
    /// The INSERT carries a `RETURNING <id>` clause.
    Returning,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::MySql,
        Dialect::Postgres,
        Dialect::HsqlDb,
        Dialect::Sqlite,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::HsqlDb => "hsqldb",
            Dialect::Sqlite => "sqlite",
        }
    }

    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::MySql | Dialect::HsqlDb | Dialect::Sqlite => "?".to_string(),
        }
    }

    pub fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Postgres | Dialect::HsqlDb | Dialect::Sqlite => '"',
        }
    }

    pub fn generated_key_strategy(self) -> GeneratedKeyStrategy {
        match self {
            Dialect::Postgres => GeneratedKeyStrategy::Returning,
            Dialect::MySql | Dialect::HsqlDb | Dialect::Sqlite => {
                GeneratedKeyStrategy::LastInsertId
            }
        }
    }

    /// Tail of an `INSERT INTO <table>` that writes no explicit column.
    pub fn default_values_clause(self) -> &'static str {
        match self {
            Dialect::MySql => "() VALUES ()",
            Dialect::Postgres | Dialect::HsqlDb | Dialect::Sqlite => "DEFAULT VALUES",
        }
    }

    /// Naming strategy matching how the server folds unquoted identifiers.
    ///
    /// Postgres reports result columns in lowercase, so generated names are
    /// forced to lowercase to line up with what comes back.
    pub fn default_naming(self) -> NamingStrategy {
        match self {
            Dialect::Postgres => NamingStrategy::new()
                .tables(CaseFolding::Lowercase)
                .columns(CaseFolding::Lowercase),
            Dialect::MySql | Dialect::HsqlDb | Dialect::Sqlite => NamingStrategy::new(),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "hsqldb" | "hsql" => Ok(Dialect::HsqlDb),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(format!("unknown dialect '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::MySql.placeholder(3), "?");
        assert_eq!(Dialect::HsqlDb.placeholder(1), "?");
    }

    #[test]
    fn test_parse_names() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.name().parse::<Dialect>().unwrap(), dialect);
        }
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_only_postgres_folds_by_default() {
        assert_eq!(
            Dialect::Postgres.default_naming().table_case(),
            CaseFolding::Lowercase
        );
        assert_eq!(Dialect::MySql.default_naming().column_case(), CaseFolding::AsIs);
    }

    #[test]
    fn test_generated_key_strategy() {
        assert_eq!(
            Dialect::Postgres.generated_key_strategy(),
            GeneratedKeyStrategy::Returning
        );
        assert_eq!(
            Dialect::Sqlite.generated_key_strategy(),
            GeneratedKeyStrategy::LastInsertId
        );
    }
}
