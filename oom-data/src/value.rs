use chrono::NaiveDateTime;

/// Storage type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// 32-bit integer (`INT`, `INTEGER`, `SERIAL`).
    Integer,
    /// 64-bit integer (`BIGINT`).
    BigInt,
    /// Bounded text; `0` means unbounded.
    Varchar(u32),
    /// Timestamp without time zone.
    Timestamp,
}

impl SqlType {
    pub fn name(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Varchar(_) => "VARCHAR",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }
}

/// A single column value on its way to or from the driver.
///
/// Nulls carry their column type so drivers that type their parameters
/// (Postgres) can bind them.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null(SqlType),
    Integer(i32),
    BigInt(i64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    pub fn sql_type(&self) -> SqlType {
        match self {
            SqlValue::Null(ty) => *ty,
            SqlValue::Integer(_) => SqlType::Integer,
            SqlValue::BigInt(_) => SqlType::BigInt,
            SqlValue::Text(_) => SqlType::Varchar(0),
            SqlValue::Timestamp(_) => SqlType::Timestamp,
        }
    }

    /// Widen an integer value, whatever its storage width.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(i64::from(*v)),
            SqlValue::BigInt(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null(_) => write!(f, "NULL"),
            SqlValue::Integer(v) => write!(f, "{v}"),
            SqlValue::BigInt(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "'{v}'"),
            SqlValue::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}
