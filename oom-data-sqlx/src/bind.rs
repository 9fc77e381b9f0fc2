//! Moving [`SqlValue`]s across the driver boundary.
//!
//! Binding is a macro so each backend arm binds concrete Rust types; typed
//! NULLs bind as `None::<T>` of the column's type.

use chrono::NaiveDateTime;
use oom_data::{SqlType, SqlValue};
use sqlx::{Column, ColumnIndex, Decode, Row, Type};

macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for value in $params {
            query = match value {
                ::oom_data::SqlValue::Null(::oom_data::SqlType::Integer) => query.bind(None::<i32>),
                ::oom_data::SqlValue::Null(::oom_data::SqlType::BigInt) => query.bind(None::<i64>),
                ::oom_data::SqlValue::Null(::oom_data::SqlType::Varchar(_)) => {
                    query.bind(None::<String>)
                }
                ::oom_data::SqlValue::Null(::oom_data::SqlType::Timestamp) => {
                    query.bind(None::<::chrono::NaiveDateTime>)
                }
                ::oom_data::SqlValue::Integer(v) => query.bind(*v),
                ::oom_data::SqlValue::BigInt(v) => query.bind(*v),
                ::oom_data::SqlValue::Text(v) => query.bind(v.clone()),
                ::oom_data::SqlValue::Timestamp(v) => query.bind(*v),
            };
        }
        query
    }};
}

pub(crate) use bind_params;

/// Column labels as reported by the driver.
pub(crate) fn labels<R: Row>(row: &R) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

/// Decode column `idx` as `ty`, honouring NULL.
pub(crate) fn decode_column<'r, R>(row: &'r R, idx: usize, ty: SqlType) -> Result<SqlValue, sqlx::Error>
where
    R: Row,
    usize: ColumnIndex<R>,
    i32: Decode<'r, R::Database> + Type<R::Database>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
    String: Decode<'r, R::Database> + Type<R::Database>,
    NaiveDateTime: Decode<'r, R::Database> + Type<R::Database>,
{
    let value = match ty {
        SqlType::Integer => row.try_get::<Option<i32>, _>(idx)?.map(SqlValue::Integer),
        SqlType::BigInt => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::BigInt),
        SqlType::Varchar(_) => row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text),
        SqlType::Timestamp => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(SqlValue::Timestamp),
    };
    Ok(value.unwrap_or(SqlValue::Null(ty)))
}

/// MySQL flavour: integer columns may be `UNSIGNED` (e.g. an `AUTO_INCREMENT`
/// key), which the signed decoders refuse, so integers are read unchecked as
/// 64-bit and narrowed by the field codec.
pub(crate) fn decode_mysql_column(
    row: &sqlx::mysql::MySqlRow,
    idx: usize,
    ty: SqlType,
) -> Result<SqlValue, sqlx::Error> {
    match ty {
        SqlType::Integer | SqlType::BigInt => Ok(row
            .try_get_unchecked::<Option<i64>, _>(idx)?
            .map(SqlValue::BigInt)
            .unwrap_or(SqlValue::Null(ty))),
        other => decode_column(row, idx, other),
    }
}
