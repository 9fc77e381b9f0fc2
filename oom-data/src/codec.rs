//! Two-way conversion between field values and column values.
//!
//! Every mapped field type implements [`ColumnCodec`]. Decoding is the exact
//! inverse of encoding for every value the column type can hold; the only
//! lossy conversion is [`CalendarDateTime`], which keeps milliseconds.

use chrono::NaiveDateTime;

use crate::datetime::CalendarDateTime;
use crate::error::CodecError;
use crate::value::{SqlType, SqlValue};

pub trait ColumnCodec: Sized {
    /// Column storage type for this Rust type.
    const SQL_TYPE: SqlType;
    /// Whether `None`/NULL is representable.
    const NULLABLE: bool = false;

    fn encode(&self) -> SqlValue;

    fn decode(value: SqlValue) -> Result<Self, CodecError>;
}

fn mismatch(expected: SqlType, value: &SqlValue) -> CodecError {
    match value {
        SqlValue::Null(_) => CodecError::UnexpectedNull { expected },
        other => CodecError::TypeMismatch {
            expected,
            actual: other.sql_type(),
        },
    }
}

impl ColumnCodec for i32 {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn encode(&self) -> SqlValue {
        SqlValue::Integer(*self)
    }

    // Drivers report generated keys as 64-bit; accept any width that fits.
    fn decode(value: SqlValue) -> Result<Self, CodecError> {
        match value {
            SqlValue::Integer(v) => Ok(v),
            SqlValue::BigInt(v) => i32::try_from(v).map_err(|_| CodecError::OutOfRange {
                expected: SqlType::Integer,
                value: v,
            }),
            other => Err(mismatch(SqlType::Integer, &other)),
        }
    }
}

impl ColumnCodec for i64 {
    const SQL_TYPE: SqlType = SqlType::BigInt;

    fn encode(&self) -> SqlValue {
        SqlValue::BigInt(*self)
    }

    fn decode(value: SqlValue) -> Result<Self, CodecError> {
        match value {
            SqlValue::BigInt(v) => Ok(v),
            SqlValue::Integer(v) => Ok(i64::from(v)),
            other => Err(mismatch(SqlType::BigInt, &other)),
        }
    }
}

impl ColumnCodec for String {
    const SQL_TYPE: SqlType = SqlType::Varchar(0);

    fn encode(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn decode(value: SqlValue) -> Result<Self, CodecError> {
        match value {
            SqlValue::Text(v) => Ok(v),
            other => Err(mismatch(SqlType::Varchar(0), &other)),
        }
    }
}

impl ColumnCodec for NaiveDateTime {
    const SQL_TYPE: SqlType = SqlType::Timestamp;

    fn encode(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }

    fn decode(value: SqlValue) -> Result<Self, CodecError> {
        match value {
            SqlValue::Timestamp(v) => Ok(v),
            other => Err(mismatch(SqlType::Timestamp, &other)),
        }
    }
}

impl ColumnCodec for CalendarDateTime {
    const SQL_TYPE: SqlType = SqlType::Timestamp;

    fn encode(&self) -> SqlValue {
        SqlValue::Timestamp(self.to_naive())
    }

    fn decode(value: SqlValue) -> Result<Self, CodecError> {
        match value {
            SqlValue::Timestamp(v) => Ok(CalendarDateTime::from_naive(v)),
            other => Err(mismatch(SqlType::Timestamp, &other)),
        }
    }
}

impl<T: ColumnCodec> ColumnCodec for Option<T> {
    const SQL_TYPE: SqlType = T::SQL_TYPE;
    const NULLABLE: bool = true;

    fn encode(&self) -> SqlValue {
        match self {
            Some(v) => v.encode(),
            None => SqlValue::Null(T::SQL_TYPE),
        }
    }

    fn decode(value: SqlValue) -> Result<Self, CodecError> {
        match value {
            SqlValue::Null(_) => Ok(None),
            other => T::decode(other).map(Some),
        }
    }
}
