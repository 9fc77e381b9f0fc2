pub mod codec;
pub mod datetime;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod naming;
pub mod query;
pub mod sql;
pub mod value;

pub use codec::ColumnCodec;
pub use datetime::CalendarDateTime;
pub use dialect::{Dialect, GeneratedKeyStrategy};
pub use entity::{Entity, Field, FieldRole};
pub use error::{CodecError, DataError};
pub use mapper::{ColumnDescriptor, EntityDescriptor, EntityMapper};
pub use naming::{CaseFolding, IdentifierPolicy, NamingStrategy};
pub use query::{QueryBuilder, QueryError};
pub use sql::{EntitySql, GeneratedKey, Statement};
pub use value::{SqlType, SqlValue};

pub mod prelude {
    //! Re-exports of the most commonly used mapping types.
    pub use crate::{
        CalendarDateTime, ColumnCodec, DataError, Dialect, Entity, EntityMapper, EntitySql, Field,
        NamingStrategy, SqlValue,
    };
}
