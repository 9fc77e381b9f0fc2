use crate::codec::ColumnCodec;
use crate::error::CodecError;
use crate::value::{SqlType, SqlValue};

/// Trait representing a mapped entity: a table name plus an explicit list of
/// field descriptors.
///
/// Field order is the column order used in generated statements. Exactly one
/// field must be the id; [`EntityMapper::register`](crate::EntityMapper::register)
/// checks the descriptor.
///
/// # Example
///
/// ```ignore
/// impl Entity for User {
///     type Id = i64;
///     fn table_name() -> &'static str { "USERS" }
///     fn fields() -> Vec<Field<Self>> {
///         vec![
///             Field::id("id", "ID", |u: &User| &u.id, |u: &mut User| &mut u.id).generated(),
///             Field::column("email", "EMAIL", |u: &User| &u.email, |u: &mut User| &mut u.email),
///         ]
///     }
///     fn id(&self) -> &i64 { &self.id }
/// }
/// ```
pub trait Entity: Default + Send + Sync + 'static {
    type Id: ColumnCodec + Send + Sync + 'static;

    fn table_name() -> &'static str;
    fn fields() -> Vec<Field<Self>>;
    fn id(&self) -> &Self::Id;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Primary key. `generated` keys are assigned by the store and never inserted.
    Id { generated: bool },
    Column,
}

type Encoder<E> = Box<dyn Fn(&E) -> SqlValue + Send + Sync>;
type Decoder<E> = Box<dyn Fn(&mut E, SqlValue) -> Result<(), CodecError> + Send + Sync>;

/// Mapping of one entity property to one column, with its codec.
pub struct Field<E> {
    property: &'static str,
    column: &'static str,
    sql_type: SqlType,
    nullable: bool,
    role: FieldRole,
    encode: Encoder<E>,
    decode: Decoder<E>,
}

impl<E: 'static> Field<E> {
    /// A plain column backed by the property reached through `get`/`get_mut`.
    pub fn column<T>(
        property: &'static str,
        column: &'static str,
        get: fn(&E) -> &T,
        get_mut: fn(&mut E) -> &mut T,
    ) -> Self
    where
        T: ColumnCodec + 'static,
    {
        Self {
            property,
            column,
            sql_type: T::SQL_TYPE,
            nullable: T::NULLABLE,
            role: FieldRole::Column,
            encode: Box::new(move |entity: &E| get(entity).encode()),
            decode: Box::new(move |entity: &mut E, value: SqlValue| -> Result<(), CodecError> {
                *get_mut(entity) = T::decode(value)?;
                Ok(())
            }),
        }
    }

    /// The primary key column.
    pub fn id<T>(
        property: &'static str,
        column: &'static str,
        get: fn(&E) -> &T,
        get_mut: fn(&mut E) -> &mut T,
    ) -> Self
    where
        T: ColumnCodec + 'static,
    {
        Self {
            role: FieldRole::Id { generated: false },
            ..Self::column(property, column, get, get_mut)
        }
    }

    /// Mark the id as assigned by the data store at insert time.
    pub fn generated(mut self) -> Self {
        if let FieldRole::Id { .. } = self.role {
            self.role = FieldRole::Id { generated: true };
        }
        self
    }

    /// Bound the length of a text column.
    pub fn length(mut self, max: u32) -> Self {
        if let SqlType::Varchar(_) = self.sql_type {
            self.sql_type = SqlType::Varchar(max);
        }
        self
    }
}

impl<E> Field<E> {
    pub fn property(&self) -> &'static str {
        self.property
    }

    pub fn column_name(&self) -> &'static str {
        self.column
    }

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub fn is_id(&self) -> bool {
        matches!(self.role, FieldRole::Id { .. })
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.role, FieldRole::Id { generated: true })
    }

    pub fn encode(&self, entity: &E) -> SqlValue {
        (self.encode)(entity)
    }

    pub fn decode_into(&self, entity: &mut E, value: SqlValue) -> Result<(), CodecError> {
        (self.decode)(entity, value)
    }
}

impl<E> std::fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("property", &self.property)
            .field("column", &self.column)
            .field("sql_type", &self.sql_type)
            .field("nullable", &self.nullable)
            .field("role", &self.role)
            .finish()
    }
}
