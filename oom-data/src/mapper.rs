//! Entity registry: resolved table and column names per entity type.
//!
//! An [`EntityMapper`] is built for one dialect and one naming strategy.
//! Entities are registered explicitly; registration validates the field
//! descriptors once so statement generation and row materialisation can rely
//! on a well-formed shape.

use std::any::TypeId;
use std::collections::HashMap;

use crate::dialect::Dialect;
use crate::entity::{Entity, FieldRole};
use crate::error::DataError;
use crate::naming::NamingStrategy;
use crate::value::{SqlType, SqlValue};

/// One mapped column after name resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub property: &'static str,
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub role: FieldRole,
}

impl ColumnDescriptor {
    pub fn is_id(&self) -> bool {
        matches!(self.role, FieldRole::Id { .. })
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.role, FieldRole::Id { generated: true })
    }
}

/// Resolved mapping of one entity type, columns in field order.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    entity: &'static str,
    table: String,
    columns: Vec<ColumnDescriptor>,
    id_index: usize,
}

impl EntityDescriptor {
    pub fn entity_name(&self) -> &'static str {
        self.entity
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn id_column(&self) -> &ColumnDescriptor {
        &self.columns[self.id_index]
    }

    pub fn generated_column(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.is_generated())
    }

    /// Position of the column reported under `label`, ignoring ASCII case.
    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone)]
pub struct EntityMapper {
    dialect: Dialect,
    naming: NamingStrategy,
    entities: HashMap<TypeId, EntityDescriptor>,
}

impl EntityMapper {
    /// A mapper using the dialect's default naming strategy.
    pub fn new(dialect: Dialect) -> Self {
        Self::with_naming(dialect, dialect.default_naming())
    }

    pub fn with_naming(dialect: Dialect, naming: NamingStrategy) -> Self {
        Self {
            dialect,
            naming,
            entities: HashMap::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn naming(&self) -> &NamingStrategy {
        &self.naming
    }

    /// Validate and store the mapping for `E`. Registering again is a no-op.
    pub fn register<E: Entity>(&mut self) -> Result<&EntityDescriptor, DataError> {
        let type_id = TypeId::of::<E>();
        if !self.entities.contains_key(&type_id) {
            let descriptor = self.build_descriptor::<E>()?;
            tracing::debug!(
                entity = descriptor.entity,
                table = %descriptor.table,
                columns = descriptor.columns.len(),
                "Entity registered"
            );
            self.entities.insert(type_id, descriptor);
        }
        self.descriptor::<E>()
    }

    pub fn is_registered<E: Entity>(&self) -> bool {
        self.entities.contains_key(&TypeId::of::<E>())
    }

    pub fn descriptor<E: Entity>(&self) -> Result<&EntityDescriptor, DataError> {
        self.entities
            .get(&TypeId::of::<E>())
            .ok_or(DataError::NotRegistered(std::any::type_name::<E>()))
    }

    /// Build a fresh `E` from labelled column values.
    ///
    /// Labels are matched to mapped columns ignoring ASCII case; unmapped
    /// labels are ignored, a mapped column missing from the row is an error.
    pub fn materialize<E: Entity>(&self, row: Vec<(String, SqlValue)>) -> Result<E, DataError> {
        let descriptor = self.descriptor::<E>()?;
        let mut slots: Vec<Option<SqlValue>> = vec![None; descriptor.columns.len()];
        for (label, value) in row {
            match descriptor.position_of(&label) {
                Some(idx) => slots[idx] = Some(value),
                None => tracing::trace!(label = %label, "Ignoring unmapped column"),
            }
        }

        let mut entity = E::default();
        for ((field, column), slot) in E::fields().iter().zip(&descriptor.columns).zip(slots) {
            let value = slot.ok_or_else(|| {
                DataError::Mapping(format!(
                    "column {} missing from result for {}",
                    column.name, descriptor.entity
                ))
            })?;
            field
                .decode_into(&mut entity, value)
                .map_err(|e| DataError::codec(&column.name, e))?;
        }
        Ok(entity)
    }

    /// Write a store-assigned key back onto `entity`.
    pub fn assign_generated_key<E: Entity>(&self, entity: &mut E, key: i64) -> Result<(), DataError> {
        let descriptor = self.descriptor::<E>()?;
        let fields = E::fields();
        let (field, column) = fields
            .iter()
            .zip(&descriptor.columns)
            .find(|(field, _)| field.is_generated())
            .ok_or_else(|| {
                DataError::Mapping(format!("{} has no generated key", descriptor.entity))
            })?;
        field
            .decode_into(entity, SqlValue::BigInt(key))
            .map_err(|e| DataError::codec(&column.name, e))
    }

    fn build_descriptor<E: Entity>(&self) -> Result<EntityDescriptor, DataError> {
        let entity = std::any::type_name::<E>();
        let fields = E::fields();
        if fields.is_empty() {
            return Err(DataError::Mapping(format!("{entity} declares no fields")));
        }

        let table = self.naming.table_name(E::table_name());
        self.naming.render(&table, self.dialect, "table")?;

        let mut columns: Vec<ColumnDescriptor> = Vec::with_capacity(fields.len());
        for field in &fields {
            let name = self.naming.column_name(field.column_name());
            self.naming.render(&name, self.dialect, "column")?;
            if columns.iter().any(|c| c.name.eq_ignore_ascii_case(&name)) {
                return Err(DataError::Mapping(format!(
                    "{entity} maps column {name} more than once"
                )));
            }
            columns.push(ColumnDescriptor {
                property: field.property(),
                name,
                sql_type: field.sql_type(),
                nullable: field.nullable(),
                role: field.role(),
            });
        }

        let ids: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_id())
            .map(|(idx, _)| idx)
            .collect();
        let id_index = match ids.as_slice() {
            [idx] => *idx,
            [] => return Err(DataError::Mapping(format!("{entity} has no id field"))),
            _ => return Err(DataError::Mapping(format!("{entity} has more than one id field"))),
        };
        if columns[id_index].nullable {
            return Err(DataError::Mapping(format!("{entity} id must not be optional")));
        }

        Ok(EntityDescriptor {
            entity,
            table,
            columns,
            id_index,
        })
    }
}
