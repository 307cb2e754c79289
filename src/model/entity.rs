use crate::{
    error::InternalError,
    model::field::{FieldModel, FieldRole},
    traits::Entity,
};

///
/// EntityModel
///
/// Validated runtime descriptor for one record type: which field is the
/// primary key, which fields carry secondary indexes, which are references.
/// Built from the type's static `FIELDS` declaration; validation happens
/// once per process per type (the `Db` caches the outcome by entity name).
///

#[derive(Clone, Copy, Debug)]
pub struct EntityModel {
    /// Stable collection name.
    pub name: &'static str,
    /// Ordered field list (authoritative for codec and index planning).
    pub fields: &'static [FieldModel],
    /// Primary key field (points at an entry in `fields`).
    pub primary_key: &'static FieldModel,
}

impl EntityModel {
    /// Build and validate the model for an entity type.
    ///
    /// Fails with a schema error when the declaration has zero or more than
    /// one primary-key field, or when a primary-key/indexed field is not a
    /// scalar kind.
    pub fn of<E: Entity>() -> Result<Self, InternalError> {
        Self::try_new(E::NAME, E::FIELDS)
    }

    pub(crate) fn try_new(
        name: &'static str,
        fields: &'static [FieldModel],
    ) -> Result<Self, InternalError> {
        let mut primary_key = None;
        for field in fields {
            match field.role {
                FieldRole::PrimaryKey => {
                    if primary_key.is_some() {
                        return Err(InternalError::schema(format!(
                            "{name}: more than one primary key field"
                        )));
                    }
                    primary_key = Some(field);
                }
                FieldRole::Indexed | FieldRole::Plain => {}
            }

            if field.is_indexed() && !field.kind.is_scalar() {
                return Err(InternalError::schema(format!(
                    "{name}.{}: indexed fields must be scalar",
                    field.name
                )));
            }
        }

        let primary_key = primary_key.ok_or_else(|| {
            InternalError::schema(format!("{name}: no primary key field declared"))
        })?;

        Ok(Self {
            name,
            fields,
            primary_key,
        })
    }

    /// Rebuild a model whose declaration already passed validation.
    ///
    /// Callers must only use this behind the `Db`'s per-type validation
    /// cache; the primary key is assumed present.
    pub(crate) fn assume_valid<E: Entity>() -> Self {
        let primary_key = E::FIELDS
            .iter()
            .find(|f| matches!(f.role, FieldRole::PrimaryKey))
            .unwrap_or(&E::FIELDS[0]);

        Self {
            name: E::NAME,
            fields: E::FIELDS,
            primary_key,
        }
    }

    /// Look up a declared field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that carry a bucket index (primary key included).
    pub fn indexed_fields(&self) -> impl Iterator<Item = &'static FieldModel> {
        self.fields.iter().filter(|f| f.is_indexed())
    }
}

///
/// TESTS
///
