///
/// FieldModel
/// Static, per-field metadata declared by each record type.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Field name as used in payloads, predicates, and indexing.
    pub name: &'static str,
    pub kind: FieldKind,
    pub role: FieldRole,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind, role: FieldRole) -> Self {
        Self { name, kind, role }
    }

    /// Declare the primary-key field.
    #[must_use]
    pub const fn primary_key(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldRole::PrimaryKey)
    }

    /// Declare a secondary-indexed field.
    #[must_use]
    pub const fn indexed(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldRole::Indexed)
    }

    /// Declare a plain (unindexed) field.
    #[must_use]
    pub const fn plain(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, FieldRole::Plain)
    }

    /// Whether this field carries its own bucket index (secondary indexes
    /// and the primary key both do).
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        matches!(self.role, FieldRole::PrimaryKey | FieldRole::Indexed)
    }
}

///
/// FieldKind
///
/// Declared runtime shape of a field. `Ref` flattens to the referenced
/// record's primary key; `RefList` to an ordered list of primary keys.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Int,
    Float,
    Text,
    Bool,
    Ref,
    RefList,
}

impl FieldKind {
    /// Scalar kinds are the only ones whose values can key an index bucket.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Text | Self::Bool)
    }
}

///
/// FieldRole
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldRole {
    PrimaryKey,
    Indexed,
    Plain,
}
