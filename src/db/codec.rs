use crate::{
    db::Db,
    error::{ErrorOrigin, InternalError},
    serialize::{self, SerializeError},
    store::TableStore,
    traits::Entity,
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cell marker for a record that resolved to nothing. Decodes to the empty
/// sentinel, never to an error.
pub(crate) const TOMBSTONE: &str = "-";

///
/// Payload
///
/// The flat serialized form of one record: field name to tagged value.
/// Scalars are stored verbatim; reference fields are flattened to the
/// referenced record's primary key (single) or an ordered key list (multi).
/// Serializes as one flat JSON object per backing row.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub(crate) fn insert(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    pub(crate) fn to_text(&self) -> Result<String, SerializeError> {
        serialize::serialize(self)
    }

    pub(crate) fn from_text(text: &str) -> Result<Self, SerializeError> {
        serialize::deserialize(text)
    }

    /// Whether a raw cell holds no payload (never written, blank, or
    /// tombstoned).
    #[must_use]
    pub(crate) fn is_empty_text(text: &str) -> bool {
        let trimmed = text.trim();
        trimmed.is_empty() || trimmed == TOMBSTONE
    }
}

///
/// PayloadEncoder
///
/// Flattens a record into a `Payload`. Pure: reference fields record only
/// the referenced primary keys, so referenced records are expected to be
/// persisted separately by the caller; nothing cascades from here.
///

#[derive(Debug, Default)]
pub struct PayloadEncoder {
    fields: Payload,
}

impl PayloadEncoder {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a scalar field verbatim.
    pub fn scalar(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field, value.into());
    }

    /// Record a single-valued reference as the referenced primary key.
    pub fn reference<E: Entity>(&mut self, field: &str, child: &E) {
        self.fields.insert(field, child.key());
    }

    /// Record a multi-valued reference as an ordered list of primary keys.
    pub fn reference_list<E: Entity>(&mut self, field: &str, children: &[E]) {
        let keys = children.iter().map(Entity::key).collect();
        self.fields.insert(field, Value::List(keys));
    }

    pub(crate) fn finish(self) -> Payload {
        self.fields
    }
}

///
/// PayloadDecoder
///
/// Rebuilds a record from its flat payload. Scalar accessors convert per
/// the declared kind; reference accessors resolve depth-first and
/// synchronously through the live database, recursively decoding each
/// referenced record. Acyclic reference graphs are a caller contract.
///

pub struct PayloadDecoder<'a, S: TableStore> {
    entity: &'static str,
    payload: &'a Payload,
    db: &'a Db<S>,
}

impl<'a, S: TableStore> PayloadDecoder<'a, S> {
    pub(crate) const fn new(entity: &'static str, payload: &'a Payload, db: &'a Db<S>) -> Self {
        Self {
            entity,
            payload,
            db,
        }
    }

    pub fn int(&self, field: &str) -> Result<i64, InternalError> {
        match self.require(field)? {
            Value::Int(n) => Ok(*n),
            _ => Err(self.kind_mismatch(field)),
        }
    }

    pub fn float(&self, field: &str) -> Result<f64, InternalError> {
        match self.require(field)? {
            Value::Float(n) => Ok(*n),
            // Integral floats round-trip through JSON as integers.
            Value::Int(n) => Ok(*n as f64),
            _ => Err(self.kind_mismatch(field)),
        }
    }

    pub fn text(&self, field: &str) -> Result<String, InternalError> {
        match self.require(field)? {
            Value::Text(s) => Ok(s.clone()),
            _ => Err(self.kind_mismatch(field)),
        }
    }

    pub fn bool(&self, field: &str) -> Result<bool, InternalError> {
        match self.require(field)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.kind_mismatch(field)),
        }
    }

    /// Resolve a single-valued reference into the full referenced record.
    pub fn reference<E: Entity>(&self, field: &str) -> Result<E, InternalError> {
        let key = self.require(field)?.clone();

        self.db.find::<E>(key.clone())?.ok_or_else(|| {
            InternalError::codec_corruption(format!(
                "{}.{field}: dangling reference to {} '{}'",
                self.entity,
                E::NAME,
                key.canonical()
            ))
        })
    }

    /// Resolve a multi-valued reference, one lookup per element, in order.
    pub fn reference_list<E: Entity>(&self, field: &str) -> Result<Vec<E>, InternalError> {
        let Value::List(keys) = self.require(field)? else {
            return Err(self.kind_mismatch(field));
        };

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let record = self.db.find::<E>(key.clone())?.ok_or_else(|| {
                InternalError::codec_corruption(format!(
                    "{}.{field}: dangling reference to {} '{}'",
                    self.entity,
                    E::NAME,
                    key.canonical()
                ))
            })?;
            records.push(record);
        }

        Ok(records)
    }

    fn require(&self, field: &str) -> Result<&Value, InternalError> {
        self.payload.get(field).ok_or_else(|| {
            InternalError::codec_corruption(format!(
                "{}.{field}: field absent from payload",
                self.entity
            ))
        })
    }

    fn kind_mismatch(&self, field: &str) -> InternalError {
        InternalError::unsupported_field_type(ErrorOrigin::Codec, self.entity, field)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_tombstone_cells_are_empty_payloads() {
        assert!(Payload::is_empty_text(""));
        assert!(Payload::is_empty_text("  "));
        assert!(Payload::is_empty_text("-"));
        assert!(!Payload::is_empty_text("{}"));
    }

    #[test]
    fn payload_round_trips_through_json_text() {
        let mut payload = Payload::default();
        payload.insert("id", Value::Int(3));
        payload.insert("status", Value::Text("open".into()));
        payload.insert(
            "items",
            Value::List(vec![Value::Text("a".into()), Value::Text("b".into())]),
        );

        let text = payload.to_text().expect("serialize");
        let back = Payload::from_text(&text).expect("deserialize");

        assert_eq!(back, payload);
    }

    #[test]
    fn encoder_flattens_scalars_in_declaration_order() {
        let mut enc = PayloadEncoder::new();
        enc.scalar("id", 7i64);
        enc.scalar("active", true);
        let payload = enc.finish();

        assert_eq!(payload.get("id"), Some(&Value::Int(7)));
        assert_eq!(payload.get("active"), Some(&Value::Bool(true)));
    }
}
