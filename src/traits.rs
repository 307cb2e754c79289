use crate::{
    db::codec::{PayloadDecoder, PayloadEncoder},
    error::InternalError,
    store::TableStore,
    value::Value,
};

///
/// Entity
///
/// Explicit schema registration surface for record types.
///
/// Each persistable type declares its collection name and static field
/// model, and drives its own payload encoding and decoding through the
/// codec. Decoding is handed a decoder bound to the live database so that
/// reference fields can resolve re-entrantly.
///
/// Reference graphs must be acyclic; resolution is depth-first and a cycle
/// recurses until a lookup miss or stack exhaustion.
///

pub trait Entity: Clone {
    /// Stable collection name (also the backing-collection name).
    const NAME: &'static str;

    /// Static field declaration; validated on first collection use.
    const FIELDS: &'static [FieldModel];

    /// Primary-key value of this record.
    fn key(&self) -> Value;

    /// Write every declared field into the encoder.
    fn encode(&self, enc: &mut PayloadEncoder);

    /// Rebuild the record from a decoded payload, resolving references
    /// through the decoder.
    fn decode<S: TableStore>(dec: &PayloadDecoder<'_, S>) -> Result<Self, InternalError>;
}

// Re-exported here so trait impls only need one import path.
pub use crate::model::field::{FieldKind, FieldModel, FieldRole};
