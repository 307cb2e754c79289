//! Embedded, schema-driven document store over a pluggable row/table
//! backing medium: typed records flatten to portable payloads, append to
//! per-type collections, and stay searchable through hash-named bucket
//! indexes and a chained AND/OR equality query language.
#![warn(unreachable_pub)]

pub mod db;
pub mod error;
pub mod hash;
pub mod model;
pub mod obs;
pub mod serialize;
pub mod store;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Domain vocabulary only: the database handle, the record trait and its
/// declaration types, the value model, and the store seam.
///

pub mod prelude {
    pub use crate::{
        db::{
            Db,
            codec::{PayloadDecoder, PayloadEncoder},
            query::Select,
        },
        error::InternalError,
        model::field::{FieldKind, FieldModel, FieldRole},
        store::{MemoryStore, TableStore},
        traits::Entity,
        value::Value,
    };
}
