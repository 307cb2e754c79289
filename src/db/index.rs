use crate::{
    error::InternalError,
    hash::truncated_hash,
    serialize,
    store::TableStore,
};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const IDX_ROW: u32 = 1;
const IDX_COLUMN: u32 = 1;

///
/// BucketMap
///
/// One secondary index: stringified field value to the ordered list of
/// 1-based row positions currently holding that value. Multiple rows may
/// share a key; uniqueness of primary keys is enforced at insert time, not
/// here. Persisted as a single serialized blob, rewritten whole on every
/// mutation — collections are expected to stay small.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, PartialEq, Serialize, Deserialize)]
pub struct BucketMap(BTreeMap<String, Vec<u32>>);

impl BucketMap {
    /// Append a row to a value's bucket.
    pub(crate) fn append(&mut self, key: &str, row: u32) {
        let bucket = self.0.entry(key.to_string()).or_default();
        if !bucket.contains(&row) {
            bucket.push(row);
        }
    }

    /// Remove a row from one value's bucket, dropping the bucket when it
    /// empties.
    pub(crate) fn remove(&mut self, key: &str, row: u32) {
        if let Some(bucket) = self.0.get_mut(key) {
            bucket.retain(|r| *r != row);
            if bucket.is_empty() {
                self.0.remove(key);
            }
        }
    }

    /// Post-delete renumber: drop the deleted row from every bucket and
    /// rewrite every entry past it to the decremented position.
    pub(crate) fn shift_after_delete(&mut self, deleted: u32) {
        for bucket in self.0.values_mut() {
            bucket.retain(|r| *r != deleted);
            for r in bucket.iter_mut() {
                if *r > deleted {
                    *r -= 1;
                }
            }
        }
        self.0.retain(|_, bucket| !bucket.is_empty());
    }

    /// Rows currently holding the given value, in insertion order.
    #[must_use]
    pub fn rows(&self, key: &str) -> Option<&[u32]> {
        self.0.get(key).map(Vec::as_slice)
    }
}

/// Backing-collection name for one (collection, field) index.
///
/// The truncated hash keeps the name deterministic and collision-free in
/// the common case while sharing the data collections' namespace.
#[must_use]
pub(crate) fn table_name(entity: &str, field: &str) -> String {
    format!("Idx_{}", truncated_hash(&format!("{entity}{field}")))
}

/// Presence check: indexes are created with their collection, so existence
/// of the backing collection is the "is indexed" answer.
pub(crate) fn is_indexed<S: TableStore>(store: &S, entity: &str, field: &str) -> bool {
    store.has_table(&table_name(entity, field))
}

/// Load the full bucket map for `(entity, field)`. `None` when the field
/// is not indexed at all; an indexed field with no entries yet loads as an
/// empty map.
pub(crate) fn load<S: TableStore>(
    store: &S,
    entity: &str,
    field: &str,
) -> Result<Option<BucketMap>, InternalError> {
    let table = table_name(entity, field);
    if !store.has_table(&table) {
        return Ok(None);
    }

    let map = match store.read_cell(&table, IDX_ROW, IDX_COLUMN)? {
        Some(raw) => serialize::deserialize(&raw)
            .map_err(|err| InternalError::index_corruption(err.to_string()))?,
        None => BucketMap::default(),
    };

    Ok(Some(map))
}

/// Persist the entire bucket map as one unit. The index collection must
/// already exist.
pub(crate) fn rewrite<S: TableStore>(
    store: &mut S,
    entity: &str,
    field: &str,
    map: &BucketMap,
) -> Result<(), InternalError> {
    let table = table_name(entity, field);
    let text = serialize::serialize(map)
        .map_err(|err| InternalError::index_corruption(err.to_string()))?;
    store.write_cell(&table, IDX_ROW, IDX_COLUMN, &text)?;

    Ok(())
}

/// Bucket lookup: the ordered rows holding `key`, or `None` when the field
/// is unindexed or the value has no bucket.
pub(crate) fn lookup<S: TableStore>(
    store: &S,
    entity: &str,
    field: &str,
    key: &str,
) -> Result<Option<Vec<u32>>, InternalError> {
    let Some(map) = load(store, entity, field)? else {
        return Ok(None);
    };

    Ok(map.rows(key).map(<[u32]>::to_vec))
}

///
/// TESTS
///
