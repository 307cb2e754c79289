use crate::{
    error::InternalError,
    serialize,
    store::TableStore,
};
use std::collections::BTreeMap;

///
/// Row ledger
///
/// The `__sys` collection: row 1 holds the id seed, row 2 a JSON map of
/// collection name to row cursor. The physical row count of each data
/// collection is authoritative; the cursor map is write-through
/// bookkeeping re-derived on every mutation, so it can never drift from
/// the data the way an independently decremented counter can.
///

pub(crate) const SYS_TABLE: &str = "__sys";

const ID_SEED_ROW: u32 = 1;
const CURSOR_ROW: u32 = 2;
const SYS_COLUMN: u32 = 1;

/// Create and seed the system collection if absent.
pub(crate) fn init<S: TableStore>(store: &mut S) -> Result<(), InternalError> {
    if store.has_table(SYS_TABLE) {
        return Ok(());
    }

    store.create_table(SYS_TABLE)?;
    store.write_cell(SYS_TABLE, ID_SEED_ROW, SYS_COLUMN, "1")?;
    store.write_cell(SYS_TABLE, CURSOR_ROW, SYS_COLUMN, "{}")?;

    Ok(())
}

/// Read the cursor map.
pub(crate) fn cursors<S: TableStore>(
    store: &S,
) -> Result<BTreeMap<String, u32>, InternalError> {
    let raw = store
        .read_cell(SYS_TABLE, CURSOR_ROW, SYS_COLUMN)?
        .ok_or_else(|| InternalError::ledger_corruption("row cursor map is missing"))?;

    let map = serialize::deserialize(&raw)
        .map_err(|err| InternalError::ledger_corruption(err.to_string()))?;

    Ok(map)
}

/// Overwrite one collection's cursor with the authoritative row count.
pub(crate) fn sync<S: TableStore>(
    store: &mut S,
    collection: &str,
    rows: u32,
) -> Result<(), InternalError> {
    let mut map = cursors(store)?;
    map.insert(collection.to_string(), rows);

    let text = serialize::serialize(&map)
        .map_err(|err| InternalError::ledger_corruption(err.to_string()))?;
    store.write_cell(SYS_TABLE, CURSOR_ROW, SYS_COLUMN, &text)?;

    Ok(())
}

/// Hand out the next id from the seed cell and advance it.
pub(crate) fn allocate_id<S: TableStore>(store: &mut S) -> Result<u64, InternalError> {
    let raw = store
        .read_cell(SYS_TABLE, ID_SEED_ROW, SYS_COLUMN)?
        .ok_or_else(|| InternalError::ledger_corruption("id seed is missing"))?;

    let id: u64 = raw
        .trim()
        .parse()
        .map_err(|_| InternalError::ledger_corruption(format!("malformed id seed: {raw}")))?;

    store.write_cell(SYS_TABLE, ID_SEED_ROW, SYS_COLUMN, &(id + 1).to_string())?;

    Ok(id)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn init_seeds_sys_table_once() {
        let mut store = MemoryStore::new();
        init(&mut store).expect("init");
        sync(&mut store, "order", 3).expect("sync");

        // Re-init must not clobber existing state.
        init(&mut store).expect("re-init");

        let map = cursors(&store).expect("cursors");
        assert_eq!(map.get("order"), Some(&3));
    }

    #[test]
    fn sync_overwrites_rather_than_accumulates() {
        let mut store = MemoryStore::new();
        init(&mut store).expect("init");

        sync(&mut store, "order", 5).expect("sync");
        sync(&mut store, "order", 2).expect("sync");

        assert_eq!(cursors(&store).expect("cursors").get("order"), Some(&2));
    }

    #[test]
    fn allocated_ids_are_sequential() {
        let mut store = MemoryStore::new();
        init(&mut store).expect("init");

        assert_eq!(allocate_id(&mut store).expect("id"), 1);
        assert_eq!(allocate_id(&mut store).expect("id"), 2);
        assert_eq!(allocate_id(&mut store).expect("id"), 3);
    }

    #[test]
    fn malformed_seed_is_ledger_corruption() {
        let mut store = MemoryStore::new();
        init(&mut store).expect("init");
        store
            .write_cell(SYS_TABLE, 1, 1, "not-a-number")
            .expect("write");

        let err = allocate_id(&mut store).unwrap_err();
        assert_eq!(err.origin, crate::error::ErrorOrigin::Ledger);
    }
}
