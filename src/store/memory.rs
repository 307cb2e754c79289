use crate::store::{StoreError, TableStore};
use std::collections::BTreeMap;

///
/// MemoryStore
///
/// In-memory `TableStore`: a map of named tables, each an ordered list of
/// sparse rows. Ships with the crate as the default embedded medium and as
/// the test double for external adapters.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Default)]
struct Table {
    /// Row index is position - 1; cells are sparse by column.
    rows: Vec<BTreeMap<u32, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all tables, in lexical order. Diagnostics only.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    fn table(&self, name: &str) -> Result<&Table, StoreError> {
        self.tables.get(name).ok_or_else(|| StoreError::NoTable {
            name: name.to_string(),
        })
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, StoreError> {
        self.tables.get_mut(name).ok_or_else(|| StoreError::NoTable {
            name: name.to_string(),
        })
    }
}

impl TableStore for MemoryStore {
    fn create_table(&mut self, name: &str) -> Result<(), StoreError> {
        self.tables.entry(name.to_string()).or_default();
        Ok(())
    }

    fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    fn read_cell(&self, table: &str, row: u32, col: u32) -> Result<Option<String>, StoreError> {
        if row == 0 || col == 0 {
            return Err(StoreError::ZeroPosition);
        }

        let table = self.table(table)?;
        let value = table
            .rows
            .get(row as usize - 1)
            .and_then(|cells| cells.get(&col).cloned());

        Ok(value)
    }

    fn write_cell(
        &mut self,
        table: &str,
        row: u32,
        col: u32,
        value: &str,
    ) -> Result<(), StoreError> {
        if row == 0 || col == 0 {
            return Err(StoreError::ZeroPosition);
        }

        let table = self.table_mut(table)?;
        if table.rows.len() < row as usize {
            table.rows.resize_with(row as usize, BTreeMap::new);
        }
        table.rows[row as usize - 1].insert(col, value.to_string());

        Ok(())
    }

    fn row_count(&self, table: &str) -> Result<u32, StoreError> {
        let table = self.table(table)?;

        u32::try_from(table.rows.len()).map_err(|_| StoreError::Backend("row overflow".into()))
    }

    fn delete_row(&mut self, table: &str, row: u32) -> Result<(), StoreError> {
        if row == 0 {
            return Err(StoreError::ZeroPosition);
        }

        let name = table.to_string();
        let table = self.table_mut(&name)?;
        if row as usize > table.rows.len() {
            return Err(StoreError::RowOutOfRange { name, row });
        }
        table.rows.remove(row as usize - 1);

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_is_idempotent() {
        let mut store = MemoryStore::new();
        store.create_table("t").expect("create");
        store.write_cell("t", 1, 1, "x").expect("write");
        store.create_table("t").expect("re-create");

        assert_eq!(store.read_cell("t", 1, 1).expect("read"), Some("x".into()));
    }

    #[test]
    fn writing_a_high_row_grows_the_table() {
        let mut store = MemoryStore::new();
        store.create_table("t").expect("create");
        store.write_cell("t", 5, 2, "deep").expect("write");

        assert_eq!(store.row_count("t").expect("count"), 5);
        assert_eq!(store.read_cell("t", 3, 1).expect("read"), None);
        assert_eq!(
            store.read_cell("t", 5, 2).expect("read"),
            Some("deep".into())
        );
    }

    #[test]
    fn delete_row_shifts_subsequent_rows_up() {
        let mut store = MemoryStore::new();
        store.create_table("t").expect("create");
        for (row, value) in [(1, "a"), (2, "b"), (3, "c")] {
            store.write_cell("t", row, 1, value).expect("write");
        }

        store.delete_row("t", 2).expect("delete");

        assert_eq!(store.row_count("t").expect("count"), 2);
        assert_eq!(store.read_cell("t", 1, 1).expect("read"), Some("a".into()));
        assert_eq!(store.read_cell("t", 2, 1).expect("read"), Some("c".into()));
    }

    #[test]
    fn missing_table_is_an_error() {
        let store = MemoryStore::new();
        let err = store.read_cell("nope", 1, 1).unwrap_err();
        assert!(matches!(err, StoreError::NoTable { .. }));
    }

    #[test]
    fn zero_positions_are_rejected() {
        let mut store = MemoryStore::new();
        store.create_table("t").expect("create");
        assert!(matches!(
            store.write_cell("t", 0, 1, "x").unwrap_err(),
            StoreError::ZeroPosition
        ));
        assert!(matches!(
            store.read_cell("t", 1, 0).unwrap_err(),
            StoreError::ZeroPosition
        ));
    }

    #[test]
    fn delete_out_of_range_is_an_error() {
        let mut store = MemoryStore::new();
        store.create_table("t").expect("create");
        let err = store.delete_row("t", 1).unwrap_err();
        assert!(matches!(err, StoreError::RowOutOfRange { .. }));
    }
}
