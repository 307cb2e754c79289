pub mod codec;
pub mod index;
pub(crate) mod ledger;
pub mod query;


use crate::{
    db::codec::{Payload, PayloadDecoder, PayloadEncoder},
    error::{ErrorOrigin, InternalError},
    model::entity::EntityModel,
    obs::EventOps,
    store::TableStore,
    traits::Entity,
    value::Value,
};
use query::Select;
use std::{cell::RefCell, collections::BTreeSet, marker::PhantomData};

/// Column holding the serialized payload in every data collection.
const DATA_COLUMN: u32 = 1;

///
/// Db
///
/// The collection manager: owns the backing store handle (threaded
/// explicitly, no ambient singleton), collection lifecycle, the row
/// ledger, and index maintenance across insert/update/delete.
///
/// Single-threaded and synchronous; every operation runs to completion
/// with exclusive access to the store, and backing-store failures
/// propagate immediately as fatal errors.
///

pub struct Db<S: TableStore> {
    store: S,
    /// Entity names whose field declarations already passed validation.
    validated: RefCell<BTreeSet<&'static str>>,
    metrics: RefCell<EventOps>,
}

impl<S: TableStore> Db<S> {
    /// Open a database over the given store, seeding the system collection
    /// if absent.
    pub fn open(mut store: S) -> Result<Self, InternalError> {
        ledger::init(&mut store)?;

        Ok(Self {
            store,
            validated: RefCell::new(BTreeSet::new()),
            metrics: RefCell::new(EventOps::default()),
        })
    }

    /// Tear down the handle and give the backing store back.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Snapshot of the operation counters.
    #[must_use]
    pub fn metrics(&self) -> EventOps {
        self.metrics.borrow().clone()
    }

    pub fn reset_metrics(&self) {
        *self.metrics.borrow_mut() = EventOps::default();
    }

    /// Validated model for an entity type; validation runs once per type
    /// per process, then the cached outcome short-circuits.
    pub(crate) fn model<E: Entity>(&self) -> Result<EntityModel, InternalError> {
        if self.validated.borrow().contains(E::NAME) {
            return Ok(EntityModel::assume_valid::<E>());
        }

        let model = EntityModel::of::<E>()?;
        self.validated.borrow_mut().insert(E::NAME);

        Ok(model)
    }

    /// Create the collection if absent, with one empty index per
    /// primary-key/indexed field — indexes always exist once the
    /// collection does, so "is indexed" is a presence check from then on.
    pub fn ensure_collection<E: Entity>(&mut self) -> Result<(), InternalError> {
        let model = self.model::<E>()?;
        if self.store.has_table(E::NAME) {
            return Ok(());
        }

        self.store.create_table(E::NAME)?;
        ledger::sync(&mut self.store, E::NAME, 0)?;
        for field in model.indexed_fields() {
            self.build_index(E::NAME, field.name)?;
        }

        Ok(())
    }

    /// Insert-if-absent: primary keys are unique within a collection, so a
    /// record whose key is already present is a no-op returning `false`.
    pub fn insert<E: Entity>(&mut self, record: &E) -> Result<bool, InternalError> {
        self.ensure_collection::<E>()?;
        let model = self.model::<E>()?;
        let payload = encode_record(record);
        let pk = record.key().canonical();

        let existing = index::lookup(&self.store, E::NAME, model.primary_key.name, &pk)?;
        if existing.is_some_and(|rows| !rows.is_empty()) {
            self.metrics.borrow_mut().duplicate_inserts += 1;
            return Ok(false);
        }

        let row = self.store.row_count(E::NAME)? + 1;
        self.store
            .write_cell(E::NAME, row, DATA_COLUMN, &payload.to_text()?)?;
        ledger::sync(&mut self.store, E::NAME, row)?;

        for field in model.indexed_fields() {
            let Some(value) = payload.get(field.name) else {
                continue;
            };
            let mut map = self.loaded_index(E::NAME, field.name)?;
            map.append(&value.canonical(), row);
            index::rewrite(&mut self.store, E::NAME, field.name, &map)?;
        }

        self.metrics.borrow_mut().insert_calls += 1;
        Ok(true)
    }

    /// Overwrite the record's payload in place (row position unchanged)
    /// and migrate every index whose value changed from the old bucket to
    /// the new one. `false` when the key is absent.
    pub fn update<E: Entity>(&mut self, record: &E) -> Result<bool, InternalError> {
        let model = self.model::<E>()?;
        let pk = record.key().canonical();
        let Some(row) = self.row_of(E::NAME, model.primary_key.name, &pk)? else {
            return Ok(false);
        };

        let old = self.payload_at(E::NAME, row)?.ok_or_else(|| {
            InternalError::codec_corruption(format!(
                "{}: indexed row {row} holds no payload",
                E::NAME
            ))
        })?;
        let new = encode_record(record);
        self.store
            .write_cell(E::NAME, row, DATA_COLUMN, &new.to_text()?)?;

        for field in model.indexed_fields() {
            let old_key = old.get(field.name).map(Value::canonical);
            let new_key = new.get(field.name).map(Value::canonical);
            if old_key == new_key {
                continue;
            }

            let mut map = self.loaded_index(E::NAME, field.name)?;
            if let Some(key) = old_key {
                map.remove(&key, row);
            }
            if let Some(key) = new_key {
                map.append(&key, row);
            }
            index::rewrite(&mut self.store, E::NAME, field.name, &map)?;
        }

        self.metrics.borrow_mut().update_calls += 1;
        Ok(true)
    }

    /// Remove a record and renumber.
    ///
    /// Two-phase: phase 1 rewrites every index (the deleted row leaves its
    /// buckets, every entry past it shifts down by one); phase 2 removes
    /// the physical row and re-syncs the ledger from the authoritative row
    /// count. A failure between phases loses an index rewrite, not data.
    /// `false` when the key is absent.
    pub fn delete<E: Entity>(&mut self, record: &E) -> Result<bool, InternalError> {
        let model = self.model::<E>()?;
        let pk = record.key().canonical();
        let Some(row) = self.row_of(E::NAME, model.primary_key.name, &pk)? else {
            return Ok(false);
        };

        for field in model.indexed_fields() {
            let mut map = self.loaded_index(E::NAME, field.name)?;
            map.shift_after_delete(row);
            index::rewrite(&mut self.store, E::NAME, field.name, &map)?;
        }

        self.store.delete_row(E::NAME, row)?;
        let rows = self.store.row_count(E::NAME)?;
        ledger::sync(&mut self.store, E::NAME, rows)?;

        self.metrics.borrow_mut().delete_calls += 1;
        Ok(true)
    }

    /// Look up one record by primary key. `None` when the collection, the
    /// key, or the payload is absent — never an error.
    pub fn find<E: Entity>(&self, key: impl Into<Value>) -> Result<Option<E>, InternalError> {
        let model = self.model::<E>()?;
        if !self.store.has_table(E::NAME) {
            return Ok(None);
        }

        let pk = key.into().canonical();
        let Some(row) = self.row_of(E::NAME, model.primary_key.name, &pk)? else {
            return Ok(None);
        };

        self.find_by_row::<E>(row)
    }

    /// Decode the record at a 1-based row position. `None` for an empty or
    /// tombstoned cell.
    pub fn find_by_row<E: Entity>(&self, row: u32) -> Result<Option<E>, InternalError> {
        let Some(payload) = self.payload_at(E::NAME, row)? else {
            return Ok(None);
        };

        let dec = PayloadDecoder::new(E::NAME, &payload, self);
        let record = E::decode(&dec)?;
        self.metrics.borrow_mut().rows_loaded += 1;

        Ok(Some(record))
    }

    /// Lazy, restartable scan over every record in the collection. Each
    /// call re-reads the backing store from row one; this is not a live
    /// cursor.
    pub fn scan<E: Entity>(&self) -> Result<Scan<'_, E, S>, InternalError> {
        self.model::<E>()?;
        let total = if self.store.has_table(E::NAME) {
            self.store.row_count(E::NAME)?
        } else {
            0
        };

        Ok(Scan {
            db: self,
            row: 0,
            total,
            _marker: PhantomData,
        })
    }

    /// Build a secondary index for a declared field, scanning the whole
    /// collection once. A no-op if the index already exists.
    pub fn create_index<E: Entity>(&mut self, field: &str) -> Result<(), InternalError> {
        let model = self.model::<E>()?;
        let field_model = model
            .field(field)
            .ok_or_else(|| InternalError::no_such_field(E::NAME, field))?;
        if !field_model.kind.is_scalar() {
            return Err(InternalError::unsupported_field_type(
                ErrorOrigin::Index,
                E::NAME,
                field,
            ));
        }
        if !self.store.has_table(E::NAME) {
            return Err(InternalError::no_collection(E::NAME));
        }
        if index::is_indexed(&self.store, E::NAME, field) {
            return Ok(());
        }

        self.build_index(E::NAME, field_model.name)
    }

    /// Entry point for the fluent query surface.
    #[must_use]
    pub fn select<E: Entity>(&self) -> Select<'_, E, S> {
        Select::new(self)
    }

    /// Hand out the next record id from the system seed.
    pub fn allocate_id(&mut self) -> Result<u64, InternalError> {
        ledger::allocate_id(&mut self.store)
    }

    // --- internals ---

    fn build_index(&mut self, entity: &'static str, field: &str) -> Result<(), InternalError> {
        let table = index::table_name(entity, field);
        self.store.create_table(&table)?;

        let mut map = index::BucketMap::default();
        for (row, payload) in self.raw_payloads(entity)? {
            if let Some(value) = payload.get(field) {
                map.append(&value.canonical(), row);
            }
        }
        index::rewrite(&mut self.store, entity, field, &map)?;
        self.metrics.borrow_mut().index_rebuilds += 1;

        Ok(())
    }

    fn loaded_index(
        &self,
        entity: &str,
        field: &str,
    ) -> Result<index::BucketMap, InternalError> {
        index::load(&self.store, entity, field)?.ok_or_else(|| {
            InternalError::index_invariant(format!("missing index for {entity}.{field}"))
        })
    }

    /// First row holding the given primary key, via the primary-key index.
    fn row_of(
        &self,
        entity: &str,
        pk_field: &str,
        key: &str,
    ) -> Result<Option<u32>, InternalError> {
        if !self.store.has_table(entity) {
            return Ok(None);
        }

        let row = index::lookup(&self.store, entity, pk_field, key)?
            .and_then(|rows| rows.first().copied());

        Ok(row)
    }

    pub(crate) fn payload_at(
        &self,
        entity: &str,
        row: u32,
    ) -> Result<Option<Payload>, InternalError> {
        if row == 0 || !self.store.has_table(entity) {
            return Ok(None);
        }
        if row > self.store.row_count(entity)? {
            return Ok(None);
        }

        let Some(cell) = self.store.read_cell(entity, row, DATA_COLUMN)? else {
            return Ok(None);
        };
        if Payload::is_empty_text(&cell) {
            return Ok(None);
        }

        let payload = Payload::from_text(&cell)
            .map_err(|err| InternalError::codec_corruption(err.to_string()))?;

        Ok(Some(payload))
    }

    /// All populated rows of a collection as raw payloads, one pass.
    pub(crate) fn raw_payloads(
        &self,
        entity: &str,
    ) -> Result<Vec<(u32, Payload)>, InternalError> {
        if !self.store.has_table(entity) {
            return Ok(Vec::new());
        }

        let total = self.store.row_count(entity)?;
        let mut out = Vec::new();
        for row in 1..=total {
            if let Some(payload) = self.payload_at(entity, row)? {
                out.push((row, payload));
            }
        }
        self.metrics.borrow_mut().rows_scanned += u64::from(total);

        Ok(out)
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn note_plan_index(&self) {
        self.metrics.borrow_mut().plan_index += 1;
    }

    pub(crate) fn note_plan_full_scan(&self) {
        self.metrics.borrow_mut().plan_full_scan += 1;
    }
}

/// Flatten a record into its payload. Pure; referenced records are not
/// touched.
pub(crate) fn encode_record<E: Entity>(record: &E) -> Payload {
    let mut enc = PayloadEncoder::new();
    record.encode(&mut enc);
    enc.finish()
}

///
/// Scan
///
/// Finite iterator over one collection's records, skipping empty cells.
///

pub struct Scan<'a, E: Entity, S: TableStore> {
    db: &'a Db<S>,
    row: u32,
    total: u32,
    _marker: PhantomData<E>,
}

impl<E: Entity, S: TableStore> Iterator for Scan<'_, E, S> {
    type Item = Result<E, InternalError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.row < self.total {
            self.row += 1;
            match self.db.find_by_row::<E>(self.row) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
        }

        None
    }
}
