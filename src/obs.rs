use serde::Serialize;

///
/// EventOps
/// Ephemeral, in-memory counters for engine operations. Reset on demand;
/// never persisted.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventOps {
    // Mutation entrypoints
    pub insert_calls: u64,
    pub duplicate_inserts: u64,
    pub update_calls: u64,
    pub delete_calls: u64,

    // Read surface
    pub rows_loaded: u64,
    pub rows_scanned: u64,

    // Query planning
    pub plan_index: u64,
    pub plan_full_scan: u64,

    // Index maintenance
    pub index_rebuilds: u64,
}
