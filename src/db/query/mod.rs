mod node;

use crate::{
    db::{Db, encode_record, index},
    error::InternalError,
    model::entity::EntityModel,
    store::TableStore,
    traits::Entity,
};
use node::{QueryNode, QueryOp, eval_chain};
use std::{collections::BTreeSet, marker::PhantomData};

///
/// Select
///
/// Fluent query surface over one collection: a left-to-right list of
/// equality predicates chained with AND/OR. Construction is purely
/// declarative; expressions are parsed and evaluated in `run`, which
/// prefers index bucket lookups and falls back to a full scan.
///
/// `filter` plays the role of the leading WHERE clause (`where` is a
/// reserved word).
///

pub struct Select<'a, E: Entity, S: TableStore> {
    db: &'a Db<S>,
    clauses: Vec<(QueryOp, String)>,
    _marker: PhantomData<E>,
}

impl<'a, E: Entity, S: TableStore> Select<'a, E, S> {
    pub(crate) const fn new(db: &'a Db<S>) -> Self {
        Self {
            db,
            clauses: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Leading search condition, e.g. `"status = 'open'"`.
    #[must_use]
    pub fn filter(mut self, expression: &str) -> Self {
        self.clauses.push((QueryOp::Root, expression.to_string()));
        self
    }

    /// Chain a condition with AND.
    #[must_use]
    pub fn and(mut self, expression: &str) -> Self {
        self.clauses.push((QueryOp::And, expression.to_string()));
        self
    }

    /// Chain a condition with OR.
    #[must_use]
    pub fn or(mut self, expression: &str) -> Self {
        self.clauses.push((QueryOp::Or, expression.to_string()));
        self
    }

    /// Execute the query.
    pub fn run(self) -> Result<Vec<E>, InternalError> {
        let model = self.db.model::<E>()?;
        let nodes = self
            .clauses
            .iter()
            .map(|(op, expr)| QueryNode::parse(expr, *op))
            .collect::<Result<Vec<_>, _>>()?;

        // No predicates: everything in the collection.
        if nodes.is_empty() {
            self.db.note_plan_full_scan();
            return self.db.scan::<E>()?.collect();
        }

        if nodes.len() == 1 {
            return self.single(&model, &nodes[0]);
        }

        let mut result = self.pairwise(&model, &nodes[0], &nodes[1])?;

        // Fold remaining nodes left-to-right: OR branches are evaluated
        // independently and unioned in; AND branches filter the running
        // result directly, with no new scan of the collection.
        for next in &nodes[2..] {
            match next.op {
                QueryOp::Or => {
                    let extra = self.single(&model, next)?;
                    union_by_key(&mut result, extra);
                }
                QueryOp::And | QueryOp::Root => {
                    result.retain(|record| next.matches(&encode_record(record)));
                }
            }
        }

        Ok(result)
    }

    /// Evaluate one predicate on its own: bucket lookup when indexed, full
    /// scan otherwise. An attribute absent from the schema yields an empty
    /// result, not an error.
    fn single(&self, model: &EntityModel, node: &QueryNode) -> Result<Vec<E>, InternalError> {
        if model.field(&node.attribute).is_none() {
            return Ok(Vec::new());
        }

        if index::is_indexed(self.db.store(), E::NAME, &node.attribute) {
            self.db.note_plan_index();
            let rows = index::lookup(
                self.db.store(),
                E::NAME,
                &node.attribute,
                &node.expected.canonical(),
            )?
            .unwrap_or_default();

            return self.hydrate(&rows);
        }

        self.db.note_plan_full_scan();
        let mut out = Vec::new();
        for (row, payload) in self.db.raw_payloads(E::NAME)? {
            if node.matches(&payload)
                && let Some(record) = self.db.find_by_row::<E>(row)?
            {
                out.push(record);
            }
        }

        Ok(out)
    }

    /// Combine the first two predicates: row-set intersection/union when
    /// both are indexed, candidate probing when one is, a single
    /// boolean-chain scan when neither is.
    fn pairwise(
        &self,
        model: &EntityModel,
        first: &QueryNode,
        second: &QueryNode,
    ) -> Result<Vec<E>, InternalError> {
        let store = self.db.store();
        let first_indexed = model.field(&first.attribute).is_some()
            && index::is_indexed(store, E::NAME, &first.attribute);
        let second_indexed = model.field(&second.attribute).is_some()
            && index::is_indexed(store, E::NAME, &second.attribute);

        if first_indexed && second_indexed {
            self.db.note_plan_index();
            let first_rows = index::lookup(
                store,
                E::NAME,
                &first.attribute,
                &first.expected.canonical(),
            )?
            .unwrap_or_default();
            let second_rows = index::lookup(
                store,
                E::NAME,
                &second.attribute,
                &second.expected.canonical(),
            )?
            .unwrap_or_default();

            let combined = match second.op {
                QueryOp::And => intersect_rows(&first_rows, &second_rows),
                QueryOp::Or | QueryOp::Root => union_rows(&first_rows, &second_rows),
            };

            return self.hydrate(&combined);
        }

        if first_indexed || second_indexed {
            let (indexed, other) = if first_indexed {
                (first, second)
            } else {
                (second, first)
            };

            return match second.op {
                // Candidate rows come from the index; the other predicate
                // is tested directly against each row's raw payload,
                // avoiding a second full scan.
                QueryOp::And | QueryOp::Root => {
                    self.db.note_plan_index();
                    let rows = index::lookup(
                        store,
                        E::NAME,
                        &indexed.attribute,
                        &indexed.expected.canonical(),
                    )?
                    .unwrap_or_default();

                    let mut out = Vec::new();
                    for row in rows {
                        if let Some(payload) = self.db.payload_at(E::NAME, row)?
                            && other.matches(&payload)
                            && let Some(record) = self.db.find_by_row::<E>(row)?
                        {
                            out.push(record);
                        }
                    }
                    Ok(out)
                }
                // A disjunction needs both sides in full; the unindexed
                // side is evaluated standalone and unioned in.
                QueryOp::Or => {
                    let rows = index::lookup(
                        store,
                        E::NAME,
                        &indexed.attribute,
                        &indexed.expected.canonical(),
                    )?
                    .unwrap_or_default();
                    let mut out = self.hydrate(&rows)?;
                    union_by_key(&mut out, self.single(model, other)?);
                    Ok(out)
                }
            };
        }

        // Neither indexed: one full scan evaluating the two-node chain.
        self.db.note_plan_full_scan();
        let chain = [first.clone(), second.clone()];
        let mut out = Vec::new();
        for (row, payload) in self.db.raw_payloads(E::NAME)? {
            if eval_chain(&chain, &payload)
                && let Some(record) = self.db.find_by_row::<E>(row)?
            {
                out.push(record);
            }
        }

        Ok(out)
    }

    fn hydrate(&self, rows: &[u32]) -> Result<Vec<E>, InternalError> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(record) = self.db.find_by_row::<E>(*row)? {
                out.push(record);
            }
        }

        Ok(out)
    }
}

fn intersect_rows(first: &[u32], second: &[u32]) -> Vec<u32> {
    first
        .iter()
        .filter(|row| second.contains(row))
        .copied()
        .collect()
}

fn union_rows(first: &[u32], second: &[u32]) -> Vec<u32> {
    let mut out = first.to_vec();
    for row in second {
        if !out.contains(row) {
            out.push(*row);
        }
    }

    out
}

/// Union decoded records, deduplicating by primary key.
fn union_by_key<E: Entity>(base: &mut Vec<E>, extra: Vec<E>) {
    let mut seen: BTreeSet<String> = base.iter().map(|r| r.key().canonical()).collect();
    for record in extra {
        if seen.insert(record.key().canonical()) {
            base.push(record);
        }
    }
}

///
/// TESTS
///
