//! Query engine
//!
//! A query runs in two phases:
//!
//! 1. **Candidate acquisition.** Only the first equality condition is
//!    consulted. If its field is indexed, the candidates are the ids of that
//!    index entry. With no conditions at all, every record of the table is a
//!    candidate. When the first condition names an unindexed field the
//!    candidate set follows [`UnindexedQueries`]: empty by default, or a full
//!    scan when the table opts in.
//! 2. **Pipeline.** Candidates are fetched one by one, then filtered on every
//!    condition, bounded on every schema timestamp field, sorted and
//!    truncated, in that order.
//!
//! Candidates are visited in id order, and the sort is stable, so equal sort
//! keys keep id order and repeated queries return identical results.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use recordkv_core::{key, KvBackend, Record, Result, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::definition::{TableDefinition, UnindexedQueries};
use crate::index::IndexManager;
use crate::table::Table;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

/// Sort key of a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field to sort on
    pub field: String,
    /// Ascending unless stated
    #[serde(default)]
    pub direction: SortDirection,
}

/// A complete query description
///
/// Conditions keep their insertion order; the first one decides how
/// candidates are acquired.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Field equalities, all of which must hold
    #[serde(default)]
    pub conditions: Vec<(String, Value)>,
    /// Exclusive lower bound on every schema timestamp field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<DateTime<Utc>>,
    /// Exclusive upper bound on every schema timestamp field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<DateTime<Utc>>,
    /// Maximum number of results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Result ordering; id order when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
}

impl QuerySpec {
    /// Add an equality condition, replacing any earlier condition on `field`
    ///
    /// A replaced condition keeps its original position. Timestamps in
    /// `value` are truncated to milliseconds to match stored records.
    pub fn push_condition(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let mut value = value.into();
        value.truncate_timestamps();
        match self.conditions.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.conditions.push((field, value)),
        }
    }

    /// The condition that drives candidate acquisition
    pub fn leading_condition(&self) -> Option<(&str, &Value)> {
        self.conditions.first().map(|(f, v)| (f.as_str(), v))
    }
}

/// How candidates will be acquired for a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum QueryPlan {
    /// Read the ids of one index entry
    #[allow(missing_docs)]
    IndexLookup { field: String, key: String },
    /// List every record of the table
    FullScan,
    /// Leading field is unindexed and the table does not scan
    #[allow(missing_docs)]
    Empty { field: String },
}

/// Decide how candidates are acquired for `spec`
pub fn plan(backend: &dyn KvBackend, def: &TableDefinition, spec: &QuerySpec) -> QueryPlan {
    match spec.leading_condition() {
        None => QueryPlan::FullScan,
        Some((field, value)) if def.is_indexed(field) => QueryPlan::IndexLookup {
            field: field.to_string(),
            key: IndexManager::new(backend, def).index_key(field, value),
        },
        Some((field, _)) => match def.options.unindexed_queries {
            UnindexedQueries::Empty => QueryPlan::Empty {
                field: field.to_string(),
            },
            UnindexedQueries::Scan => QueryPlan::FullScan,
        },
    }
}

/// Run `spec` against one table
pub fn execute(
    backend: &dyn KvBackend,
    def: &TableDefinition,
    spec: &QuerySpec,
) -> Result<Vec<Record>> {
    let plan = plan(backend, def, spec);
    debug!(target: "recordkv::query", table = %def.name, plan = ?plan, "Executing query");

    let mut records = fetch_candidates(backend, def, &plan)?;
    let candidates = records.len();

    records.retain(|r| matches_conditions(r, &spec.conditions));
    records.retain(|r| within_bounds(r, def, spec.after, spec.before));
    if let Some(order) = &spec.order_by {
        sort_records(&mut records, order);
    }
    if let Some(limit) = spec.limit {
        records.truncate(limit);
    }

    debug!(
        target: "recordkv::query",
        table = %def.name,
        candidates,
        returned = records.len(),
        "Query complete"
    );
    Ok(records)
}

fn fetch_candidates(
    backend: &dyn KvBackend,
    def: &TableDefinition,
    plan: &QueryPlan,
) -> Result<Vec<Record>> {
    match plan {
        QueryPlan::Empty { .. } => Ok(Vec::new()),
        QueryPlan::FullScan => backend
            .list_by_prefix(&key::record_prefix(&def.name))?
            .into_iter()
            .map(|(_, bytes)| codec::from_bytes(&bytes, &def.schema))
            .collect(),
        QueryPlan::IndexLookup { key, .. } => {
            let ids: Vec<String> = match backend.get(key)? {
                Some(bytes) => serde_json::from_slice(&bytes)?,
                None => Vec::new(),
            };
            let mut records = Vec::with_capacity(ids.len());
            for id in ids {
                match backend.get(&key::record_key(&def.name, &id))? {
                    Some(bytes) => records.push(codec::from_bytes(&bytes, &def.schema)?),
                    None => debug!(
                        target: "recordkv::query",
                        table = %def.name,
                        id = %id,
                        "Index points at missing record, skipping"
                    ),
                }
            }
            Ok(records)
        }
    }
}

/// Every condition holds; an absent field equals nothing
fn matches_conditions(record: &Record, conditions: &[(String, Value)]) -> bool {
    conditions
        .iter()
        .all(|(field, expected)| record.get(field) == Some(expected))
}

/// Every schema timestamp field lies strictly inside the bounds
fn within_bounds(
    record: &Record,
    def: &TableDefinition,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
) -> bool {
    if after.is_none() && before.is_none() {
        return true;
    }
    def.schema.timestamp_fields().all(|field| {
        let Some(t) = record.get(field).and_then(Value::as_timestamp) else {
            return false;
        };
        after.map_or(true, |bound| *t > bound) && before.map_or(true, |bound| *t < bound)
    })
}

fn sort_records(records: &mut [Record], order: &OrderBy) {
    records.sort_by(|a, b| compare_by(&order.field, order.direction, a, b));
}

/// Absent fields compare as `Null`
fn compare_by(field: &str, direction: SortDirection, a: &Record, b: &Record) -> Ordering {
    let null = Value::Null;
    let ord = a
        .get(field)
        .unwrap_or(&null)
        .natural_cmp(b.get(field).unwrap_or(&null));
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Chainable query over one table
///
/// ```
/// use std::sync::Arc;
/// use recordkv_core::{record, FieldKind, Schema, Value};
/// use recordkv_engine::{SortDirection, Table, TableDefinition};
/// use recordkv_storage::MemoryStore;
///
/// let def = TableDefinition::new(
///     "events",
///     Schema::new().field("id", FieldKind::Text).field("ws", FieldKind::Text),
/// )
/// .index("ws");
/// let table = Table::new(Arc::new(MemoryStore::new()), def).unwrap();
/// table.create(record! { "id" => "e1", "ws" => "A" }).unwrap();
///
/// let found = table
///     .query()
///     .where_eq("ws", "A")
///     .order_by("id", SortDirection::Desc)
///     .limit(10)
///     .execute()
///     .unwrap();
/// assert_eq!(found.len(), 1);
/// ```
#[must_use = "a query does nothing until executed"]
pub struct Query<'a> {
    table: &'a Table,
    spec: QuerySpec,
}

impl<'a> Query<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self {
            table,
            spec: QuerySpec::default(),
        }
    }

    /// Require `field == value`
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.spec.push_condition(field, value);
        self
    }

    /// Require every `field == value` pair, in iteration order
    pub fn where_all<I, F, V>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = (F, V)>,
        F: Into<String>,
        V: Into<Value>,
    {
        for (field, value) in conditions {
            self.spec.push_condition(field, value);
        }
        self
    }

    /// Keep records strictly after `bound`
    pub fn after(mut self, bound: DateTime<Utc>) -> Self {
        self.spec.after = Some(bound);
        self
    }

    /// Keep records strictly before `bound`
    pub fn before(mut self, bound: DateTime<Utc>) -> Self {
        self.spec.before = Some(bound);
        self
    }

    /// Return at most `n` records
    pub fn limit(mut self, n: usize) -> Self {
        self.spec.limit = Some(n);
        self
    }

    /// Sort by `field`
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.spec.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// The accumulated description
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Finish building without running
    pub fn into_spec(self) -> QuerySpec {
        self.spec
    }

    /// How candidates would be acquired
    pub fn explain(&self) -> QueryPlan {
        self.table.explain(&self.spec)
    }

    /// Run the query
    pub fn execute(self) -> Result<Vec<Record>> {
        self.table.execute(&self.spec)
    }
}
