//! In-memory gateway adapter for board synchronization tests.

use super::{Filter, GatewayResult, OrderBy, Record, RemoteError, SyncGateway, Table};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;
use uuid::Uuid;

/// Gateway primitive, used to target injected faults and read call counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    /// [`SyncGateway::query`].
    Query,
    /// [`SyncGateway::insert`].
    Insert,
    /// [`SyncGateway::update`].
    Update,
    /// [`SyncGateway::query_one`].
    QueryOne,
}

/// Thread-safe in-memory record store.
///
/// Models the policy layer of the remote store: generated identifiers and
/// timestamps, enum defaults and check constraints, actor columns filled from
/// the signed-in identity, and the implicit owner membership of a new
/// workspace. Rows keep insertion order, so ties on the requested ordering
/// fall back to creation order.
pub struct InMemoryGateway<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<GatewayState>>,
    query_gate: Arc<watch::Sender<bool>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct GatewayState {
    tables: HashMap<Table, Vec<Record>>,
    actor: Option<Uuid>,
    one_shot_faults: HashMap<GatewayOperation, VecDeque<Option<RemoteError>>>,
    table_faults: HashMap<(GatewayOperation, Table), RemoteError>,
    calls: HashMap<GatewayOperation, usize>,
}

impl InMemoryGateway<DefaultClock> {
    /// Creates an empty, signed-out gateway using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty gateway with `actor` signed in.
    #[must_use]
    pub fn signed_in(actor: impl Into<Uuid>) -> Self {
        let gateway = Self::new();
        gateway.sign_in(actor);
        gateway
    }
}

impl Default for InMemoryGateway<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for InMemoryGateway<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            query_gate: Arc::clone(&self.query_gate),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> fmt::Debug for InMemoryGateway<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryGateway")
            .field("state", &self.state)
            .field("queries_paused", &*self.query_gate.borrow())
            .finish_non_exhaustive()
    }
}

impl<C> InMemoryGateway<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty, signed-out gateway stamping rows with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        let (query_gate, _) = watch::channel(false);
        Self {
            state: Arc::new(RwLock::new(GatewayState::default())),
            query_gate: Arc::new(query_gate),
            clock,
        }
    }

    /// Sets the acting identity used by the policy layer.
    pub fn sign_in(&self, actor: impl Into<Uuid>) {
        self.write_state().actor = Some(actor.into());
    }

    /// Clears the acting identity; subsequent calls fail as unauthorized.
    pub fn sign_out(&self) {
        self.write_state().actor = None;
    }

    /// Inserts a raw row, bypassing defaults and policy.
    pub fn seed(&self, table: Table, record: Record) {
        self.write_state()
            .tables
            .entry(table)
            .or_default()
            .push(record);
    }

    /// Returns a copy of every row of `table` in insertion order.
    #[must_use]
    pub fn rows(&self, table: Table) -> Vec<Record> {
        self.read_state()
            .tables
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes the next call of `operation` fail with `error`.
    ///
    /// Queued faults are consumed in order, one per call.
    pub fn fail_next(&self, operation: GatewayOperation, error: RemoteError) {
        self.write_state()
            .one_shot_faults
            .entry(operation)
            .or_default()
            .push_back(Some(error));
    }

    /// Lets `passes` further calls of `operation` through, then fails the
    /// next one with `error`.
    pub fn fail_after(&self, operation: GatewayOperation, passes: usize, error: RemoteError) {
        let mut state = self.write_state();
        let queue = state.one_shot_faults.entry(operation).or_default();
        queue.extend(std::iter::repeat_n(None, passes));
        queue.push_back(Some(error));
    }

    /// Makes every call of `operation` on `table` fail with `error` until
    /// [`Self::clear_faults`] is called.
    pub fn fail_table(&self, operation: GatewayOperation, table: Table, error: RemoteError) {
        self.write_state()
            .table_faults
            .insert((operation, table), error);
    }

    /// Removes all injected faults.
    pub fn clear_faults(&self) {
        let mut state = self.write_state();
        state.one_shot_faults.clear();
        state.table_faults.clear();
    }

    /// Holds every subsequent query until [`Self::resume_queries`] is called.
    pub fn pause_queries(&self) {
        self.query_gate.send_replace(true);
    }

    /// Releases held and future queries.
    pub fn resume_queries(&self) {
        self.query_gate.send_replace(false);
    }

    /// Returns how many times `operation` has been invoked.
    #[must_use]
    pub fn calls(&self, operation: GatewayOperation) -> usize {
        self.read_state()
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, GatewayState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, GatewayState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Records the call, then returns the actor or the injected fault.
    fn begin(&self, operation: GatewayOperation, table: Table) -> GatewayResult<Uuid> {
        let mut state = self.write_state();
        *state.calls.entry(operation).or_insert(0) += 1;
        if let Some(error) = state
            .one_shot_faults
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
            .flatten()
        {
            return Err(error);
        }
        if let Some(error) = state.table_faults.get(&(operation, table)) {
            return Err(error.clone());
        }
        state
            .actor
            .ok_or_else(|| RemoteError::Unauthorized("no signed-in actor".to_owned()))
    }

    async fn wait_for_query_gate(&self) -> GatewayResult<()> {
        let mut gate = self.query_gate.subscribe();
        gate.wait_for(|paused| !*paused)
            .await
            .map(drop)
            .map_err(RemoteError::transport)
    }

    fn timestamp(&self) -> Value {
        Value::String(self.clock.utc().to_rfc3339())
    }

    fn apply_insert_policy(
        &self,
        table: Table,
        actor: Uuid,
        record: &mut Record,
    ) -> GatewayResult<()> {
        let now = self.timestamp();
        let actor_value = Value::String(actor.to_string());
        match table {
            Table::Workspaces => {
                fill_id(record);
                fill_default(record, "description", Value::Null);
                fill_default(record, "created_at", now);
                fill_actor(record, "created_by", actor_value);
            }
            Table::WorkspaceMembers => {
                fill_default(record, "role", Value::String("member".to_owned()));
                fill_default(record, "joined_at", now);
                fill_actor(record, "user_id", actor_value);
            }
            Table::TaskLists => {
                fill_id(record);
                fill_default(record, "position", Value::from(0_u64));
                fill_default(record, "created_at", now);
            }
            Table::Tasks => {
                fill_id(record);
                fill_default(record, "description", Value::Null);
                fill_default(record, "status", Value::String("todo".to_owned()));
                fill_default(record, "priority", Value::String("medium".to_owned()));
                fill_default(record, "position", Value::from(0_u64));
                fill_default(record, "due_date", Value::Null);
                fill_default(record, "assigned_to", Value::Null);
                fill_actor(record, "created_by", actor_value);
                fill_default(record, "created_at", now.clone());
                fill_default(record, "updated_at", now);
            }
            Table::Users => {
                return Err(RemoteError::rejected(table, "users are read-only"));
            }
        }
        check_constraints(table, record)
    }
}

fn fill_id(record: &mut Record) {
    fill_default(record, "id", Value::String(Uuid::new_v4().to_string()));
}

fn fill_default(record: &mut Record, field: &str, value: Value) {
    if !record.contains_key(field) {
        record.insert(field.to_owned(), value);
    }
}

/// Fills an actor column left missing, null, or blank by the caller.
fn fill_actor(record: &mut Record, field: &str, actor: Value) {
    let is_blank = match record.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(raw)) => raw.trim().is_empty(),
        Some(_) => false,
    };
    if is_blank {
        record.insert(field.to_owned(), actor);
    }
}

const TASK_STATUSES: [&str; 4] = ["todo", "in_progress", "review", "done"];
const TASK_PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];
const MEMBER_ROLES: [&str; 3] = ["owner", "admin", "member"];

const TASK_CHECKS: &[(&str, &[&str])] =
    &[("status", &TASK_STATUSES), ("priority", &TASK_PRIORITIES)];
const MEMBER_CHECKS: &[(&str, &[&str])] = &[("role", &MEMBER_ROLES)];

fn check_constraints(table: Table, record: &Record) -> GatewayResult<()> {
    let checks = match table {
        Table::Tasks => TASK_CHECKS,
        Table::WorkspaceMembers => MEMBER_CHECKS,
        Table::Workspaces | Table::TaskLists | Table::Users => &[],
    };
    for (field, allowed) in checks {
        let value = record.get(*field).and_then(Value::as_str);
        if !value.is_some_and(|candidate| allowed.contains(&candidate)) {
            return Err(RemoteError::rejected(
                table,
                format!("check constraint on {field} violated"),
            ));
        }
    }
    if let Some(position) = record.get("position")
        && !position.is_u64()
    {
        return Err(RemoteError::rejected(
            table,
            "position must be a non-negative integer",
        ));
    }
    Ok(())
}

fn same_membership(left: &Record, right: &Record) -> bool {
    left.get("workspace_id") == right.get("workspace_id")
        && left.get("user_id") == right.get("user_id")
}

#[async_trait]
impl<C> SyncGateway for InMemoryGateway<C>
where
    C: Clock + Send + Sync,
{
    async fn query(
        &self,
        table: Table,
        filters: &[Filter],
        order: &[OrderBy],
    ) -> GatewayResult<Vec<Record>> {
        self.wait_for_query_gate().await?;
        self.begin(GatewayOperation::Query, table)?;
        let state = self.read_state();
        let mut rows: Vec<Record> = state
            .tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|filter| filter.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|left, right| {
            order
                .iter()
                .map(|column| column.compare(left, right))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(rows)
    }

    async fn insert(&self, table: Table, record: Record) -> GatewayResult<Record> {
        let actor = self.begin(GatewayOperation::Insert, table)?;
        let mut row = record;
        self.apply_insert_policy(table, actor, &mut row)?;

        let mut state = self.write_state();
        if table == Table::WorkspaceMembers
            && state
                .tables
                .get(&table)
                .is_some_and(|rows| rows.iter().any(|existing| same_membership(existing, &row)))
        {
            return Err(RemoteError::rejected(table, "duplicate membership"));
        }
        if table == Table::Workspaces {
            let mut owner = Record::new();
            owner.insert("workspace_id".to_owned(), row.get("id").cloned().unwrap_or(Value::Null));
            owner.insert("user_id".to_owned(), Value::String(actor.to_string()));
            owner.insert("role".to_owned(), Value::String("owner".to_owned()));
            owner.insert("joined_at".to_owned(), self.timestamp());
            state
                .tables
                .entry(Table::WorkspaceMembers)
                .or_default()
                .push(owner);
        }
        state.tables.entry(table).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Record) -> GatewayResult<Record> {
        self.begin(GatewayOperation::Update, table)?;
        let key = Value::String(id.to_string());
        let now = self.timestamp();

        let mut state = self.write_state();
        let row = state
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|row| row.get("id") == Some(&key)))
            .ok_or(RemoteError::NotFound { table, id })?;

        let mut updated = row.clone();
        for (field, value) in patch {
            if field != "id" {
                updated.insert(field, value);
            }
        }
        if table == Table::Tasks {
            updated.insert("updated_at".to_owned(), now);
        }
        check_constraints(table, &updated)?;
        *row = updated.clone();
        Ok(updated)
    }

    async fn query_one(&self, table: Table, filters: &[Filter]) -> GatewayResult<Option<Record>> {
        self.wait_for_query_gate().await?;
        self.begin(GatewayOperation::QueryOne, table)?;
        let state = self.read_state();
        let mut matches = state
            .tables
            .get(&table)
            .into_iter()
            .flatten()
            .filter(|row| filters.iter().all(|filter| filter.matches(row)));
        let first = matches.next().cloned();
        if matches.next().is_some() {
            return Err(RemoteError::rejected(table, "query matched more than one row"));
        }
        Ok(first)
    }
}
