//! Local cache of lists and tasks backed by the remote store of record.

use super::{
    BoardChange, BoardEvent, BoardSnapshot, CreateError, FetchError, FetchScope, ReorderError,
    ScopedSubscription, UpdateError,
};
use crate::board::domain::{
    BoardDomainError, ListId, NewTask, NewTaskList, Position, RankChange, Task, TaskId, TaskList,
    TaskPatch, WorkspaceId, position::append_position,
};
use crate::config::BoardConfig;
use crate::gateway::{
    Filter, OrderBy, Record, RemoteError, SyncGateway, Table, decode_record, decode_records,
    encode_record,
};
use futures::future::{BoxFuture, FutureExt, Shared, try_join_all};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{OwnedMutexGuard, broadcast};
use tracing::{debug, info, trace, warn};

type SharedFetch = Shared<BoxFuture<'static, Result<(), FetchError>>>;

/// Whether a fetch may piggyback on one already in flight for its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coalesce {
    /// Await the in-flight fetch, if any.
    Join,
    /// Always issue a new query; used after writes, where an older fetch may
    /// predate the change.
    Fresh,
}

#[derive(Debug, Default)]
struct BoardState {
    workspace_id: Option<WorkspaceId>,
    lists: Arc<Vec<TaskList>>,
    tasks: HashMap<ListId, Arc<Vec<Task>>>,
    stale: HashSet<ListId>,
    loading: HashMap<FetchScope, usize>,
    applied: HashMap<FetchScope, u64>,
    next_ticket: u64,
    epoch: u64,
}

/// Identity of one fetch, used to drop responses that arrive out of order
/// or after a reset.
#[derive(Debug, Clone, Copy)]
struct FetchTicket {
    scope: FetchScope,
    sequence: u64,
    epoch: u64,
    workspace_id: Option<WorkspaceId>,
}

impl BoardState {
    fn accepts(&self, ticket: &FetchTicket) -> bool {
        self.epoch == ticket.epoch
            && self
                .applied
                .get(&ticket.scope)
                .is_none_or(|applied| *applied < ticket.sequence)
    }

    /// Finds the bucket holding `task_id`, preferring fresh buckets over
    /// stale ones that may still list a task that has moved away.
    fn locate(&self, task_id: TaskId) -> Option<ListId> {
        let mut holders = self
            .tasks
            .iter()
            .filter(|(_, bucket)| bucket.iter().any(|task| task.id() == task_id))
            .map(|(list_id, _)| *list_id);
        let first = holders.next()?;
        if !self.stale.contains(&first) {
            return Some(first);
        }
        Some(
            holders
                .find(|list_id| !self.stale.contains(list_id))
                .unwrap_or(first),
        )
    }

    fn holds_list(&self, list_id: ListId) -> bool {
        self.lists.iter().any(|list| list.id() == list_id)
    }
}

/// Holds the mutation locks of one or more containers until dropped.
#[derive(Debug)]
pub struct MutationGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

/// Owned cache of the active workspace's lists and of every loaded list's
/// tasks.
///
/// The store is the only writer of its state. Every bucket is replaced
/// wholesale, so [`BoardSnapshot`]s handed to readers never change under
/// them. Reads go through the gateway with at most one outstanding fetch per
/// [`FetchScope`]; a second caller for the same scope awaits the first
/// caller's result. Cloning the store yields another handle to the same
/// cache.
pub struct CollectionStore<G>
where
    G: SyncGateway + 'static,
{
    gateway: Arc<G>,
    config: BoardConfig,
    state: Arc<RwLock<BoardState>>,
    inflight: Arc<Mutex<HashMap<FetchScope, SharedFetch>>>,
    mutation_locks: Arc<Mutex<HashMap<FetchScope, Arc<tokio::sync::Mutex<()>>>>>,
    events: broadcast::Sender<BoardEvent>,
}

impl<G> Clone for CollectionStore<G>
where
    G: SyncGateway + 'static,
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            config: self.config,
            state: Arc::clone(&self.state),
            inflight: Arc::clone(&self.inflight),
            mutation_locks: Arc::clone(&self.mutation_locks),
            events: self.events.clone(),
        }
    }
}

impl<G> CollectionStore<G>
where
    G: SyncGateway + 'static,
{
    /// Creates an empty store reading and writing through `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<G>, config: BoardConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            gateway,
            config,
            state: Arc::new(RwLock::new(BoardState::default())),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            mutation_locks: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    /// Returns the configuration the store was built with.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Returns an immutable copy of the cache.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        let state = self.read_state();
        BoardSnapshot {
            workspace_id: state.workspace_id,
            lists: Arc::clone(&state.lists),
            tasks: state.tasks.clone(),
            stale: state.stale.clone(),
        }
    }

    /// Returns the workspace whose lists are loaded.
    #[must_use]
    pub fn active_workspace(&self) -> Option<WorkspaceId> {
        self.read_state().workspace_id
    }

    /// Returns the lists of the active workspace in position order.
    #[must_use]
    pub fn lists(&self) -> Arc<Vec<TaskList>> {
        Arc::clone(&self.read_state().lists)
    }

    /// Returns the tasks of `list_id` in position order, if loaded.
    #[must_use]
    pub fn tasks(&self, list_id: ListId) -> Option<Arc<Vec<Task>>> {
        self.read_state().tasks.get(&list_id).cloned()
    }

    /// Returns `true` once the tasks of `list_id` have been loaded.
    #[must_use]
    pub fn has_bucket(&self, list_id: ListId) -> bool {
        self.read_state().tasks.contains_key(&list_id)
    }

    /// Returns the locally known number of tasks in `list_id`.
    #[must_use]
    pub fn task_count(&self, list_id: ListId) -> usize {
        self.read_state()
            .tasks
            .get(&list_id)
            .map_or(0, |bucket| bucket.len())
    }

    /// Returns the cached copy of a task.
    #[must_use]
    pub fn find_task(&self, task_id: TaskId) -> Option<Task> {
        self.read_state()
            .tasks
            .values()
            .flat_map(|bucket| bucket.iter())
            .find(|task| task.id() == task_id)
            .cloned()
    }

    /// Returns `true` while a fetch for `scope` is outstanding.
    #[must_use]
    pub fn is_loading(&self, scope: FetchScope) -> bool {
        self.read_state().loading.contains_key(&scope)
    }

    /// Returns `true` when the bucket of `list_id` may still hold a task that
    /// moved to another list.
    #[must_use]
    pub fn is_stale(&self, list_id: ListId) -> bool {
        self.read_state().stale.contains(&list_id)
    }

    /// Subscribes to every change event.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Subscribes to the change events of one scope.
    #[must_use]
    pub fn subscribe_scope(&self, scope: FetchScope) -> ScopedSubscription {
        ScopedSubscription::new(scope, self.events.subscribe())
    }

    /// Loads the lists of `workspace_id`, then the tasks of every list.
    ///
    /// The workspace becomes the active one. Buckets of lists that no longer
    /// belong to it are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the list query fails, leaving the cache as
    /// it was, or when one of the task queries fails, leaving that bucket as
    /// it was.
    pub async fn load_lists(&self, workspace_id: WorkspaceId) -> Result<(), FetchError> {
        let store = self.clone();
        self.coalesce(FetchScope::Workspace(workspace_id), Coalesce::Join, move || {
            async move { store.fetch_lists(workspace_id).await }.boxed()
        })
        .await
    }

    /// Loads the tasks of `list_id`, replacing only that bucket.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the query fails; the bucket is left as it
    /// was.
    pub async fn load_tasks(&self, list_id: ListId) -> Result<(), FetchError> {
        self.fetch_tasks_with(list_id, Coalesce::Join).await
    }

    async fn reconcile_tasks(&self, list_id: ListId) -> Result<(), FetchError> {
        self.fetch_tasks_with(list_id, Coalesce::Fresh).await
    }

    async fn fetch_tasks_with(&self, list_id: ListId, mode: Coalesce) -> Result<(), FetchError> {
        let store = self.clone();
        self.coalesce(FetchScope::List(list_id), mode, move || {
            async move { store.fetch_tasks(list_id).await }.boxed()
        })
        .await
    }

    async fn coalesce<F>(
        &self,
        scope: FetchScope,
        mode: Coalesce,
        start: F,
    ) -> Result<(), FetchError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<(), FetchError>>,
    {
        let fetch = {
            let mut inflight = self.lock_inflight();
            let joinable = match mode {
                Coalesce::Join => inflight.get(&scope).cloned(),
                Coalesce::Fresh => None,
            };
            joinable.map_or_else(
                || {
                    let started = start().shared();
                    inflight.insert(scope, started.clone());
                    started
                },
                |existing| {
                    debug!(%scope, "joining in-flight fetch");
                    existing
                },
            )
        };

        let result = fetch.clone().await;

        let mut inflight = self.lock_inflight();
        if inflight
            .get(&scope)
            .is_some_and(|current| current.ptr_eq(&fetch))
        {
            inflight.remove(&scope);
        }
        result
    }

    async fn fetch_lists(&self, workspace_id: WorkspaceId) -> Result<(), FetchError> {
        let scope = FetchScope::Workspace(workspace_id);
        let ticket = self.begin_fetch(scope);
        debug!(%workspace_id, "fetching task lists");
        let result = self
            .gateway
            .query(
                Table::TaskLists,
                &[Filter::equals("workspace_id", workspace_id.to_string())],
                &sibling_order(),
            )
            .await
            .and_then(|records| decode_records::<TaskList>(Table::TaskLists, records));
        self.finish_fetch(&ticket);

        let lists = result.map_err(|source| fetch_failed(scope, source))?;
        let list_ids: Vec<ListId> = lists.iter().map(TaskList::id).collect();
        if !self.apply_lists(&ticket, workspace_id, lists) {
            return Ok(());
        }

        try_join_all(list_ids.into_iter().map(|list_id| self.load_tasks(list_id))).await?;
        Ok(())
    }

    async fn fetch_tasks(&self, list_id: ListId) -> Result<(), FetchError> {
        let scope = FetchScope::List(list_id);
        let ticket = self.begin_fetch(scope);
        debug!(%list_id, "fetching tasks");
        let result = self
            .gateway
            .query(
                Table::Tasks,
                &[Filter::equals("list_id", list_id.to_string())],
                &sibling_order(),
            )
            .await
            .and_then(|records| decode_records::<Task>(Table::Tasks, records));
        self.finish_fetch(&ticket);

        let tasks = result.map_err(|source| fetch_failed(scope, source))?;
        self.apply_tasks(&ticket, list_id, tasks);
        Ok(())
    }

    /// Creates a list at the end of `workspace_id`.
    ///
    /// The position follows the last local list, so the workspace is loaded
    /// first when it is not the active one. Creation is pessimistic: the
    /// store-assigned row is appended only after the insert succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CreateError`] when the name is blank, the workspace cannot
    /// be loaded, or the insert fails. No local row is added on failure.
    pub async fn create_list(
        &self,
        workspace_id: WorkspaceId,
        name: impl Into<String>,
    ) -> Result<TaskList, CreateError> {
        let new_list = NewTaskList::new(workspace_id, name)?;
        let _guard = self
            .serialize(&[FetchScope::Workspace(workspace_id)])
            .await;
        if self.active_workspace() != Some(workspace_id) {
            self.load_lists(workspace_id).await?;
        }

        let position = append_position(self.lists().as_slice());
        let mut record = encode_record(Table::TaskLists, &new_list)?;
        record.insert("position".to_owned(), Value::from(position.value()));

        let epoch = self.current_epoch();
        let list = self
            .gateway
            .insert(Table::TaskLists, record)
            .await
            .and_then(|row| decode_record::<TaskList>(Table::TaskLists, row))
            .map_err(|err| {
                warn!(%workspace_id, error = %err, "task list insert failed");
                err
            })?;
        info!(list_id = %list.id(), %workspace_id, %position, "created task list");

        self.apply_new_list(epoch, &list);
        Ok(list)
    }

    /// Creates a task at the end of its list.
    ///
    /// The position follows the last local task of the list, loading the list
    /// first if it has never been fetched. Creation is pessimistic.
    ///
    /// # Errors
    ///
    /// Returns [`CreateError`] when the list cannot be loaded or the insert
    /// fails. No local row is added on failure.
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, CreateError> {
        let list_id = new_task.list_id();
        let _guard = self.serialize(&[FetchScope::List(list_id)]).await;
        if !self.has_bucket(list_id) {
            self.load_tasks(list_id).await?;
        }

        let position = append_position(self.tasks(list_id).unwrap_or_default().as_slice());
        let mut record = encode_record(Table::Tasks, &new_task)?;
        record.insert("position".to_owned(), Value::from(position.value()));

        let epoch = self.current_epoch();
        let task = self
            .gateway
            .insert(Table::Tasks, record)
            .await
            .and_then(|row| decode_record::<Task>(Table::Tasks, row))
            .map_err(|err| {
                warn!(%list_id, error = %err, "task insert failed");
                err
            })?;
        info!(task_id = %task.id(), %list_id, %position, "created task");

        self.apply_new_task(epoch, &task);
        Ok(task)
    }

    /// Applies `patch` remotely and replaces the cached row with the
    /// returned one.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::NotFound`] for an unknown task,
    /// [`UpdateError::Rejected`] when the store refuses the change, and
    /// [`UpdateError::Domain`] for an empty patch. The cache is unchanged on
    /// failure.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task, UpdateError> {
        if patch.is_empty() {
            return Err(BoardDomainError::EmptyTaskPatch.into());
        }
        let record = encode_record(Table::Tasks, &patch)
            .map_err(|source| UpdateError::from_remote(task_id, source))?;

        let epoch = self.current_epoch();
        let task = self.persist_update(task_id, record).await?;
        info!(%task_id, "updated task");

        self.apply_task_update(epoch, &task);
        Ok(task)
    }

    /// Moves a task to `target_list_id` at `new_position` and reconciles.
    ///
    /// The list and position change in one update, followed by
    /// [`Self::refresh_after_move`].
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::Update`] when the update fails (nothing
    /// changed) and [`ReorderError::Reconcile`] when the update persisted but
    /// a refetch failed.
    pub async fn reorder_task(
        &self,
        task_id: TaskId,
        target_list_id: ListId,
        new_position: Position,
    ) -> Result<(), ReorderError> {
        let source_list_id = self.read_state().locate(task_id);
        self.persist_move(task_id, target_list_id, new_position).await?;
        self.refresh_after_move(source_list_id, target_list_id).await?;
        Ok(())
    }

    /// Persists the list and position of a moved task in one update,
    /// without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] when the update fails; nothing changed.
    pub async fn persist_move(
        &self,
        task_id: TaskId,
        target_list_id: ListId,
        new_position: Position,
    ) -> Result<(), UpdateError> {
        let mut patch = Record::new();
        patch.insert("position".to_owned(), Value::from(new_position.value()));
        patch.insert(
            "list_id".to_owned(),
            Value::String(target_list_id.to_string()),
        );
        self.persist_update(task_id, patch).await?;
        info!(%task_id, target = %target_list_id, position = %new_position, "persisted task move");
        Ok(())
    }

    /// Reconciles the lists touched by a move.
    ///
    /// The target list is refetched. When the task came from another list,
    /// that list is refetched too, or marked stale if the store is
    /// configured not to.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] for the first refetch that fails.
    pub async fn refresh_after_move(
        &self,
        source_list_id: Option<ListId>,
        target_list_id: ListId,
    ) -> Result<(), FetchError> {
        self.reconcile_tasks(target_list_id).await?;
        if let Some(source) = source_list_id.filter(|source| *source != target_list_id) {
            if self.config.refresh_source_on_move {
                self.reconcile_tasks(source).await?;
            } else {
                self.mark_stale(source);
            }
        }
        Ok(())
    }

    /// Refetches every list in `list_ids`, never joining a fetch that was
    /// already in flight.
    ///
    /// Used to resynchronize after a sequence of writes stopped part-way.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when one of the queries fails; the other
    /// buckets are still replaced.
    pub async fn refresh_lists(&self, list_ids: &[ListId]) -> Result<(), FetchError> {
        let mut first_error = None;
        for list_id in list_ids {
            if let Err(err) = self.reconcile_tasks(*list_id).await {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Persists position-only updates for re-ranked siblings, in the order
    /// given.
    ///
    /// The cache is not touched; callers reconcile afterwards.
    ///
    /// # Errors
    ///
    /// Returns the [`UpdateError`] of the first update that fails; earlier
    /// updates stay persisted.
    pub async fn persist_ranks(&self, changes: &[RankChange<TaskId>]) -> Result<(), UpdateError> {
        for change in changes {
            let mut patch = Record::new();
            patch.insert("position".to_owned(), Value::from(change.to.value()));
            self.persist_update(change.id, patch).await?;
            debug!(task_id = %change.id, from = %change.from, to = %change.to, "re-ranked task");
        }
        Ok(())
    }

    /// Drops all cached state.
    ///
    /// Fetches already in flight still complete, but their responses are
    /// discarded instead of applied.
    pub fn reset(&self) {
        let previous = {
            let mut state = self.write_state();
            let previous = state.workspace_id;
            let epoch = state.epoch.wrapping_add(1);
            *state = BoardState {
                epoch,
                ..BoardState::default()
            };
            previous
        };
        self.lock_inflight().clear();
        debug!("board cache reset");
        if let Some(workspace_id) = previous {
            self.publish(FetchScope::Workspace(workspace_id), BoardChange::Reset);
        }
    }

    /// Acquires the mutation locks of `scopes`, in a stable order.
    ///
    /// Returns an empty guard when mutation serialization is disabled.
    pub async fn serialize(&self, scopes: &[FetchScope]) -> MutationGuard {
        if !self.config.serialize_mutations {
            return MutationGuard {
                _guards: Vec::new(),
            };
        }
        let mut ordered = scopes.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let locks: Vec<_> = {
            let mut registry = self
                .mutation_locks
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            ordered
                .iter()
                .map(|scope| Arc::clone(registry.entry(*scope).or_default()))
                .collect()
        };
        let mut guards = Vec::with_capacity(locks.len());
        for lock in locks {
            guards.push(lock.lock_owned().await);
        }
        MutationGuard { _guards: guards }
    }

    async fn persist_update(&self, task_id: TaskId, patch: Record) -> Result<Task, UpdateError> {
        self.gateway
            .update(Table::Tasks, task_id.into_inner(), patch)
            .await
            .and_then(|row| decode_record::<Task>(Table::Tasks, row))
            .map_err(|err| {
                warn!(%task_id, error = %err, "task update failed");
                UpdateError::from_remote(task_id, err)
            })
    }

    fn begin_fetch(&self, scope: FetchScope) -> FetchTicket {
        let mut state = self.write_state();
        state.next_ticket = state.next_ticket.wrapping_add(1);
        *state.loading.entry(scope).or_insert(0) += 1;
        FetchTicket {
            scope,
            sequence: state.next_ticket,
            epoch: state.epoch,
            workspace_id: state.workspace_id,
        }
    }

    fn finish_fetch(&self, ticket: &FetchTicket) {
        let mut state = self.write_state();
        if state.epoch != ticket.epoch {
            return;
        }
        if let Some(count) = state.loading.get_mut(&ticket.scope) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                state.loading.remove(&ticket.scope);
            }
        }
    }

    fn apply_lists(
        &self,
        ticket: &FetchTicket,
        workspace_id: WorkspaceId,
        lists: Vec<TaskList>,
    ) -> bool {
        {
            let mut state = self.write_state();
            if !state.accepts(ticket) {
                drop(state);
                warn!(%workspace_id, "discarding outdated task list response");
                return false;
            }
            if state.workspace_id != Some(workspace_id) {
                state.tasks.clear();
                state.stale.clear();
            } else {
                let kept: HashSet<ListId> = lists.iter().map(TaskList::id).collect();
                state.tasks.retain(|list_id, _| kept.contains(list_id));
                state.stale.retain(|list_id| kept.contains(list_id));
            }
            state.workspace_id = Some(workspace_id);
            state.lists = Arc::new(lists);
            state.applied.insert(ticket.scope, ticket.sequence);
        }
        self.publish(ticket.scope, BoardChange::ListsReplaced);
        true
    }

    fn apply_tasks(&self, ticket: &FetchTicket, list_id: ListId, tasks: Vec<Task>) {
        {
            let mut state = self.write_state();
            if !state.accepts(ticket) {
                drop(state);
                warn!(%list_id, "discarding outdated task response");
                return;
            }
            if state.workspace_id != ticket.workspace_id && !state.holds_list(list_id) {
                drop(state);
                warn!(%list_id, "discarding task response for an inactive workspace");
                return;
            }
            state.tasks.insert(list_id, Arc::new(tasks));
            state.stale.remove(&list_id);
            state.applied.insert(ticket.scope, ticket.sequence);
        }
        self.publish(ticket.scope, BoardChange::TasksReplaced);
    }

    fn apply_new_list(&self, epoch: u64, list: &TaskList) {
        {
            let mut state = self.write_state();
            if state.epoch != epoch || state.workspace_id != Some(list.workspace_id()) {
                return;
            }
            let mut lists = state.lists.as_ref().clone();
            lists.push(list.clone());
            state.lists = Arc::new(lists);
            state.tasks.entry(list.id()).or_default();
        }
        self.publish(
            FetchScope::Workspace(list.workspace_id()),
            BoardChange::ListAdded(list.id()),
        );
    }

    fn apply_new_task(&self, epoch: u64, task: &Task) {
        {
            let mut state = self.write_state();
            if state.epoch != epoch {
                return;
            }
            let bucket = state.tasks.entry(task.list_id()).or_default();
            let mut tasks = bucket.as_ref().clone();
            tasks.push(task.clone());
            *bucket = Arc::new(tasks);
        }
        self.publish(
            FetchScope::List(task.list_id()),
            BoardChange::TaskAdded(task.id()),
        );
    }

    fn apply_task_update(&self, epoch: u64, task: &Task) {
        {
            let mut state = self.write_state();
            if state.epoch != epoch {
                return;
            }
            let Some(bucket) = state.tasks.get_mut(&task.list_id()) else {
                return;
            };
            if !bucket.iter().any(|cached| cached.id() == task.id()) {
                return;
            }
            let tasks = bucket
                .iter()
                .map(|cached| {
                    if cached.id() == task.id() {
                        task.clone()
                    } else {
                        cached.clone()
                    }
                })
                .collect();
            *bucket = Arc::new(tasks);
        }
        self.publish(
            FetchScope::List(task.list_id()),
            BoardChange::TaskUpdated(task.id()),
        );
    }

    fn mark_stale(&self, list_id: ListId) {
        self.write_state().stale.insert(list_id);
        debug!(%list_id, "source list left stale after move");
        self.publish(FetchScope::List(list_id), BoardChange::MarkedStale);
    }

    fn publish(&self, scope: FetchScope, change: BoardChange) {
        if self.events.send(BoardEvent { scope, change }).is_err() {
            trace!(%scope, "no board subscribers");
        }
    }

    fn current_epoch(&self) -> u64 {
        self.read_state().epoch
    }

    fn read_state(&self) -> RwLockReadGuard<'_, BoardState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, BoardState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_inflight(&self) -> MutexGuard<'_, HashMap<FetchScope, SharedFetch>> {
        self.inflight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Position first, then creation order, then identifier.
fn sibling_order() -> [OrderBy; 3] {
    [
        OrderBy::asc("position"),
        OrderBy::asc("created_at"),
        OrderBy::asc("id"),
    ]
}

fn fetch_failed(scope: FetchScope, source: RemoteError) -> FetchError {
    warn!(%scope, error = %source, "fetch failed");
    FetchError::new(scope, source)
}
