//! The user's task list as last returned by the backend.
//!
//! The list is never patched in place: every mutation is followed by a full
//! reload, and a reload replaces the whole sequence. Failures are logged where
//! they happen, remembered in [`TaskListStore::last_error`] and returned to the
//! caller; the previously displayed list is left untouched.

use crate::api::TodoApi;
use crate::error::AppError;
use crate::model::{DeleteTodoInput, Task, TaskDraft, TaskId, TodoFilter, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the list; carries the new length.
    Applied(usize),
    /// A newer load was already applied, or the store was detached.
    Stale,
}

/// Sequence number handed out by [`TaskListStore::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

pub struct TaskListStore<A> {
    api: A,
    user_id: UserId,
    tasks: Vec<Task>,
    state: ListState,
    issued: u64,
    applied: u64,
    has_list: bool,
    last_error: Option<AppError>,
}

impl<A: TodoApi> TaskListStore<A> {
    pub fn new(api: A, user_id: UserId) -> Self {
        Self {
            api,
            user_id,
            tasks: Vec::new(),
            state: ListState::Idle,
            issued: 0,
            applied: 0,
            has_list: false,
            last_error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    /// Fetches every task owned by the current user and replaces the list.
    pub async fn load(&mut self) -> Result<LoadOutcome, AppError> {
        let ticket = self.begin_load();
        let result = self
            .api
            .list_todos(&TodoFilter::for_user(&self.user_id))
            .await;
        self.finish_load(ticket, result)
    }

    /// Tags a new load. Responses are applied only if their ticket is newer
    /// than the last one applied.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.state = ListState::Loading;
        LoadTicket(self.issued)
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Task>, AppError>,
    ) -> Result<LoadOutcome, AppError> {
        if ticket.0 <= self.applied {
            tracing::debug!(ticket = ticket.0, applied = self.applied, "dropping stale load");
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(tasks) => {
                self.applied = ticket.0;
                self.tasks = tasks;
                self.has_list = true;
                if ticket.0 == self.issued {
                    self.state = ListState::Loaded;
                }
                self.last_error = None;
                tracing::debug!(count = self.tasks.len(), "task list replaced");
                Ok(LoadOutcome::Applied(self.tasks.len()))
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load tasks");
                if ticket.0 == self.issued {
                    self.state = self.settled_state();
                }
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Attaches the session's user id to `draft`, creates it, then reloads.
    pub async fn create(&mut self, draft: TaskDraft) -> Result<Task, AppError> {
        let input = draft.into_input(&self.user_id);
        let created = match self.api.create_todo(&input).await {
            Ok(task) => task,
            Err(err) => {
                tracing::error!(error = %err, "failed to create task");
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };
        tracing::debug!(id = %created.id, "task created");

        // A failed reload is already recorded by `load`; the create stands.
        let _ = self.load().await;
        Ok(created)
    }

    /// Deletes the task with `id`, then reloads.
    pub async fn delete(&mut self, id: &TaskId) -> Result<Task, AppError> {
        let input = DeleteTodoInput { id: id.clone() };
        let deleted = match self.api.delete_todo(&input).await {
            Ok(task) => task,
            Err(err) => {
                tracing::error!(error = %err, id = %id, "failed to delete task");
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };
        tracing::debug!(id = %deleted.id, "task deleted");

        let _ = self.load().await;
        Ok(deleted)
    }

    /// Like [`delete`](Self::delete) for an unchecked id; a blank id issues
    /// no request and yields `Ok(None)`.
    pub async fn delete_raw(&mut self, raw_id: &str) -> Result<Option<Task>, AppError> {
        match TaskId::parse(raw_id) {
            Some(id) => self.delete(&id).await.map(Some),
            None => {
                tracing::debug!("skipping delete without an id");
                Ok(None)
            }
        }
    }

    /// Stops accepting responses for loads already in flight.
    pub fn detach(&mut self) {
        self.applied = self.issued;
        self.state = self.settled_state();
    }

    fn settled_state(&self) -> ListState {
        if !self.has_list {
            ListState::Idle
        } else {
            ListState::Loaded
        }
    }
}
