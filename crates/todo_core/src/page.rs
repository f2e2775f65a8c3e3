use crate::api::TodoApi;
use crate::error::AppError;
use crate::form::{FormController, SubmitOutcome};
use crate::model::{Task, TaskId};
use crate::session::{AuthUser, SessionProvider};
use crate::store::{LoadOutcome, TaskListStore};

/// The single to-do page: session, creation form and task list wired
/// together. Every user action maps to one method here.
pub struct TodoPage<A, S> {
    session: S,
    user: AuthUser,
    store: TaskListStore<A>,
    form: FormController,
    signed_out: bool,
}

impl<A: TodoApi, S: SessionProvider> TodoPage<A, S> {
    /// Resolves the signed-in user, then builds the API client for them.
    pub fn open<F>(session: S, connect: F) -> Result<Self, AppError>
    where
        F: FnOnce(&AuthUser) -> Result<A, AppError>,
    {
        let user = session.current_user()?;
        let api = connect(&user)?;
        Ok(Self::new(api, session, user))
    }

    pub fn new(api: A, session: S, user: AuthUser) -> Self {
        let store = TaskListStore::new(api, user.user_id.clone());
        Self {
            session,
            user,
            store,
            form: FormController::new(),
            signed_out: false,
        }
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn store(&self) -> &TaskListStore<A> {
        &self.store
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    pub fn is_signed_out(&self) -> bool {
        self.signed_out
    }

    /// Initial load.
    pub async fn mount(&mut self) -> Result<LoadOutcome, AppError> {
        self.store.load().await
    }

    pub async fn reload(&mut self) -> Result<LoadOutcome, AppError> {
        self.store.load().await
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        self.form.submit(&mut self.store).await
    }

    /// Completes (deletes) a task picked by id or by 1-based list position.
    /// A blank target is ignored.
    pub async fn complete(&mut self, target: &str) -> Result<Option<Task>, AppError> {
        match self.resolve_position(target) {
            Some(id) => self.store.delete(&id).await.map(Some),
            None => self.store.delete_raw(target).await,
        }
    }

    pub async fn complete_at(&mut self, position: usize) -> Result<Task, AppError> {
        let id = position
            .checked_sub(1)
            .and_then(|index| self.store.tasks().get(index))
            .map(|task| task.id.clone())
            .ok_or_else(|| AppError::invalid_input(format!("no task at position {position}")))?;
        self.store.delete(&id).await
    }

    /// Forgets the session and stops applying responses still in flight.
    pub fn sign_out(&mut self) -> Result<(), AppError> {
        self.session.sign_out()?;
        self.store.detach();
        self.signed_out = true;
        tracing::info!(user_id = %self.user.user_id, "signed out");
        Ok(())
    }

    pub fn unmount(&mut self) {
        self.store.detach();
    }

    fn resolve_position(&self, target: &str) -> Option<TaskId> {
        let position: usize = target.trim().parse().ok()?;
        let task = self.store.tasks().get(position.checked_sub(1)?)?;
        // A numeric string that is itself an id wins over the position.
        if self
            .store
            .tasks()
            .iter()
            .any(|candidate| candidate.id.as_str() == target.trim())
        {
            return None;
        }
        Some(task.id.clone())
    }
}
