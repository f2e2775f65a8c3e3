use crate::api::TodoApi;
use crate::error::AppError;
use crate::model::{Task, TaskDraft};
use crate::store::TaskListStore;

pub const NAME_REQUIRED: &str = "task name is required";

/// Field-level validation messages; `None` means the field is valid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Task),
    /// Validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// The backend rejected the create; the entered values are kept.
    Failed(AppError),
}

/// The "new task" form: two text fields plus their validation state.
#[derive(Debug, Default, Clone)]
pub struct FormController {
    name: String,
    description: String,
    errors: FieldErrors,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn set_name<S: Into<String>>(&mut self, value: S) {
        self.name = value.into();
    }

    pub fn set_description<S: Into<String>>(&mut self, value: S) {
        self.description = value.into();
    }

    /// Checks the fields and records any field errors. Values are sent as
    /// typed; a blank description is treated as absent.
    pub fn validate(&mut self) -> Result<TaskDraft, FieldErrors> {
        if self.name.trim().is_empty() {
            self.errors.name = Some(NAME_REQUIRED.to_string());
            return Err(self.errors.clone());
        }

        self.errors = FieldErrors::default();
        let description = &self.description;
        Ok(TaskDraft {
            name: self.name.clone(),
            description: (!description.trim().is_empty()).then(|| description.clone()),
        })
    }

    /// Validates, creates through `store` (which reloads the list), then
    /// clears both fields. Nothing is sent when validation fails.
    pub async fn submit<A: TodoApi>(&mut self, store: &mut TaskListStore<A>) -> SubmitOutcome {
        let draft = match self.validate() {
            Ok(draft) => draft,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };

        match store.create(draft).await {
            Ok(task) => {
                self.reset();
                SubmitOutcome::Created(task)
            }
            Err(err) => SubmitOutcome::Failed(err),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{FormController, NAME_REQUIRED, SubmitOutcome};
    use crate::error::AppError;
    use crate::model::{CreateTodoInput, UserId};
    use crate::store::TaskListStore;
    use crate::store::tests::{Call, MockTodoApi};

    #[test]
    fn validate_rejects_blank_name() {
        let mut form = FormController::new();
        form.set_name("   ");
        form.set_description("details");

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.name.as_deref(), Some(NAME_REQUIRED));
        assert_eq!(form.errors().name.as_deref(), Some(NAME_REQUIRED));
    }

    #[test]
    fn validate_clears_previous_error_and_drops_blank_description() {
        let mut form = FormController::new();
        assert!(form.validate().is_err());

        form.set_name("Buy milk");
        form.set_description("  ");
        let draft = form.validate().unwrap();

        assert_eq!(draft.name, "Buy milk");
        assert_eq!(draft.description, None);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn validate_sends_values_as_typed() {
        let mut form = FormController::new();
        form.set_name(" Buy milk ");
        form.set_description("shopping:\n  - 2% low-fat\n  - oat");

        let draft = form.validate().unwrap();

        assert_eq!(draft.name, " Buy milk ");
        assert_eq!(
            draft.description.as_deref(),
            Some("shopping:\n  - 2% low-fat\n  - oat")
        );
    }

    #[tokio::test]
    async fn submit_with_empty_name_sends_nothing() {
        let api = MockTodoApi::with_tasks(Vec::new());
        let mut store = TaskListStore::new(api.clone(), UserId::new("user-1"));
        let mut form = FormController::new();

        let outcome = form.submit(&mut store).await;

        match outcome {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(errors.name.as_deref(), Some(NAME_REQUIRED));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_creates_reloads_and_clears() {
        let api = MockTodoApi::with_tasks(Vec::new());
        let mut store = TaskListStore::new(api.clone(), UserId::new("user-1"));
        let mut form = FormController::new();
        form.set_name("Buy milk");
        form.set_description("2% low-fat");

        let outcome = form.submit(&mut store).await;

        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert_eq!(
            api.calls(),
            vec![
                Call::Create(CreateTodoInput {
                    name: "Buy milk".to_string(),
                    description: Some("2% low-fat".to_string()),
                    user_id: UserId::new("user-1"),
                }),
                Call::List("user-1".to_string()),
            ]
        );
        assert_eq!(form.name(), "");
        assert_eq!(form.description(), "");
        assert_eq!(store.tasks().len(), 1);
    }

    #[tokio::test]
    async fn failed_submit_keeps_entered_values() {
        let api = MockTodoApi::with_tasks(Vec::new());
        *api.fail_create.lock().unwrap() = Some(AppError::network("offline"));
        let mut store = TaskListStore::new(api.clone(), UserId::new("user-1"));
        let mut form = FormController::new();
        form.set_name("Buy milk");
        form.set_description("2% low-fat");

        let outcome = form.submit(&mut store).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(AppError::network("offline"))
        );
        assert_eq!(form.name(), "Buy milk");
        assert_eq!(form.description(), "2% low-fat");
        assert!(form.errors().is_empty());
    }
}
