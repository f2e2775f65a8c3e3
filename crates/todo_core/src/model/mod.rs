mod task;

pub use task::{
    CreateTodoInput, DeleteTodoInput, EqFilter, Task, TaskDraft, TaskId, TodoFilter, UserId,
};
