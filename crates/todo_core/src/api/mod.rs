//! Backend operations the page depends on.
//!
//! [`TodoApi`] is the seam between the page logic and the network: the
//! production implementation is [`GraphqlClient`], tests substitute their own.

pub mod documents;
mod graphql;

pub use graphql::{GraphqlClient, decode_response};

use crate::error::AppError;
use crate::model::{CreateTodoInput, DeleteTodoInput, Task, TodoFilter};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait TodoApi: Send + Sync {
    /// `listTodos(filter)`; items come back in backend order.
    async fn list_todos(&self, filter: &TodoFilter) -> Result<Vec<Task>, AppError>;

    async fn create_todo(&self, input: &CreateTodoInput) -> Result<Task, AppError>;

    async fn delete_todo(&self, input: &DeleteTodoInput) -> Result<Task, AppError>;
}

#[async_trait]
impl<A: TodoApi + ?Sized> TodoApi for Arc<A> {
    async fn list_todos(&self, filter: &TodoFilter) -> Result<Vec<Task>, AppError> {
        (**self).list_todos(filter).await
    }

    async fn create_todo(&self, input: &CreateTodoInput) -> Result<Task, AppError> {
        (**self).create_todo(input).await
    }

    async fn delete_todo(&self, input: &DeleteTodoInput) -> Result<Task, AppError> {
        (**self).delete_todo(input).await
    }
}
