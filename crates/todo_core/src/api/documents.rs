//! GraphQL documents for the `Todo` model, matching the generated AppSync
//! operations.

pub const LIST_TODOS: &str = r#"query ListTodos($filter: ModelTodoFilterInput) {
  listTodos(filter: $filter) {
    items {
      id
      name
      description
      userId
      createdAt
      updatedAt
    }
  }
}"#;

pub const CREATE_TODO: &str = r#"mutation CreateTodo($input: CreateTodoInput!) {
  createTodo(input: $input) {
    id
    name
    description
    userId
    createdAt
    updatedAt
  }
}"#;

pub const DELETE_TODO: &str = r#"mutation DeleteTodo($input: DeleteTodoInput!) {
  deleteTodo(input: $input) {
    id
    name
    description
    userId
    createdAt
    updatedAt
  }
}"#;
