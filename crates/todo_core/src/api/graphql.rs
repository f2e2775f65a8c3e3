use super::TodoApi;
use super::documents::{CREATE_TODO, DELETE_TODO, LIST_TODOS};
use crate::config::{AuthMode, Config};
use crate::error::AppError;
use crate::model::{CreateTodoInput, DeleteTodoInput, Task, TodoFilter};
use crate::session::AuthUser;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
enum Authorization {
    ApiKey(String),
    /// Session token sent verbatim in `Authorization`, as AppSync expects.
    UserPool(Option<String>),
}

/// `TodoApi` over HTTP: every call is a single `POST {query, variables}`.
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    auth: Authorization,
}

#[derive(Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
}

#[derive(Serialize)]
struct FilterVariables<'a> {
    filter: &'a TodoFilter,
}

#[derive(Serialize)]
struct InputVariables<'a, I> {
    input: &'a I,
}

#[derive(Deserialize)]
struct ListTodosData {
    #[serde(rename = "listTodos")]
    list_todos: Option<TodoConnection>,
}

#[derive(Deserialize)]
struct TodoConnection {
    #[serde(default)]
    items: Vec<Option<Task>>,
}

#[derive(Deserialize)]
struct CreateTodoData {
    #[serde(rename = "createTodo")]
    create_todo: Option<Task>,
}

#[derive(Deserialize)]
struct DeleteTodoData {
    #[serde(rename = "deleteTodo")]
    delete_todo: Option<Task>,
}

impl GraphqlClient {
    pub fn new(config: &Config, user: &AuthUser) -> Result<Self, AppError> {
        let endpoint = config.require_endpoint()?.to_string();
        let auth = match config.auth_mode {
            AuthMode::ApiKey => {
                let key = config
                    .api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| AppError::invalid_data("API_KEY mode requires an api key"))?;
                Authorization::ApiKey(key.to_string())
            }
            AuthMode::UserPool => Authorization::UserPool(user.token.clone()),
        };
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            endpoint,
            auth,
        })
    }

    async fn execute<V, T>(&self, operation: &str, query: &str, variables: V) -> Result<T, AppError>
    where
        V: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        tracing::debug!(operation, endpoint = %self.endpoint, "sending GraphQL request");

        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables });
        request = match &self.auth {
            Authorization::ApiKey(key) => request.header(API_KEY_HEADER, key),
            Authorization::UserPool(Some(token)) => {
                request.header(reqwest::header::AUTHORIZATION, token)
            }
            Authorization::UserPool(None) => request,
        };

        let resp = request
            .send()
            .await
            .map_err(|err| AppError::network(format!("{operation}: {err}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|err| AppError::network(format!("{operation}: {err}")))?;

        if !status.is_success() {
            // AppSync reports auth failures with a GraphQL error body.
            if let Err(err) = decode_response::<serde_json::Value>(operation, &body) {
                return Err(AppError::backend(format!(
                    "{operation} failed (HTTP {status}): {}",
                    err.message()
                )));
            }
            return Err(AppError::backend(format!(
                "{operation} failed (HTTP {status})"
            )));
        }

        decode_response(operation, &body)
    }
}

/// Decodes a GraphQL envelope. Any `errors` entry wins over partial `data`.
pub fn decode_response<T: DeserializeOwned>(operation: &str, body: &str) -> Result<T, AppError> {
    let envelope: GraphqlResponse<T> = serde_json::from_str(body)
        .map_err(|err| AppError::invalid_data(format!("{operation}: {err}")))?;

    if !envelope.errors.is_empty() {
        let messages: Vec<String> = envelope
            .errors
            .iter()
            .map(|error| match error.error_type.as_deref() {
                Some(kind) => format!("{kind}: {}", error.message),
                None => error.message.clone(),
            })
            .collect();
        return Err(AppError::backend(format!(
            "{operation}: {}",
            messages.join("; ")
        )));
    }

    envelope
        .data
        .ok_or_else(|| AppError::invalid_data(format!("{operation}: response has no data")))
}

#[async_trait]
impl TodoApi for GraphqlClient {
    async fn list_todos(&self, filter: &TodoFilter) -> Result<Vec<Task>, AppError> {
        let data: ListTodosData = self
            .execute("listTodos", LIST_TODOS, FilterVariables { filter })
            .await?;
        let connection = data
            .list_todos
            .ok_or_else(|| AppError::invalid_data("listTodos: missing result"))?;
        Ok(connection.items.into_iter().flatten().collect())
    }

    async fn create_todo(&self, input: &CreateTodoInput) -> Result<Task, AppError> {
        let data: CreateTodoData = self
            .execute("createTodo", CREATE_TODO, InputVariables { input })
            .await?;
        data.create_todo
            .ok_or_else(|| AppError::invalid_data("createTodo: missing result"))
    }

    async fn delete_todo(&self, input: &DeleteTodoInput) -> Result<Task, AppError> {
        let data: DeleteTodoData = self
            .execute("deleteTodo", DELETE_TODO, InputVariables { input })
            .await?;
        data.delete_todo
            .ok_or_else(|| AppError::invalid_data("deleteTodo: missing result"))
    }
}

#[cfg(test)]
mod tests {
    use super::{GraphqlClient, ListTodosData, decode_response};
    use crate::config::{AuthMode, Config};
    use crate::model::UserId;
    use crate::session::AuthUser;

    fn user() -> AuthUser {
        AuthUser {
            user_id: UserId::new("user-1"),
            token: Some("token".to_string()),
        }
    }

    #[test]
    fn decode_response_skips_null_items() {
        let body = r#"{
            "data": {
                "listTodos": {
                    "items": [
                        { "id": "1", "name": "A", "description": null, "userId": "user-1" },
                        null,
                        { "id": "2", "name": "B", "userId": "user-1", "createdAt": "2025-12-20T00:00:00.000Z" }
                    ]
                }
            }
        }"#;

        let data: ListTodosData = decode_response("listTodos", body).unwrap();
        let items: Vec<_> = data.list_todos.unwrap().items.into_iter().flatten().collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.as_str(), "1");
        assert_eq!(items[0].description, None);
        assert_eq!(items[1].name, "B");
        assert_eq!(
            items[1].created_at.as_deref(),
            Some("2025-12-20T00:00:00.000Z")
        );
    }

    #[test]
    fn decode_response_reports_graphql_errors() {
        let body = r#"{
            "data": { "createTodo": null },
            "errors": [
                { "message": "Not Authorized to access createTodo on type Mutation", "errorType": "Unauthorized" }
            ]
        }"#;

        let err = decode_response::<serde_json::Value>("createTodo", body).unwrap_err();

        assert_eq!(err.code(), "backend_error");
        assert!(err.message().contains("Unauthorized: Not Authorized"));
    }

    #[test]
    fn decode_response_rejects_missing_data_and_garbage() {
        let err = decode_response::<serde_json::Value>("listTodos", "{}").unwrap_err();
        assert_eq!(err.code(), "invalid_data");

        let err = decode_response::<serde_json::Value>("listTodos", "<html>").unwrap_err();
        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn new_requires_endpoint() {
        let err = GraphqlClient::new(&Config::default(), &user())
            .err()
            .unwrap();
        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn api_key_mode_requires_key() {
        let config = Config {
            endpoint: Some("http://127.0.0.1:9/graphql".into()),
            auth_mode: AuthMode::ApiKey,
            ..Config::default()
        };
        let err = GraphqlClient::new(&config, &user()).err().unwrap();
        assert!(err.message().contains("api key"));

        let config = Config {
            api_key: Some("da2-key".into()),
            ..config
        };
        assert!(GraphqlClient::new(&config, &user()).is_ok());
    }
}
