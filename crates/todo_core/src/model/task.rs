use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned task identifier. Drafts never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Accepts a user-typed id; blank input yields no id.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub user_id: UserId,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Validated form input, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub description: Option<String>,
}

impl TaskDraft {
    pub fn into_input(self, user_id: &UserId) -> CreateTodoInput {
        CreateTodoInput {
            name: self.name,
            description: self.description,
            user_id: user_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteTodoInput {
    pub id: TaskId,
}

/// `{ userId: { eq: ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoFilter {
    pub user_id: EqFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EqFilter {
    pub eq: String,
}

impl TodoFilter {
    pub fn for_user(user_id: &UserId) -> Self {
        Self {
            user_id: EqFilter {
                eq: user_id.as_str().to_string(),
            },
        }
    }
}
