use crate::config::app_dir;
use crate::error::AppError;
use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const SESSION_FILE_NAME: &str = "session.json";
const SESSION_ENV_VAR: &str = "TODOAPP_SESSION_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    schema_version: u32,
    user_id: UserId,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user_id: UserId,
    pub token: Option<String>,
}

pub fn session_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(SESSION_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(SESSION_FILE_NAME))
}

/// `None` when nobody is signed in.
pub fn load_session(path: &Path) -> Result<Option<SessionState>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredSession =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    if stored.user_id.as_str().trim().is_empty() {
        return Err(AppError::invalid_data("session user_id is empty"));
    }

    Ok(Some(SessionState {
        user_id: stored.user_id,
        token: stored.token,
    }))
}

pub fn save_session(path: &Path, state: &SessionState) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredSession {
        schema_version: SCHEMA_VERSION,
        user_id: state.user_id.clone(),
        token: state.token.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

/// Removing an absent session is not an error.
pub fn clear_session(path: &Path) -> Result<(), AppError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(AppError::io(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{SCHEMA_VERSION, SessionState, clear_session, load_session, save_session};
    use crate::model::UserId;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("todoapp-{nanos}-{file_name}"))
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = temp_path("session.json");
        let state = SessionState {
            user_id: UserId::new("user-1"),
            token: Some("id-token".to_string()),
        };

        save_session(&path, &state).unwrap();
        let loaded = load_session(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, Some(state));
    }

    #[cfg(unix)]
    #[test]
    fn saved_session_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("session-perms.json");
        let state = SessionState {
            user_id: UserId::new("user-1"),
            token: None,
        };

        save_session(&path, &state).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        fs::remove_file(&path).ok();

        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_file_means_signed_out() {
        let path = temp_path("no-session.json");
        assert_eq!(load_session(&path).unwrap(), None);
    }

    #[test]
    fn accepts_session_without_token() {
        let path = temp_path("tokenless.json");
        fs::write(&path, r#"{ "schema_version": 1, "user_id": "user-1" }"#).unwrap();

        let loaded = load_session(&path).unwrap().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.user_id.as_str(), "user-1");
        assert_eq!(loaded.token, None);
    }

    #[test]
    fn rejects_blank_user_id() {
        let path = temp_path("blank-user.json");
        fs::write(&path, r#"{ "schema_version": 1, "user_id": "  " }"#).unwrap();

        let err = load_session(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn schema_version_must_match() {
        let path = temp_path("bad-schema.json");
        let bad = format!(
            "{{\n  \"schema_version\": {},\n  \"user_id\": \"user-1\"\n}}",
            SCHEMA_VERSION + 1
        );
        fs::write(&path, bad).unwrap();

        let err = load_session(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn clear_session_is_idempotent() {
        let path = temp_path("clear.json");
        let state = SessionState {
            user_id: UserId::new("user-1"),
            token: None,
        };
        save_session(&path, &state).unwrap();

        clear_session(&path).unwrap();
        clear_session(&path).unwrap();

        assert!(!path.exists());
    }
}
