//! Signed-in identity. Authentication itself happens elsewhere; this layer
//! only remembers who signed in and forgets them on sign-out.

use crate::error::AppError;
use crate::model::UserId;
use crate::storage::session_store::{self, SessionState};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    /// Credential forwarded to the backend in user-pool mode.
    pub token: Option<String>,
}

pub trait SessionProvider {
    fn current_user(&self) -> Result<AuthUser, AppError>;

    fn sign_out(&self) -> Result<(), AppError>;
}

pub struct FileSessionProvider {
    path: PathBuf,
}

impl FileSessionProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(session_store::session_path()?))
    }

    pub fn sign_in(&self, user_id: &str, token: Option<&str>) -> Result<AuthUser, AppError> {
        let trimmed = user_id.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("user id is required"));
        }

        let state = SessionState {
            user_id: UserId::new(trimmed),
            token: token
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
        };
        session_store::save_session(&self.path, &state)?;
        tracing::debug!(user_id = %state.user_id, "signed in");

        Ok(AuthUser {
            user_id: state.user_id,
            token: state.token,
        })
    }
}

impl SessionProvider for FileSessionProvider {
    fn current_user(&self) -> Result<AuthUser, AppError> {
        let state = session_store::load_session(&self.path)?
            .ok_or_else(|| AppError::unauthenticated("not signed in; run `login` first"))?;
        Ok(AuthUser {
            user_id: state.user_id,
            token: state.token,
        })
    }

    fn sign_out(&self) -> Result<(), AppError> {
        session_store::clear_session(&self.path)?;
        tracing::debug!(path = %self.path.display(), "signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FileSessionProvider, SessionProvider};
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
    fn current_user_requires_sign_in() {
        let provider = FileSessionProvider::new(temp_path("signed-out.json"));
        let err = provider.current_user().unwrap_err();
        assert_eq!(err.code(), "unauthenticated");
    }

    #[test]
    fn sign_in_then_sign_out() {
        let path = temp_path("sign-in.json");
        let provider = FileSessionProvider::new(path.clone());

        let user = provider.sign_in(" user-1 ", Some(" token ")).unwrap();
        assert_eq!(user.user_id.as_str(), "user-1");
        assert_eq!(user.token.as_deref(), Some("token"));
        assert_eq!(provider.current_user().unwrap(), user);

        provider.sign_out().unwrap();
        assert!(!path.exists());
        assert!(provider.current_user().is_err());
    }

    #[test]
    fn sign_in_rejects_blank_user_and_drops_blank_token() {
        let path = temp_path("blank.json");
        let provider = FileSessionProvider::new(path.clone());

        assert_eq!(
            provider.sign_in("   ", None).unwrap_err().code(),
            "invalid_input"
        );

        let user = provider.sign_in("user-2", Some("  ")).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(user.token, None);
    }
}
