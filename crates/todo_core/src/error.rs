use thiserror::Error;

/// Rendered as `<code> - <message>`; the code is stable and scripts match on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
    /// Transport-level failure talking to the backend.
    #[error("network_error - {0}")]
    Network(String),
    /// The backend answered, but with an error status or GraphQL errors.
    #[error("backend_error - {0}")]
    Backend(String),
    #[error("unauthenticated - {0}")]
    Unauthenticated(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::Network(message.into())
    }

    pub fn backend<M: Into<String>>(message: M) -> Self {
        Self::Backend(message.into())
    }

    pub fn unauthenticated<M: Into<String>>(message: M) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::Network(_) => "network_error",
            Self::Backend(_) => "backend_error",
            Self::Unauthenticated(_) => "unauthenticated",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Io(message)
            | Self::Network(message)
            | Self::Backend(message)
            | Self::Unauthenticated(message) => message,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::invalid_data(err.to_string())
        } else if let Some(status) = err.status() {
            Self::backend(format!("HTTP {status}"))
        } else {
            Self::network(err.to_string())
        }
    }
}
