use crate::model::StudentId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("student {0} not found")]
    NotFound(StudentId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The store could not be reached; displays as the underlying cause.
    #[error(transparent)]
    Transport(anyhow::Error),
    #[error("another operation is already in flight")]
    Busy,
    #[error("cannot {action} while in {mode} mode")]
    InvalidTransition {
        mode: &'static str,
        action: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("marks must be between 0 and 100, got {0}")]
    MarksOutOfRange(i64),
    #[error("marks must be a whole number, got {0:?}")]
    InvalidMarks(String),
    #[error("section must be one of A, B, C, got {0:?}")]
    InvalidSection(String),
    #[error("section is required")]
    MissingSection,
    #[error("unknown grade {0:?}")]
    InvalidGrade(String),
}

impl Error {
    pub fn transport(e: impl Into<anyhow::Error>) -> Self {
        Error::Transport(e.into())
    }

    /// Only transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Stable code reported over IPC.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation_failed",
            Error::Transport(_) => "transport_failed",
            Error::Busy => "busy",
            Error::InvalidTransition { .. } => "invalid_transition",
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Transport(e.into())
    }
}
