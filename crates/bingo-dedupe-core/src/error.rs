use thiserror::Error;

/// All errors that can occur in bingo-dedupe-core.
#[derive(Debug, Error)]
pub enum DedupeError {
    #[error("Entity not found in any duplicate set: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Session terminated by user")]
    UserTermination,

    #[error("Similarity oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Malformed book entry: {0}")]
    MalformedBook(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl DedupeError {
    /// The cooperative "save and exit" path, which is not a failure.
    pub fn is_user_termination(&self) -> bool {
        matches!(self, Self::UserTermination)
    }
}

/// Exit codes reported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
    Configuration = 5,
    Interrupted = 6,
}

impl From<&DedupeError> for ExitCode {
    fn from(err: &DedupeError) -> Self {
        match err {
            DedupeError::NotFound(_) => Self::NotFound,
            DedupeError::Configuration(_) | DedupeError::MalformedBook(_) => Self::Configuration,
            DedupeError::UserTermination => Self::Interrupted,
            DedupeError::InvalidInput(_) => Self::InvalidArgs,
            DedupeError::Io(_) => Self::FileSystemError,
            DedupeError::OracleUnavailable(_)
            | DedupeError::Json(_)
            | DedupeError::TomlParse(_)
            | DedupeError::TomlSerialize(_) => Self::GeneralError,
        }
    }
}

pub type Result<T> = std::result::Result<T, DedupeError>;
