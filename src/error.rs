use thiserror::Error;

/// Coarse failure classes reported to callers. Callers may retry
/// `UpstreamUnavailable` and `Internal`; every mutation is all-or-nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Forbidden,
    InsufficientResource,
    UpstreamUnavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::InsufficientResource => "INSUFFICIENT_RESOURCE",
            ErrorKind::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("user not found")]
    UserNotFound,

    #[error("quiz not found")]
    QuizNotFound,

    #[error("category '{0}' not found")]
    CategoryNotFound(String),

    #[error("quiz is already finished")]
    QuizAlreadyFinished,

    #[error("quiz belongs to another user")]
    NotQuizOwner,

    #[error("username '{0}' is already in use")]
    UsernameTaken(String),

    #[error("category '{0}' already exists")]
    CategoryExists(String),

    #[error("question '{0}' already exists in this category")]
    DuplicateQuestion(String),

    #[error("quiz was modified concurrently, reload it and retry")]
    ConcurrentUpdate,

    #[error("not enough coins: {needed} needed")]
    InsufficientFunds { needed: i64 },

    #[error("no cheat sheet of rarity {0} left")]
    InsufficientInventory(i64),

    #[error("only {available} questions available, {required} required")]
    InsufficientContent { available: usize, required: usize },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error(transparent)]
    Internal(#[from] color_eyre::eyre::Report),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::UserNotFound | Error::QuizNotFound | Error::CategoryNotFound(_) => {
                ErrorKind::NotFound
            }
            Error::QuizAlreadyFinished
            | Error::UsernameTaken(_)
            | Error::CategoryExists(_)
            | Error::DuplicateQuestion(_)
            | Error::ConcurrentUpdate => ErrorKind::Conflict,
            Error::NotQuizOwner => ErrorKind::Forbidden,
            Error::InsufficientFunds { .. }
            | Error::InsufficientInventory(_)
            | Error::InsufficientContent { .. } => ErrorKind::InsufficientResource,
            Error::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}
